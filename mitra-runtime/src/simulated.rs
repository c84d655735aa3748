use std::time::Duration;

use mitra_core::artifact::{CaptureArtifact, ExchangeContext, MarketQuery};
use mitra_core::error::{ExchangeError, SessionError};
use mitra_core::result::{Diagnosis, ExchangeResult, Mandi, MarketAnalysis, VoiceAnswer};
use mitra_core::types::Session;
use mitra_engine::traits::{ExchangeBackend, SessionBackend};

/// Handshake for backends without server-side sessions. Always succeeds.
#[derive(Debug, Clone, Default)]
pub struct LocalSessionBackend;

#[async_trait::async_trait]
impl SessionBackend for LocalSessionBackend {
    async fn create_session(&self, session: &Session) -> Result<(), SessionError> {
        log::debug!(
            "local session farmer={} session={}",
            session.farmer_id.as_str(),
            session.session_id.as_str()
        );
        Ok(())
    }
}

/// In-process canned answers, for demos and offline use.
#[derive(Debug, Clone, Default)]
pub struct SimulatedBackend {
    latency: Duration,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

/// Keyword-matched assistant reply.
pub fn voice_reply(transcript: &str) -> String {
    let t = transcript.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| t.contains(w));

    if has(&["price", "market"]) {
        "Current tomato prices in Bangalore: ₹25-30 per kg. Prices are trending upward due to \
         festival demand. Best time to sell is within 3-4 days. Visit Yeshwantpur APMC for best \
         rates."
            .into()
    } else if has(&["disease", "pest"]) {
        "For crop disease diagnosis, please take a clear photo of the affected plant parts using \
         our camera feature. Common signs include leaf spots, wilting, or unusual discoloration."
            .into()
    } else if has(&["scheme", "subsidy"]) {
        "PM-KISAN provides ₹6,000 annually. Drip irrigation subsidy offers 55% support up to \
         ₹40,000 per hectare. Visit your nearest CSC for applications."
            .into()
    } else {
        format!(
            "Thank you for your farming question. For specific guidance on \"{}\", I recommend: \
             Monitor crops daily, maintain proper irrigation, and contact your local Agriculture \
             Extension Officer for detailed advice.",
            transcript.trim()
        )
    }
}

pub fn sample_diagnosis() -> Diagnosis {
    Diagnosis {
        disease_name: "Early Blight (Alternaria solani)".into(),
        confidence: 0.89,
        severity: "Moderate (6/10)".into(),
        treatment: vec![
            "Remove affected leaves immediately".into(),
            "Apply copper-based fungicide (available at local agri stores)".into(),
            "Improve air circulation around plants".into(),
            "Avoid overhead watering".into(),
        ],
        cost_estimate: "₹150-200 for treatment per acre".into(),
        symptoms: Some("Dark brown spots with concentric rings on leaves".into()),
        prevention: vec![
            "Crop rotation with non-solanaceous crops".into(),
            "Use resistant varieties".into(),
            "Apply mulch to prevent soil splash".into(),
        ],
        recovery_time: Some("2-3 weeks with proper treatment".into()),
        local_suppliers: vec![
            "Karnataka Agri Supply Center, Bangalore".into(),
            "Farmer Producer Organizations in your district".into(),
        ],
    }
}

pub fn sample_market(query: &MarketQuery) -> MarketAnalysis {
    MarketAnalysis {
        crop: query.crop.clone(),
        current_price: "₹25-30 per kg".into(),
        trend: "Increasing (+15% this week)".into(),
        demand: "High due to festival season".into(),
        recommendation: "Sell within 3-4 days for best prices".into(),
        supply: Some("Moderate, some crop damage due to recent rains".into()),
        prediction: Some("Prices likely to increase by 10-15% next week".into()),
        markets: vec!["Yeshwantpur APMC".into(), "Binny Mills Market".into()],
        nearby_mandis: vec![
            Mandi {
                name: format!("{} APMC", query.location),
                distance: "25km".into(),
                current_rate: "₹28/kg".into(),
            },
            Mandi {
                name: "Nelamangala Mandi".into(),
                distance: "35km".into(),
                current_rate: "₹26/kg".into(),
            },
        ],
    }
}

#[async_trait::async_trait]
impl ExchangeBackend for SimulatedBackend {
    async fn exchange(
        &self,
        artifact: &CaptureArtifact,
        _ctx: &ExchangeContext,
    ) -> Result<ExchangeResult, ExchangeError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        Ok(match artifact {
            CaptureArtifact::Image(_) => ExchangeResult::Diagnosis(sample_diagnosis()),
            CaptureArtifact::MarketQuery(q) => ExchangeResult::Market(sample_market(q)),
            CaptureArtifact::Transcript(t) => ExchangeResult::VoiceAnswer(VoiceAnswer {
                text: voice_reply(t),
            }),
        })
    }
}

use anyhow::{Context, anyhow, bail};
use mitra_core::result::{Diagnosis, Mandi, MarketAnalysis, VoiceAnswer};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct AgentTurn {
    #[serde(default)]
    content: Option<TurnContent>,
}

#[derive(Debug, Deserialize)]
struct TurnContent {
    #[serde(default)]
    parts: Vec<TurnPart>,
}

#[derive(Debug, Deserialize)]
struct TurnPart {
    #[serde(default)]
    text: Option<String>,
}

/// The answer is the first content part of the last turn.
pub fn parse_agent_answer(body: &[u8]) -> anyhow::Result<VoiceAnswer> {
    let turns: Vec<AgentTurn> = serde_json::from_slice(body).context("decode agent turns JSON")?;
    let last = turns.into_iter().last().ok_or_else(|| anyhow!("agent returned no turns"))?;
    let content = last
        .content
        .ok_or_else(|| anyhow!("last turn has no content"))?;
    let text = content
        .parts
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("last turn has no content parts"))?
        .text
        .ok_or_else(|| anyhow!("first content part has no text"))?;
    Ok(VoiceAnswer { text })
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionEnvelope {
    pub success: bool,
    pub error: Option<String>,
    pub body: serde_json::Value,
}

pub fn parse_function_envelope(body: &[u8]) -> anyhow::Result<FunctionEnvelope> {
    let value: serde_json::Value =
        serde_json::from_slice(body).context("decode function response JSON")?;
    let success = value
        .get("success")
        .and_then(|v| v.as_bool())
        .ok_or_else(|| anyhow!("function response has no boolean `success`"))?;
    let error = value
        .get("error")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    Ok(FunctionEnvelope {
        success,
        error,
        body: value,
    })
}

impl FunctionEnvelope {
    fn field<T: serde::de::DeserializeOwned>(&self, name: &str) -> anyhow::Result<T> {
        let v = self
            .body
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("function response has no `{name}`"))?;
        serde_json::from_value(v).with_context(|| format!("decode `{name}`"))
    }
}

#[derive(Debug, Deserialize)]
struct WireDiagnosis {
    disease_name: String,
    confidence: f32,
    severity: String,
    #[serde(default)]
    symptoms: Option<String>,
    #[serde(default)]
    treatment: Vec<String>,
    #[serde(default)]
    prevention: Vec<String>,
    cost_estimate: String,
    #[serde(default)]
    recovery_time: Option<String>,
    #[serde(default)]
    local_suppliers: Vec<String>,
}

pub fn parse_diagnosis(env: &FunctionEnvelope) -> anyhow::Result<Diagnosis> {
    let w: WireDiagnosis = env.field("diagnosis")?;
    if !(0.0..=1.0).contains(&w.confidence) {
        bail!("diagnosis confidence out of range: {}", w.confidence);
    }
    Ok(Diagnosis {
        disease_name: w.disease_name,
        confidence: w.confidence,
        severity: w.severity,
        treatment: w.treatment,
        cost_estimate: w.cost_estimate,
        symptoms: w.symptoms,
        prevention: w.prevention,
        recovery_time: w.recovery_time,
        local_suppliers: w.local_suppliers,
    })
}

#[derive(Debug, Default, Deserialize)]
struct WireMarketDetail {
    #[serde(default)]
    demand: Option<String>,
    #[serde(default)]
    supply: Option<String>,
    #[serde(default)]
    prediction: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireSellingRecommendation {
    #[serde(default)]
    timing: Option<String>,
    #[serde(default)]
    markets: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WireMandi {
    name: String,
    #[serde(default)]
    distance: String,
    #[serde(default)]
    current_rate: String,
}

#[derive(Debug, Deserialize)]
struct WireMarket {
    #[serde(default)]
    crop: Option<String>,
    current_price: String,
    price_trend: String,
    #[serde(default)]
    market_analysis: WireMarketDetail,
    #[serde(default)]
    selling_recommendation: WireSellingRecommendation,
    #[serde(default)]
    nearby_mandis: Vec<WireMandi>,
}

/// `crop` fills in when the payload does not echo it back.
pub fn parse_market_analysis(env: &FunctionEnvelope, crop: &str) -> anyhow::Result<MarketAnalysis> {
    let w: WireMarket = env.field("analysis")?;
    Ok(MarketAnalysis {
        crop: w.crop.unwrap_or_else(|| crop.to_string()),
        current_price: w.current_price,
        trend: w.price_trend,
        demand: w.market_analysis.demand.unwrap_or_default(),
        recommendation: w.selling_recommendation.timing.unwrap_or_default(),
        supply: w.market_analysis.supply,
        prediction: w.market_analysis.prediction,
        markets: w.selling_recommendation.markets,
        nearby_mandis: w
            .nearby_mandis
            .into_iter()
            .map(|m| Mandi {
                name: m.name,
                distance: m.distance,
                current_rate: m.current_rate,
            })
            .collect(),
    })
}

pub fn parse_voice_response(env: &FunctionEnvelope) -> anyhow::Result<VoiceAnswer> {
    let text: String = env.field("response")?;
    Ok(VoiceAnswer { text })
}

use crate::traits::SpeechSynthesizer;
use mitra_core::error::{FlowError, Notification};
use mitra_core::language::Language;
use mitra_core::result::{Diagnosis, ExchangeResult, MarketAnalysis, PriceQuote, VoiceAnswer};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewField {
    pub label: &'static str,
    pub value: String,
}

/// Text fields shown for one result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedView {
    pub title: String,
    pub fields: Vec<ViewField>,
    /// Ordered list under the fields (treatment steps).
    pub steps: Vec<String>,
}

impl RenderedView {
    pub fn field(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
    }

    pub fn to_text(&self) -> String {
        let mut out = format!("{}\n", self.title);
        for f in &self.fields {
            out.push_str(&format!("  {}: {}\n", f.label, f.value));
        }
        for (i, s) in self.steps.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, s));
        }
        out
    }
}

fn push_opt(fields: &mut Vec<ViewField>, label: &'static str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
        fields.push(ViewField {
            label,
            value: v.to_string(),
        });
    }
}

fn diagnosis_view(d: &Diagnosis) -> RenderedView {
    let mut fields = vec![
        ViewField {
            label: "Confidence",
            value: format!("{}%", d.confidence_percent()),
        },
        ViewField {
            label: "Severity",
            value: d.severity.clone(),
        },
    ];
    push_opt(&mut fields, "Symptoms", d.symptoms.as_deref());
    push_opt(&mut fields, "Cost Estimate", Some(&d.cost_estimate));
    push_opt(&mut fields, "Recovery Time", d.recovery_time.as_deref());

    RenderedView {
        title: d.disease_name.clone(),
        fields,
        steps: d.treatment.clone(),
    }
}

fn market_view(m: &MarketAnalysis) -> RenderedView {
    let mut fields = vec![
        ViewField {
            label: "Current Price",
            value: m.current_price.clone(),
        },
        ViewField {
            label: "Trend",
            value: m.trend.clone(),
        },
    ];
    push_opt(&mut fields, "Demand", Some(&m.demand));
    push_opt(&mut fields, "Recommendation", Some(&m.recommendation));
    if !m.markets.is_empty() {
        fields.push(ViewField {
            label: "Best Markets",
            value: m.markets.join(", "),
        });
    }

    RenderedView {
        title: format!("Market Intelligence: {}", m.crop),
        fields,
        steps: vec![],
    }
}

fn voice_view(v: &VoiceAnswer) -> RenderedView {
    RenderedView {
        title: "AI Response".into(),
        fields: vec![ViewField {
            label: "Response",
            value: v.text.clone(),
        }],
        steps: vec![],
    }
}

/// Daily board: one step per quote, plus a tip for the fastest riser.
pub fn price_board_view(quotes: &[PriceQuote]) -> RenderedView {
    let steps = quotes
        .iter()
        .map(|q| {
            format!(
                "{} ({}): {} [{}]",
                q.crop,
                q.market,
                q.price_label(),
                q.trend().advice()
            )
        })
        .collect();

    let mut fields = vec![];
    let top = quotes
        .iter()
        .filter(|q| q.change_percent > 0.0)
        .max_by(|a, b| a.change_percent.total_cmp(&b.change_percent));
    if let Some(q) = top {
        fields.push(ViewField {
            label: "Tip",
            value: format!(
                "{} prices are trending up. Consider selling within next 2 days for maximum profit.",
                q.crop
            ),
        });
    }

    RenderedView {
        title: "Today's Market Prices".into(),
        fields,
        steps,
    }
}

/// Holds what a surface currently displays.
pub struct ResultRenderer {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    view: Option<RenderedView>,
    notification: Option<Notification>,
    last_spoken: Option<(String, Language)>,
}

impl ResultRenderer {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            synthesizer,
            view: None,
            notification: None,
            last_spoken: None,
        }
    }

    /// Replaces the displayed result. Voice answers are also spoken.
    pub fn render(&mut self, result: &ExchangeResult, language: Language) -> RenderedView {
        let view = match result {
            ExchangeResult::Diagnosis(d) => diagnosis_view(d),
            ExchangeResult::Market(m) => market_view(m),
            ExchangeResult::VoiceAnswer(v) => {
                self.synthesizer.speak(&v.text, language.locale_tag());
                self.last_spoken = Some((v.text.clone(), language));
                voice_view(v)
            }
        };
        self.notification = None;
        self.view = Some(view.clone());
        view
    }

    pub fn render_error(&mut self, err: &FlowError) -> Notification {
        let n = err.user_message();
        self.view = None;
        self.notification = Some(n.clone());
        n
    }

    /// Invalidates the previous result when a new capture starts.
    pub fn clear(&mut self) {
        self.view = None;
        self.notification = None;
        self.last_spoken = None;
    }

    /// Speaks the last voice answer again. Returns `false` if there is none.
    pub fn replay(&self) -> bool {
        match &self.last_spoken {
            Some((text, language)) => {
                self.synthesizer.speak(text, language.locale_tag());
                true
            }
            None => false,
        }
    }

    pub fn view(&self) -> Option<&RenderedView> {
        self.view.as_ref()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub disease_name: String,
    /// Model confidence in `[0, 1]`.
    pub confidence: f32,
    pub severity: String,
    /// Ordered treatment steps.
    pub treatment: Vec<String>,
    pub cost_estimate: String,

    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub prevention: Vec<String>,
    #[serde(default)]
    pub recovery_time: Option<String>,
    #[serde(default)]
    pub local_suppliers: Vec<String>,
}

impl Diagnosis {
    pub fn confidence_percent(&self) -> u8 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mandi {
    pub name: String,
    pub distance: String,
    pub current_rate: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub crop: String,
    pub current_price: String,
    pub trend: String,
    pub demand: String,
    pub recommendation: String,

    #[serde(default)]
    pub supply: Option<String>,
    #[serde(default)]
    pub prediction: Option<String>,
    #[serde(default)]
    pub markets: Vec<String>,
    #[serde(default)]
    pub nearby_mandis: Vec<Mandi>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceAnswer {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTrend {
    Up,
    Down,
    Stable,
}

impl PriceTrend {
    pub fn from_change(change_percent: f32) -> Self {
        if change_percent > 0.0 {
            PriceTrend::Up
        } else if change_percent < 0.0 {
            PriceTrend::Down
        } else {
            PriceTrend::Stable
        }
    }

    /// Selling advice shown next to the quote.
    pub fn advice(self) -> &'static str {
        match self {
            PriceTrend::Up => "Sell Now",
            PriceTrend::Down => "Hold",
            PriceTrend::Stable => "Stable",
        }
    }
}

/// One row of the daily price board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub crop: String,
    /// Rupees per `unit`.
    pub price: u32,
    pub unit: String,
    pub change_percent: f32,
    pub market: String,
}

impl PriceQuote {
    pub fn trend(&self) -> PriceTrend {
        PriceTrend::from_change(self.change_percent)
    }

    /// `₹45/kg +8.2%`, no sign when unchanged.
    pub fn price_label(&self) -> String {
        let sign = if self.change_percent > 0.0 { "+" } else { "" };
        format!("₹{}/{} {sign}{}%", self.price, self.unit, self.change_percent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExchangeResult {
    Diagnosis(Diagnosis),
    Market(MarketAnalysis),
    VoiceAnswer(VoiceAnswer),
}

impl ExchangeResult {
    pub fn kind_label(&self) -> &'static str {
        match self {
            ExchangeResult::Diagnosis(_) => "diagnosis",
            ExchangeResult::Market(_) => "market",
            ExchangeResult::VoiceAnswer(_) => "voice_answer",
        }
    }

    pub fn as_voice_answer(&self) -> Option<&VoiceAnswer> {
        match self {
            ExchangeResult::VoiceAnswer(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_serialization_names_the_variant() {
        let r = ExchangeResult::VoiceAnswer(VoiceAnswer { text: "hi".into() });
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["kind"], "voice_answer");
        assert_eq!(v["text"], "hi");
    }

    #[test]
    fn confidence_percent_rounds() {
        let d = Diagnosis {
            disease_name: "Early Blight".into(),
            confidence: 0.886,
            severity: "Moderate".into(),
            treatment: vec![],
            cost_estimate: String::new(),
            symptoms: None,
            prevention: vec![],
            recovery_time: None,
            local_suppliers: vec![],
        };
        assert_eq!(d.confidence_percent(), 89);
    }

    #[test]
    fn price_labels_follow_trend() {
        let mut q = PriceQuote {
            crop: "Onion".into(),
            price: 35,
            unit: "kg".into(),
            change_percent: -2.1,
            market: "Mysore Market".into(),
        };
        assert_eq!(q.trend(), PriceTrend::Down);
        assert_eq!(q.trend().advice(), "Hold");
        assert_eq!(q.price_label(), "₹35/kg -2.1%");

        q.change_percent = 0.0;
        assert_eq!(q.trend(), PriceTrend::Stable);
        assert_eq!(q.price_label(), "₹35/kg 0%");

        q.change_percent = 8.2;
        assert_eq!(q.trend().advice(), "Sell Now");
        assert_eq!(q.price_label(), "₹35/kg +8.2%");
    }
}

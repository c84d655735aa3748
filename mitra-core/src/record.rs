use crate::language::Language;
use crate::result::ExchangeResult;
use crate::types::RecordId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Diagnosis,
    MarketQuery,
    VoiceInteraction,
}

impl RecordKind {
    /// Remote table the record is appended to.
    pub fn table(self) -> &'static str {
        match self {
            RecordKind::Diagnosis => "crop_diagnoses",
            RecordKind::MarketQuery => "market_queries",
            RecordKind::VoiceInteraction => "voice_interactions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub id: RecordId,
    pub kind: RecordKind,
    pub ts_unix_ms: i64,
    pub language: Language,
    /// Human-readable input summary (transcript, crop/location, image filename).
    pub input: String,
    /// Market location, for market queries.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub output: Option<ExchangeResult>,
    #[serde(default)]
    pub error: Option<String>,
}

impl InteractionRecord {
    pub fn new(kind: RecordKind, ts_unix_ms: i64, language: Language, input: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            kind,
            ts_unix_ms,
            language,
            input: input.into(),
            location: None,
            output: None,
            error: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_output(mut self, output: ExchangeResult) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

use crate::language::Language;
use crate::types::Session;
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageBlob {
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

// Image bytes are large and meaningless in logs.
impl std::fmt::Debug for ImageBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageBlob")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketQuery {
    pub crop: String,
    pub location: String,
}

/// One captured input, consumed by exactly one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureArtifact {
    Image(ImageBlob),
    Transcript(String),
    MarketQuery(MarketQuery),
}

impl CaptureArtifact {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            CaptureArtifact::Image(_) => ArtifactKind::Image,
            CaptureArtifact::Transcript(_) => ArtifactKind::Transcript,
            CaptureArtifact::MarketQuery(_) => ArtifactKind::MarketQuery,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Image,
    Transcript,
    MarketQuery,
}

impl ArtifactKind {
    pub fn label(self) -> &'static str {
        match self {
            ArtifactKind::Image => "image",
            ArtifactKind::Transcript => "transcript",
            ArtifactKind::MarketQuery => "market_query",
        }
    }
}

pub const DEFAULT_DIAGNOSIS_PROMPT: &str =
    "Analyze this crop image for diseases, pests, or nutrient deficiencies";

/// Everything an exchange needs besides the artifact itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExchangeContext {
    pub session: Option<Session>,
    pub language: Language,
    pub prompt: Option<String>,
}

impl ExchangeContext {
    pub fn new(language: Language) -> Self {
        Self {
            session: None,
            language,
            prompt: None,
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn prompt_or_default(&self) -> &str {
        self.prompt
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_DIAGNOSIS_PROMPT)
    }
}

use async_trait::async_trait;
use mitra_core::artifact::{CaptureArtifact, ExchangeContext};
use mitra_core::error::{CaptureError, ExchangeError, SessionError};
use mitra_core::language::Language;
use mitra_core::record::InteractionRecord;
use mitra_core::result::ExchangeResult;
use mitra_core::types::Session;

#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Registers a client-generated session. Any non-2xx answer is a rejection.
    async fn create_session(&self, session: &Session) -> Result<(), SessionError>;
}

#[async_trait]
pub trait ExchangeBackend: Send + Sync {
    async fn exchange(
        &self,
        artifact: &CaptureArtifact,
        ctx: &ExchangeContext,
    ) -> Result<ExchangeResult, ExchangeError>;
}

/// Single-shot speech-to-text.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Acquires the microphone and starts listening.
    async fn start(&self, language: Language) -> Result<(), CaptureError>;

    /// Waits for the one finalized result, then releases the microphone.
    async fn finalize(&self) -> Result<String, CaptureError>;

    /// Ends listening early; a pending `finalize` resolves with what was heard.
    fn stop(&self);
}

/// Text-to-speech. Fire-and-forget: callers never wait on playback.
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, text: &str, locale: &str);
}

#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn append(&self, record: &InteractionRecord) -> anyhow::Result<()>;
}

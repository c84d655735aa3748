use std::sync::Arc;

use mitra_core::artifact::{ArtifactKind, CaptureArtifact, ExchangeContext};
use mitra_core::error::ExchangeError;
use mitra_core::result::ExchangeResult;
use mitra_engine::traits::ExchangeBackend;

/// Dispatches each artifact to the backend configured for its kind.
#[derive(Clone, Default)]
pub struct BackendRouter {
    diagnosis: Option<Arc<dyn ExchangeBackend>>,
    market: Option<Arc<dyn ExchangeBackend>>,
    voice: Option<Arc<dyn ExchangeBackend>>,
}

impl BackendRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_diagnosis(mut self, backend: Arc<dyn ExchangeBackend>) -> Self {
        self.diagnosis = Some(backend);
        self
    }

    pub fn with_market(mut self, backend: Arc<dyn ExchangeBackend>) -> Self {
        self.market = Some(backend);
        self
    }

    pub fn with_voice(mut self, backend: Arc<dyn ExchangeBackend>) -> Self {
        self.voice = Some(backend);
        self
    }

    fn route(&self, kind: ArtifactKind) -> Option<&Arc<dyn ExchangeBackend>> {
        match kind {
            ArtifactKind::Image => self.diagnosis.as_ref(),
            ArtifactKind::MarketQuery => self.market.as_ref(),
            ArtifactKind::Transcript => self.voice.as_ref(),
        }
    }
}

#[async_trait::async_trait]
impl ExchangeBackend for BackendRouter {
    async fn exchange(
        &self,
        artifact: &CaptureArtifact,
        ctx: &ExchangeContext,
    ) -> Result<ExchangeResult, ExchangeError> {
        let kind = artifact.kind();
        self.route(kind)
            .ok_or(ExchangeError::Unsupported(kind.label()))?
            .exchange(artifact, ctx)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mitra_core::result::VoiceAnswer;

    struct Named(&'static str);

    #[async_trait::async_trait]
    impl ExchangeBackend for Named {
        async fn exchange(
            &self,
            _artifact: &CaptureArtifact,
            _ctx: &ExchangeContext,
        ) -> Result<ExchangeResult, ExchangeError> {
            Ok(ExchangeResult::VoiceAnswer(VoiceAnswer {
                text: self.0.into(),
            }))
        }
    }

    #[tokio::test]
    async fn routes_to_configured_backend() {
        let router = BackendRouter::new()
            .with_voice(Arc::new(Named("agent")))
            .with_market(Arc::new(Named("functions")));

        let r = router
            .exchange(
                &CaptureArtifact::Transcript("hi".into()),
                &ExchangeContext::default(),
            )
            .await
            .unwrap();
        assert_eq!(r.as_voice_answer().unwrap().text, "agent");
    }

    #[tokio::test]
    async fn missing_route_is_unsupported() {
        let router = BackendRouter::new().with_voice(Arc::new(Named("agent")));
        let img = mitra_core::artifact::ImageBlob::new("a.png", "image/png", vec![0]);
        let err = router
            .exchange(&CaptureArtifact::Image(img), &ExchangeContext::default())
            .await
            .unwrap_err();
        assert_eq!(err, ExchangeError::Unsupported("image"));
    }
}

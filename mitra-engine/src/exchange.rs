use crate::traits::ExchangeBackend;
use mitra_core::artifact::{CaptureArtifact, ExchangeContext};
use mitra_core::error::FlowError;
use mitra_core::result::ExchangeResult;
use mitra_core::validation::validate_artifact;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct ExchangeClient {
    backend: Arc<dyn ExchangeBackend>,
}

impl ExchangeClient {
    pub fn new(backend: Arc<dyn ExchangeBackend>) -> Self {
        Self { backend }
    }

    /// One round trip. The artifact is consumed; failures are terminal for this attempt.
    ///
    /// Invalid artifacts (oversized image, blank transcript/crop) never reach the backend.
    pub async fn exchange(
        &self,
        artifact: CaptureArtifact,
        ctx: &ExchangeContext,
    ) -> Result<ExchangeResult, FlowError> {
        let kind = artifact.kind();
        if let Err(e) = validate_artifact(&artifact) {
            log::warn!("rejected {} artifact: {e}", kind.label());
            return Err(e.into());
        }

        let t0 = Instant::now();
        let res = self.backend.exchange(&artifact, ctx).await;
        let elapsed = ms(t0.elapsed());

        match &res {
            Ok(r) => log::info!(
                "exchange {} -> {} in {elapsed}ms",
                kind.label(),
                r.kind_label()
            ),
            Err(e) => log::error!("exchange {} failed after {elapsed}ms: {e}", kind.label()),
        }

        Ok(res?)
    }
}

pub fn ms(d: Duration) -> u64 {
    d.as_millis().try_into().unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mitra_core::artifact::ImageBlob;
    use mitra_core::error::{ExchangeError, ValidationError};
    use mitra_core::language::Language;
    use mitra_core::result::VoiceAnswer;
    use mitra_core::validation::MAX_IMAGE_BYTES;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct EchoBackend {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ExchangeBackend for EchoBackend {
        async fn exchange(
            &self,
            artifact: &CaptureArtifact,
            _ctx: &ExchangeContext,
        ) -> Result<ExchangeResult, ExchangeError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            match artifact {
                CaptureArtifact::Transcript(t) => Ok(ExchangeResult::VoiceAnswer(VoiceAnswer {
                    text: format!("{t} #{n}"),
                })),
                _ => Err(ExchangeError::Unsupported("test")),
            }
        }
    }

    #[tokio::test]
    async fn oversized_image_never_reaches_backend() {
        let backend = Arc::new(EchoBackend::default());
        let client = ExchangeClient::new(backend.clone());

        let img = ImageBlob::new("big.jpg", "image/jpeg", vec![0; 6 * 1024 * 1024]);
        let err = client
            .exchange(CaptureArtifact::Image(img), &ExchangeContext::default())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            FlowError::Validation(ValidationError::FileTooLarge {
                size: 6 * 1024 * 1024,
                limit: MAX_IMAGE_BYTES
            })
        );
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn backend_errors_pass_through() {
        let client = ExchangeClient::new(Arc::new(EchoBackend::default()));
        let q = mitra_core::artifact::MarketQuery {
            crop: "onion".into(),
            location: "Hubli".into(),
        };
        let err = client
            .exchange(CaptureArtifact::MarketQuery(q), &ExchangeContext::new(Language::English))
            .await
            .unwrap_err();
        assert_eq!(err, FlowError::Exchange(ExchangeError::Unsupported("test")));
    }
}

use mitra_core::artifact::{CaptureArtifact, ExchangeContext};
use mitra_core::error::{ExchangeError, SessionError};
use mitra_core::result::ExchangeResult;
use mitra_core::types::Session;
use mitra_engine::traits::{ExchangeBackend, SessionBackend};
use mitra_providers::agent::{AgentEndpoint, build_create_session_request, build_run_request};
use mitra_providers::parse::parse_agent_answer;
use mitra_providers::runtime::{HttpTimeouts, execute_with};

/// Server error bodies are cut to this many chars before they reach a message.
pub(crate) const ERROR_BODY_LIMIT: usize = 300;

pub(crate) fn truncate(s: &str) -> String {
    let mut out: String = s.chars().take(ERROR_BODY_LIMIT).collect();
    if out.len() < s.len() {
        out.push('…');
    }
    out
}

/// Conversational agent over HTTP: session handshake plus `/run`.
#[derive(Debug, Clone)]
pub struct AgentHttpBackend {
    endpoint: AgentEndpoint,
    timeouts: HttpTimeouts,
}

impl AgentHttpBackend {
    pub fn new(endpoint: AgentEndpoint, timeouts: HttpTimeouts) -> Self {
        Self { endpoint, timeouts }
    }

    pub fn endpoint(&self) -> &AgentEndpoint {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl SessionBackend for AgentHttpBackend {
    async fn create_session(&self, session: &Session) -> Result<(), SessionError> {
        let req = build_create_session_request(&self.endpoint, session)
            .map_err(|e| SessionError::Network(format!("{e:#}")))?;
        log::debug!("create session: {:?}", req);

        let resp = execute_with(&req, self.timeouts)
            .await
            .map_err(|e| SessionError::Network(format!("{e:#}")))?;
        if !resp.is_success() {
            return Err(SessionError::Rejected {
                status: resp.status,
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ExchangeBackend for AgentHttpBackend {
    async fn exchange(
        &self,
        artifact: &CaptureArtifact,
        ctx: &ExchangeContext,
    ) -> Result<ExchangeResult, ExchangeError> {
        let CaptureArtifact::Transcript(text) = artifact else {
            return Err(ExchangeError::Unsupported(artifact.kind().label()));
        };
        let session = ctx.session.as_ref().ok_or(ExchangeError::MissingSession)?;

        let req = build_run_request(&self.endpoint, session, text)
            .map_err(|e| ExchangeError::Network(format!("{e:#}")))?;
        log::debug!("run: {:?}", req);

        let resp = execute_with(&req, self.timeouts)
            .await
            .map_err(|e| ExchangeError::Network(format!("{e:#}")))?;
        if !resp.is_success() {
            return Err(ExchangeError::Server {
                status: resp.status,
                message: truncate(&resp.body_text()),
            });
        }

        let answer = parse_agent_answer(&resp.body)
            .map_err(|e| ExchangeError::MalformedResponse(format!("{e:#}")))?;
        Ok(ExchangeResult::VoiceAnswer(answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_bodies_on_char_boundaries() {
        let long = "₹".repeat(ERROR_BODY_LIMIT + 10);
        let t = truncate(&long);
        assert_eq!(t.chars().count(), ERROR_BODY_LIMIT + 1);
        assert!(t.ends_with('…'));
        assert_eq!(truncate("short"), "short");
    }

    #[tokio::test]
    async fn non_transcript_artifacts_are_unsupported() {
        let backend = AgentHttpBackend::new(
            AgentEndpoint {
                base_url: "http://127.0.0.1:9".into(),
                app_name: "app".into(),
            },
            HttpTimeouts::default(),
        );
        let q = mitra_core::artifact::MarketQuery {
            crop: "onion".into(),
            location: "Hubli".into(),
        };
        let err = backend
            .exchange(&CaptureArtifact::MarketQuery(q), &ExchangeContext::default())
            .await
            .unwrap_err();
        assert_eq!(err, ExchangeError::Unsupported("market_query"));
    }

    #[tokio::test]
    async fn voice_without_session_is_rejected_locally() {
        let backend = AgentHttpBackend::new(
            AgentEndpoint {
                base_url: "http://127.0.0.1:9".into(),
                app_name: "app".into(),
            },
            HttpTimeouts::default(),
        );
        let err = backend
            .exchange(
                &CaptureArtifact::Transcript("hello".into()),
                &ExchangeContext::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err, ExchangeError::MissingSession);
    }
}

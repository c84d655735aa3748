use crate::agent_backend::truncate;
use mitra_core::artifact::{CaptureArtifact, ExchangeContext};
use mitra_core::error::ExchangeError;
use mitra_core::result::ExchangeResult;
use mitra_engine::traits::ExchangeBackend;
use mitra_providers::functions::{
    FN_CROP_DIAGNOSIS, FN_MARKET_ANALYSIS, FN_VOICE_ASSISTANT, FunctionsEndpoint,
    build_invoke_request, diagnosis_payload, market_payload, voice_payload,
};
use mitra_providers::parse::{
    FunctionEnvelope, parse_diagnosis, parse_function_envelope, parse_market_analysis,
    parse_voice_response,
};
use mitra_providers::runtime::{HttpTimeouts, execute_with};

/// Hosted serverless functions, one per artifact kind.
#[derive(Debug, Clone)]
pub struct FunctionsBackend {
    endpoint: FunctionsEndpoint,
    timeouts: HttpTimeouts,
}

impl FunctionsBackend {
    pub fn new(endpoint: FunctionsEndpoint, timeouts: HttpTimeouts) -> Self {
        Self { endpoint, timeouts }
    }

    async fn invoke(
        &self,
        name: &str,
        payload: serde_json::Value,
    ) -> Result<FunctionEnvelope, ExchangeError> {
        let req = build_invoke_request(&self.endpoint, name, &payload)
            .map_err(|e| ExchangeError::Network(format!("{e:#}")))?;
        log::debug!("invoke {name}: {:?}", req);

        let resp = execute_with(&req, self.timeouts)
            .await
            .map_err(|e| ExchangeError::Network(format!("{e:#}")))?;

        let envelope = parse_function_envelope(&resp.body);
        if !resp.is_success() {
            let message = envelope
                .ok()
                .and_then(|env| env.error)
                .unwrap_or_else(|| truncate(&resp.body_text()));
            return Err(ExchangeError::Server {
                status: resp.status,
                message,
            });
        }

        let env = envelope.map_err(|e| ExchangeError::MalformedResponse(format!("{e:#}")))?;
        if !env.success {
            return Err(ExchangeError::Server {
                status: resp.status,
                message: env
                    .error
                    .unwrap_or_else(|| format!("{name} reported failure")),
            });
        }
        Ok(env)
    }
}

fn malformed(e: anyhow::Error) -> ExchangeError {
    ExchangeError::MalformedResponse(format!("{e:#}"))
}

#[async_trait::async_trait]
impl ExchangeBackend for FunctionsBackend {
    async fn exchange(
        &self,
        artifact: &CaptureArtifact,
        ctx: &ExchangeContext,
    ) -> Result<ExchangeResult, ExchangeError> {
        match artifact {
            CaptureArtifact::Image(image) => {
                let env = self
                    .invoke(
                        FN_CROP_DIAGNOSIS,
                        diagnosis_payload(image, ctx.prompt_or_default()),
                    )
                    .await?;
                Ok(ExchangeResult::Diagnosis(
                    parse_diagnosis(&env).map_err(malformed)?,
                ))
            }
            CaptureArtifact::MarketQuery(query) => {
                let env = self
                    .invoke(FN_MARKET_ANALYSIS, market_payload(query))
                    .await?;
                Ok(ExchangeResult::Market(
                    parse_market_analysis(&env, &query.crop).map_err(malformed)?,
                ))
            }
            CaptureArtifact::Transcript(text) => {
                let env = self
                    .invoke(FN_VOICE_ASSISTANT, voice_payload(text, ctx.language))
                    .await?;
                Ok(ExchangeResult::VoiceAnswer(
                    parse_voice_response(&env).map_err(malformed)?,
                ))
            }
        }
    }
}

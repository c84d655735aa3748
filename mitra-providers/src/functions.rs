use crate::agent::join_segments;
use crate::request::HttpRequest;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use mitra_core::artifact::{ImageBlob, MarketQuery};
use mitra_core::language::Language;
use serde_json::json;

pub const FN_CROP_DIAGNOSIS: &str = "crop-diagnosis";
pub const FN_MARKET_ANALYSIS: &str = "market-analysis";
pub const FN_VOICE_ASSISTANT: &str = "voice-assistant";

#[derive(Clone, PartialEq, Eq)]
pub struct FunctionsEndpoint {
    pub base_url: String,
    pub api_key: String,
}

impl std::fmt::Debug for FunctionsEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionsEndpoint")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl FunctionsEndpoint {
    fn authorize(&self, req: HttpRequest) -> HttpRequest {
        if self.api_key.trim().is_empty() {
            return req;
        }
        req.with_header("Authorization", format!("Bearer {}", self.api_key))
            .with_header("apikey", self.api_key.clone())
    }
}

/// `POST {base}/functions/v1/{name}`.
pub fn build_invoke_request(
    endpoint: &FunctionsEndpoint,
    name: &str,
    payload: &serde_json::Value,
) -> anyhow::Result<HttpRequest> {
    let url = join_segments(&endpoint.base_url, &["functions", "v1", name])?;
    Ok(endpoint.authorize(HttpRequest::post_json(url, payload)))
}

/// `POST {base}/rest/v1/{table}` appending one row.
pub fn build_table_insert_request(
    endpoint: &FunctionsEndpoint,
    table: &str,
    row: &serde_json::Value,
) -> anyhow::Result<HttpRequest> {
    let url = join_segments(&endpoint.base_url, &["rest", "v1", table])?;
    Ok(endpoint
        .authorize(HttpRequest::post_json(url, row))
        .with_header("Prefer", "return=minimal"))
}

pub fn diagnosis_payload(image: &ImageBlob, prompt: &str) -> serde_json::Value {
    json!({
        "imageBase64": STANDARD.encode(&image.bytes),
        "prompt": prompt,
    })
}

pub fn market_payload(query: &MarketQuery) -> serde_json::Value {
    json!({
        "crop": query.crop,
        "location": query.location,
    })
}

pub fn voice_payload(transcript: &str, language: Language) -> serde_json::Value {
    json!({
        "transcript": transcript,
        "language": language.code(),
    })
}

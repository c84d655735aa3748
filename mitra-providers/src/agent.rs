use crate::request::HttpRequest;
use anyhow::{Context, anyhow};
use mitra_core::types::Session;
use serde_json::json;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentEndpoint {
    pub base_url: String,
    pub app_name: String,
}

/// `POST {base}/apps/{app}/users/{farmer}/sessions/{session}` with `{}`.
pub fn build_create_session_request(
    endpoint: &AgentEndpoint,
    session: &Session,
) -> anyhow::Result<HttpRequest> {
    let url = join_segments(
        &endpoint.base_url,
        &[
            "apps",
            &endpoint.app_name,
            "users",
            session.farmer_id.as_str(),
            "sessions",
            session.session_id.as_str(),
        ],
    )?;
    Ok(HttpRequest::post_json(url, &json!({})))
}

/// `POST {base}/run` carrying the session and one user message.
pub fn build_run_request(
    endpoint: &AgentEndpoint,
    session: &Session,
    text: &str,
) -> anyhow::Result<HttpRequest> {
    let url = join_segments(&endpoint.base_url, &["run"])?;
    let payload = json!({
        "appName": endpoint.app_name,
        "userId": session.farmer_id.as_str(),
        "sessionId": session.session_id.as_str(),
        "newMessage": {
            "parts": [{ "text": text }],
            "role": "user",
        },
    });
    Ok(HttpRequest::post_json(url, &payload))
}

// Segments are percent-encoded, so ids can't escape their path position.
pub(crate) fn join_segments(base: &str, segments: &[&str]) -> anyhow::Result<String> {
    let mut url = Url::parse(base).with_context(|| format!("invalid base url: {base}"))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("base url cannot have a path: {base}"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.into())
}

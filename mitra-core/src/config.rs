use crate::language::Language;
use serde::{Deserialize, Serialize};

pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 15_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Simulated,
    Agent,
    Functions,
}

/// Which backend serves each artifact kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendRoutes {
    pub diagnosis: BackendKind,
    pub market: BackendKind,
    pub voice: BackendKind,
}

impl BackendRoutes {
    pub fn all(kind: BackendKind) -> Self {
        Self {
            diagnosis: kind,
            market: kind,
            voice: kind,
        }
    }

    pub fn uses(&self, kind: BackendKind) -> bool {
        self.diagnosis == kind || self.market == kind || self.voice == kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSettings {
    pub base_url: String,
    pub app_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionsSettings {
    pub base_url: String,

    // Secrets are stored outside this struct at rest.
    #[serde(default)]
    pub api_key_present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub backends: BackendRoutes,
    pub agent: AgentSettings,
    pub functions: FunctionsSettings,
    pub language: Language,
    pub default_location: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub simulated_latency_ms: u64,
    #[serde(default = "default_true")]
    pub history_enabled: bool,
}

fn default_true() -> bool {
    true
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

use std::sync::Arc;
use std::time::Duration;

use mitra_core::config::{AppConfig, BackendKind};
use mitra_engine::traits::{ExchangeBackend, RecordSink, SessionBackend};
use mitra_providers::agent::AgentEndpoint;
use mitra_providers::functions::FunctionsEndpoint;
use mitra_providers::runtime::HttpTimeouts;

use crate::agent_backend::AgentHttpBackend;
use crate::functions_backend::FunctionsBackend;
use crate::router::BackendRouter;
use crate::secrets::{SecretKey, get_secret};
use crate::simulated::{LocalSessionBackend, SimulatedBackend};
use crate::tables::RemoteTableSink;

/// Environment override for the function platform key.
pub const FUNCTIONS_API_KEY_ENV: &str = "MITRA_FUNCTIONS_API_KEY";

/// Everything a surface needs to talk to the outside world.
#[derive(Clone)]
pub struct Backends {
    pub sessions: Arc<dyn SessionBackend>,
    pub exchange: Arc<dyn ExchangeBackend>,
    /// Remote record tables, present when the function platform is in use.
    pub records: Option<Arc<dyn RecordSink>>,
}

/// Env var first, then the OS keyring. A missing key is not an error.
pub fn resolve_functions_api_key() -> String {
    if let Ok(v) = std::env::var(FUNCTIONS_API_KEY_ENV) {
        if !v.trim().is_empty() {
            return v;
        }
    }
    match get_secret(SecretKey::FunctionsApiKey) {
        Ok(v) => v.unwrap_or_default(),
        Err(e) => {
            log::warn!("keyring unavailable, continuing without functions key: {e:#}");
            String::new()
        }
    }
}

/// Build backends from config, reading secrets only when a remote platform needs them.
pub fn build_backends_from_config(cfg: &AppConfig) -> Backends {
    let api_key = if cfg.backends.uses(BackendKind::Functions) {
        resolve_functions_api_key()
    } else {
        String::new()
    };
    build_backends(cfg, api_key)
}

pub fn build_backends(cfg: &AppConfig, functions_api_key: String) -> Backends {
    let timeouts = HttpTimeouts::with_request_ms(cfg.request_timeout_ms);

    let agent = Arc::new(AgentHttpBackend::new(
        AgentEndpoint {
            base_url: cfg.agent.base_url.clone(),
            app_name: cfg.agent.app_name.clone(),
        },
        timeouts,
    ));
    let functions_endpoint = FunctionsEndpoint {
        base_url: cfg.functions.base_url.clone(),
        api_key: functions_api_key,
    };
    let functions = Arc::new(FunctionsBackend::new(functions_endpoint.clone(), timeouts));
    let simulated = Arc::new(
        SimulatedBackend::new().with_latency(Duration::from_millis(cfg.simulated_latency_ms)),
    );

    let pick = |kind: BackendKind| -> Arc<dyn ExchangeBackend> {
        match kind {
            BackendKind::Simulated => simulated.clone(),
            BackendKind::Agent => agent.clone(),
            BackendKind::Functions => functions.clone(),
        }
    };
    let router = BackendRouter::new()
        .with_diagnosis(pick(cfg.backends.diagnosis))
        .with_market(pick(cfg.backends.market))
        .with_voice(pick(cfg.backends.voice));

    // Only the agent keeps server-side conversations.
    let sessions: Arc<dyn SessionBackend> = match cfg.backends.voice {
        BackendKind::Agent => agent.clone(),
        _ => Arc::new(LocalSessionBackend),
    };

    let records: Option<Arc<dyn RecordSink>> = cfg
        .backends
        .uses(BackendKind::Functions)
        .then(|| Arc::new(RemoteTableSink::new(functions_endpoint, timeouts)) as Arc<dyn RecordSink>);

    log::info!(
        "backends: diagnosis={:?} market={:?} voice={:?} remote_records={}",
        cfg.backends.diagnosis,
        cfg.backends.market,
        cfg.backends.voice,
        records.is_some()
    );

    Backends {
        sessions,
        exchange: Arc::new(router),
        records,
    }
}

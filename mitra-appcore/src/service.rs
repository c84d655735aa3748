use std::path::{Path, PathBuf};
use std::sync::Arc;

use mitra_core::config::AppConfig;
use mitra_core::record::{InteractionRecord, RecordKind};
use mitra_engine::capture::{AnalysisSurface, VoiceCaptureSurface};
use mitra_engine::exchange::ExchangeClient;
use mitra_engine::session::SessionManager;
use mitra_engine::traits::{SpeechRecognizer, SpeechSynthesizer};
use mitra_runtime::config_store::ConfigStore;
use mitra_runtime::history::HistoryStore;
use mitra_runtime::runtime_backends::{Backends, build_backends_from_config};
use mitra_runtime::secrets::{SecretKey, delete_secret, get_secret, set_secret};

use crate::view::ViewController;

/// Config, secrets and history around one set of capture devices.
#[derive(Clone)]
pub struct AppService {
    config_store: ConfigStore,
    recognizer: Arc<dyn SpeechRecognizer>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl AppService {
    pub fn new(
        config_path: PathBuf,
        recognizer: Arc<dyn SpeechRecognizer>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            config_store: ConfigStore::at_path(config_path),
            recognizer,
            synthesizer,
        }
    }

    pub fn config_path(&self) -> &Path {
        self.config_store.path()
    }

    /// Stored config, or defaults on first run.
    pub fn load_config(&self) -> anyhow::Result<AppConfig> {
        self.config_store.load_or_default()
    }

    pub fn save_config(&self, cfg: &AppConfig) -> anyhow::Result<()> {
        self.config_store.save(cfg)
    }

    /// Local history lives next to the config file.
    pub fn history_store(&self) -> HistoryStore {
        let path = self
            .config_store
            .path()
            .parent()
            .map(|p| p.join("history.json"))
            .unwrap_or_else(|| PathBuf::from("history.json"));
        HistoryStore::at_path(path)
    }

    /// Newest first.
    pub fn recent_activity(&self, limit: usize) -> anyhow::Result<Vec<InteractionRecord>> {
        let mut entries = self.history_store().load()?;
        entries.reverse();
        entries.truncate(limit);
        Ok(entries)
    }

    /// Same as `recent_activity`, restricted to one kind of interaction.
    pub fn recent_activity_of(
        &self,
        kind: RecordKind,
        limit: usize,
    ) -> anyhow::Result<Vec<InteractionRecord>> {
        let mut entries = self.history_store().load_kind(kind)?;
        entries.reverse();
        entries.truncate(limit);
        Ok(entries)
    }

    pub fn set_functions_api_key(&self, value: &str) -> anyhow::Result<()> {
        set_secret(SecretKey::FunctionsApiKey, value)?;
        let mut cfg = self.load_config()?;
        cfg.functions.api_key_present = true;
        self.save_config(&cfg)
    }

    pub fn get_functions_api_key_present(&self) -> anyhow::Result<bool> {
        Ok(get_secret(SecretKey::FunctionsApiKey)?.is_some())
    }

    pub fn clear_api_keys(&self) -> anyhow::Result<()> {
        delete_secret(SecretKey::FunctionsApiKey)
    }

    pub fn build_controller(&self) -> anyhow::Result<ViewController> {
        let cfg = self.load_config()?;
        let backends = build_backends_from_config(&cfg);
        Ok(self.controller_with(&cfg, backends))
    }

    /// Wires surfaces over already-built backends.
    pub fn controller_with(&self, cfg: &AppConfig, backends: Backends) -> ViewController {
        let sessions = Arc::new(SessionManager::new(backends.sessions.clone()));
        let exchange = ExchangeClient::new(backends.exchange.clone());

        let voice = VoiceCaptureSurface::new(
            sessions,
            exchange.clone(),
            self.recognizer.clone(),
            self.synthesizer.clone(),
            cfg.language,
        );
        let photo = AnalysisSurface::new(exchange.clone(), self.synthesizer.clone());
        let market = AnalysisSurface::new(exchange, self.synthesizer.clone());

        let mut controller =
            ViewController::new(voice, photo, market, cfg.language, cfg.default_location.clone());
        if cfg.history_enabled {
            controller = controller.with_sink(Arc::new(self.history_store()));
        }
        if let Some(records) = backends.records {
            controller = controller.with_sink(records);
        }
        controller
    }
}

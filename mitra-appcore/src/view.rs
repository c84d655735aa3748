use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use mitra_core::artifact::ImageBlob;
use mitra_core::error::{FlowError, Notification};
use mitra_core::language::Language;
use mitra_core::record::{InteractionRecord, RecordKind};
use mitra_core::result::ExchangeResult;
use mitra_engine::capture::{AnalysisSurface, VoiceCaptureSurface, VoiceOutcome, VoiceState};
use mitra_engine::render::{RenderedView, price_board_view};
use mitra_engine::traits::RecordSink;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Home,
    Diagnose,
    Prices,
    Schemes,
    Profile,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Home, Tab::Diagnose, Tab::Prices, Tab::Schemes, Tab::Profile];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::Diagnose => "Diagnose",
            Tab::Prices => "Prices",
            Tab::Schemes => "Schemes",
            Tab::Profile => "Profile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    DiagnoseCrop,
    AskVoice,
    MarketPrices,
    GovernmentSchemes,
}

impl QuickAction {
    pub const ALL: [QuickAction; 4] = [
        QuickAction::DiagnoseCrop,
        QuickAction::AskVoice,
        QuickAction::MarketPrices,
        QuickAction::GovernmentSchemes,
    ];

    pub fn title(self) -> &'static str {
        match self {
            QuickAction::DiagnoseCrop => "Diagnose Crop Disease",
            QuickAction::AskVoice => "Ask Voice Assistant",
            QuickAction::MarketPrices => "Market Prices",
            QuickAction::GovernmentSchemes => "Government Schemes",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            QuickAction::DiagnoseCrop => {
                "Take a photo of your crop to identify diseases and get treatment recommendations"
            }
            QuickAction::AskVoice => "Speak your farming questions in your preferred language",
            QuickAction::MarketPrices => "Get real-time crop prices and selling recommendations",
            QuickAction::GovernmentSchemes => {
                "Find and apply for agricultural subsidies and schemes"
            }
        }
    }

    /// Schemes have no screen yet.
    pub fn enabled(self) -> bool {
        !matches!(self, QuickAction::GovernmentSchemes)
    }
}

pub(crate) fn now_unix_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .try_into()
        .unwrap_or(i64::MAX)
}

/// Top-level screen state: tabs, the camera/voice modals and the capture surfaces behind them.
pub struct ViewController {
    active_tab: Tab,
    show_camera: bool,
    show_voice: bool,
    language: Language,
    default_location: String,
    voice: VoiceCaptureSurface,
    photo: AnalysisSurface,
    market: AnalysisSurface,
    sinks: Vec<Arc<dyn RecordSink>>,
    last_notification: Option<Notification>,
}

impl ViewController {
    pub fn new(
        voice: VoiceCaptureSurface,
        photo: AnalysisSurface,
        market: AnalysisSurface,
        language: Language,
        default_location: impl Into<String>,
    ) -> Self {
        Self {
            active_tab: Tab::Home,
            show_camera: false,
            show_voice: false,
            language,
            default_location: default_location.into(),
            voice,
            photo,
            market,
            sinks: vec![],
            last_notification: None,
        }
    }

    /// Completed interactions are appended to every sink, best effort.
    pub fn with_sink(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn set_tab(&mut self, tab: Tab) {
        log::debug!("tab: {:?} -> {:?}", self.active_tab, tab);
        self.active_tab = tab;
    }

    pub fn is_camera_open(&self) -> bool {
        self.show_camera
    }

    pub fn is_voice_open(&self) -> bool {
        self.show_voice
    }

    pub fn show_camera(&mut self) {
        self.show_voice = false;
        self.show_camera = true;
    }

    pub fn show_voice(&mut self) {
        self.show_camera = false;
        self.show_voice = true;
    }

    pub fn close_modals(&mut self) {
        self.show_camera = false;
        self.show_voice = false;
    }

    /// Returns false for disabled actions.
    pub fn trigger(&mut self, action: QuickAction) -> bool {
        if !action.enabled() {
            return false;
        }
        match action {
            QuickAction::DiagnoseCrop => self.show_camera(),
            QuickAction::AskVoice => self.show_voice(),
            QuickAction::MarketPrices => self.set_tab(Tab::Prices),
            QuickAction::GovernmentSchemes => self.set_tab(Tab::Schemes),
        }
        true
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub async fn set_language(&mut self, language: Language) {
        self.language = language;
        self.voice.set_language(language).await;
    }

    pub fn default_location(&self) -> &str {
        &self.default_location
    }

    pub fn last_notification(&self) -> Option<&Notification> {
        self.last_notification.as_ref()
    }

    pub fn voice(&self) -> &VoiceCaptureSurface {
        &self.voice
    }

    pub fn photo(&self) -> &AnalysisSurface {
        &self.photo
    }

    pub fn market(&self) -> &AnalysisSurface {
        &self.market
    }

    pub async fn voice_state(&self) -> VoiceState {
        self.voice.state().await
    }

    pub async fn ask_voice(&mut self) -> Result<VoiceOutcome, FlowError> {
        self.ask_voice_with_hook(|_state| async {}).await
    }

    pub async fn ask_voice_with_hook<F, Fut>(
        &mut self,
        on_state: F,
    ) -> Result<VoiceOutcome, FlowError>
    where
        F: Fn(VoiceState) -> Fut,
        Fut: std::future::Future<Output = ()>,
    {
        self.show_voice();
        let res = self.voice.record_with_hook(on_state).await;

        let transcript = self.voice.transcript().await.unwrap_or_default();
        let output = res.as_ref().ok().map(|o| o.result.clone());
        self.settle(RecordKind::VoiceInteraction, transcript, None, output, &res)
            .await;
        res
    }

    pub async fn diagnose(
        &mut self,
        image: ImageBlob,
    ) -> Result<(ExchangeResult, RenderedView), FlowError> {
        self.show_camera();
        let filename = image.filename.clone();
        let res = self.photo.submit_image(image, self.language, None).await;

        let output = res.as_ref().ok().map(|(r, _)| r.clone());
        self.settle(RecordKind::Diagnosis, filename, None, output, &res)
            .await;
        res
    }

    /// Switches to the prices tab and shows today's board.
    pub fn open_prices(&mut self) -> RenderedView {
        self.set_tab(Tab::Prices);
        price_board_view(&mitra_runtime::defaults::price_board())
    }

    /// Empty `location` falls back to the configured default.
    pub async fn analyze_market(
        &mut self,
        crop: &str,
        location: Option<&str>,
    ) -> Result<(ExchangeResult, RenderedView), FlowError> {
        self.set_tab(Tab::Prices);
        let location = location
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(self.default_location.as_str())
            .to_string();
        let res = self
            .market
            .analyze_market(crop, location.clone(), self.language)
            .await;

        let output = res.as_ref().ok().map(|(r, _)| r.clone());
        self.settle(
            RecordKind::MarketQuery,
            crop.trim().to_string(),
            Some(location),
            output,
            &res,
        )
        .await;
        res
    }

    async fn settle<T>(
        &mut self,
        kind: RecordKind,
        input: String,
        location: Option<String>,
        output: Option<ExchangeResult>,
        res: &Result<T, FlowError>,
    ) {
        let mut record = InteractionRecord::new(kind, now_unix_ms(), self.language, input);
        if let Some(l) = location {
            record = record.with_location(l);
        }

        match (res, output) {
            (Ok(_), Some(out)) => {
                self.last_notification = None;
                record = record.with_output(out);
            }
            (Err(e), _) => {
                self.last_notification = Some(e.user_message());
                // Concurrent taps are not interactions.
                if *e == FlowError::Busy {
                    return;
                }
                record = record.with_error(e.to_string());
            }
            (Ok(_), None) => {}
        }

        for sink in &self.sinks {
            if let Err(e) = sink.append(&record).await {
                log::warn!("failed to persist {:?} record: {e:#}", record.kind);
            }
        }
    }
}

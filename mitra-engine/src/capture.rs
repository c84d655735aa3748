use crate::exchange::ExchangeClient;
use crate::render::{RenderedView, ResultRenderer};
use crate::session::SessionManager;
use crate::traits::{SpeechRecognizer, SpeechSynthesizer};
use mitra_core::artifact::{CaptureArtifact, ExchangeContext, ImageBlob, MarketQuery};
use mitra_core::error::{FlowError, Notification};
use mitra_core::language::Language;
use mitra_core::result::ExchangeResult;
use mitra_core::types::Session;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VoiceState {
    #[default]
    Idle,
    Recording,
    Processing,
    Error,
}

impl VoiceState {
    pub fn can_transition(self, next: VoiceState) -> bool {
        use VoiceState::*;
        matches!(
            (self, next),
            (Idle, Recording)
                | (Recording, Processing)
                | (Processing, Idle)
                | (Idle, Error)
                | (Recording, Error)
                | (Error, Idle)
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            VoiceState::Idle => "idle",
            VoiceState::Recording => "recording",
            VoiceState::Processing => "processing",
            VoiceState::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoiceOutcome {
    pub session: Session,
    pub transcript: String,
    pub result: ExchangeResult,
    pub view: RenderedView,
}

struct VoiceInner {
    state: VoiceState,
    language: Language,
    transcript: Option<String>,
    renderer: ResultRenderer,
}

/// Voice capture surface: `Idle -> Recording -> Processing -> Idle`.
#[derive(Clone)]
pub struct VoiceCaptureSurface {
    sessions: Arc<SessionManager>,
    exchange: ExchangeClient,
    recognizer: Arc<dyn SpeechRecognizer>,
    inner: Arc<Mutex<VoiceInner>>,
    // Held for the whole flow; a second `record` while held is `Busy`.
    flow: Arc<Mutex<()>>,
}

impl VoiceCaptureSurface {
    pub fn new(
        sessions: Arc<SessionManager>,
        exchange: ExchangeClient,
        recognizer: Arc<dyn SpeechRecognizer>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        language: Language,
    ) -> Self {
        Self {
            sessions,
            exchange,
            recognizer,
            inner: Arc::new(Mutex::new(VoiceInner {
                state: VoiceState::Idle,
                language,
                transcript: None,
                renderer: ResultRenderer::new(synthesizer),
            })),
            flow: Arc::new(Mutex::new(())),
        }
    }

    pub async fn state(&self) -> VoiceState {
        self.inner.lock().await.state
    }

    pub async fn language(&self) -> Language {
        self.inner.lock().await.language
    }

    pub async fn set_language(&self, language: Language) {
        self.inner.lock().await.language = language;
    }

    pub async fn transcript(&self) -> Option<String> {
        self.inner.lock().await.transcript.clone()
    }

    pub async fn view(&self) -> Option<RenderedView> {
        self.inner.lock().await.renderer.view().cloned()
    }

    pub async fn notification(&self) -> Option<Notification> {
        self.inner.lock().await.renderer.notification().cloned()
    }

    pub async fn session(&self) -> Option<Session> {
        self.sessions.current().await
    }

    /// Re-speaks the last answer.
    pub async fn replay(&self) -> bool {
        self.inner.lock().await.renderer.replay()
    }

    /// Stops listening early. Only meaningful while recording.
    pub async fn stop(&self) {
        if self.state().await == VoiceState::Recording {
            self.recognizer.stop();
        }
    }

    pub async fn record(&self) -> Result<VoiceOutcome, FlowError> {
        self.record_with_hook(|_state| async {}).await
    }

    /// Runs one full interaction, reporting each state change to `on_state`.
    ///
    /// The hook is meant for UI progress and must be fast.
    pub async fn record_with_hook<F, Fut>(&self, on_state: F) -> Result<VoiceOutcome, FlowError>
    where
        F: Fn(VoiceState) -> Fut,
        Fut: Future<Output = ()>,
    {
        let _flow = self.flow.try_lock().map_err(|_| FlowError::Busy)?;

        let language = {
            let mut inner = self.inner.lock().await;
            inner.renderer.clear();
            inner.transcript = None;
            inner.language
        };

        // Recording needs an established session; the mic stays untouched until then.
        let session = match self.sessions.ensure_session().await {
            Ok(s) => s,
            Err(e) => return Err(self.fail(e.into(), false, &on_state).await),
        };

        if let Err(e) = self.recognizer.start(language).await {
            return Err(self.fail(e.into(), true, &on_state).await);
        }
        self.set_state(VoiceState::Recording, &on_state).await;

        let transcript = match self.recognizer.finalize().await {
            Ok(t) => t,
            Err(e) => return Err(self.fail(e.into(), true, &on_state).await),
        };
        log::info!("recognized transcript ({} chars)", transcript.chars().count());

        self.inner.lock().await.transcript = Some(transcript.clone());
        self.set_state(VoiceState::Processing, &on_state).await;

        let ctx = ExchangeContext::new(language).with_session(session.clone());
        let res = self
            .exchange
            .exchange(CaptureArtifact::Transcript(transcript.clone()), &ctx)
            .await;

        match res {
            Ok(result) => {
                let view = self.inner.lock().await.renderer.render(&result, language);
                self.set_state(VoiceState::Idle, &on_state).await;
                Ok(VoiceOutcome {
                    session,
                    transcript,
                    result,
                    view,
                })
            }
            Err(e) => {
                self.inner.lock().await.renderer.render_error(&e);
                self.set_state(VoiceState::Idle, &on_state).await;
                Err(e)
            }
        }
    }

    // Capture failures pass through `Error` on their way back to `Idle`.
    async fn fail<F, Fut>(&self, err: FlowError, via_error: bool, on_state: &F) -> FlowError
    where
        F: Fn(VoiceState) -> Fut,
        Fut: Future<Output = ()>,
    {
        log::error!("voice capture failed: {err}");
        if via_error {
            self.set_state(VoiceState::Error, on_state).await;
        }
        self.inner.lock().await.renderer.render_error(&err);
        if via_error {
            self.set_state(VoiceState::Idle, on_state).await;
        }
        err
    }

    async fn set_state<F, Fut>(&self, next: VoiceState, on_state: &F)
    where
        F: Fn(VoiceState) -> Fut,
        Fut: Future<Output = ()>,
    {
        {
            let mut inner = self.inner.lock().await;
            let prev = inner.state;
            if prev == next {
                return;
            }
            if !prev.can_transition(next) {
                log::warn!("unexpected voice stage transition: {:?} -> {:?}", prev, next);
            }
            log::info!("voice stage: {:?} -> {:?}", prev, next);
            inner.state = next;
        }
        on_state(next).await;
    }
}

struct AnalysisInner {
    analyzing: bool,
    renderer: ResultRenderer,
}

/// Photo and market surfaces: one artifact in, one rendered result out.
#[derive(Clone)]
pub struct AnalysisSurface {
    exchange: ExchangeClient,
    inner: Arc<Mutex<AnalysisInner>>,
    flow: Arc<Mutex<()>>,
}

impl AnalysisSurface {
    pub fn new(exchange: ExchangeClient, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            exchange,
            inner: Arc::new(Mutex::new(AnalysisInner {
                analyzing: false,
                renderer: ResultRenderer::new(synthesizer),
            })),
            flow: Arc::new(Mutex::new(())),
        }
    }

    pub async fn is_analyzing(&self) -> bool {
        self.inner.lock().await.analyzing
    }

    pub async fn view(&self) -> Option<RenderedView> {
        self.inner.lock().await.renderer.view().cloned()
    }

    pub async fn notification(&self) -> Option<Notification> {
        self.inner.lock().await.renderer.notification().cloned()
    }

    /// Clears the shown result (the "retake" button).
    pub async fn reset(&self) {
        self.inner.lock().await.renderer.clear();
    }

    pub async fn submit_image(
        &self,
        image: ImageBlob,
        language: Language,
        prompt: Option<String>,
    ) -> Result<(ExchangeResult, RenderedView), FlowError> {
        let mut ctx = ExchangeContext::new(language);
        ctx.prompt = prompt;
        self.submit(CaptureArtifact::Image(image), ctx).await
    }

    pub async fn analyze_market(
        &self,
        crop: impl Into<String>,
        location: impl Into<String>,
        language: Language,
    ) -> Result<(ExchangeResult, RenderedView), FlowError> {
        let crop: String = crop.into();
        let location: String = location.into();
        let query = MarketQuery {
            crop: crop.trim().to_string(),
            location: location.trim().to_string(),
        };
        self.submit(CaptureArtifact::MarketQuery(query), ExchangeContext::new(language))
            .await
    }

    pub async fn submit(
        &self,
        artifact: CaptureArtifact,
        ctx: ExchangeContext,
    ) -> Result<(ExchangeResult, RenderedView), FlowError> {
        let _flow = self.flow.try_lock().map_err(|_| FlowError::Busy)?;

        {
            let mut inner = self.inner.lock().await;
            inner.renderer.clear();
            inner.analyzing = true;
        }

        let res = self.exchange.exchange(artifact, &ctx).await;

        let mut inner = self.inner.lock().await;
        inner.analyzing = false;
        match res {
            Ok(result) => {
                let view = inner.renderer.render(&result, ctx.language);
                Ok((result, view))
            }
            Err(e) => {
                inner.renderer.render_error(&e);
                Err(e)
            }
        }
    }
}

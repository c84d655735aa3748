use std::sync::Arc;

use mitra_appcore::service::AppService;
use mitra_appcore::view::{QuickAction, Tab};
use mitra_core::artifact::ImageBlob;
use mitra_core::config::{BackendKind, BackendRoutes};
use mitra_core::error::{CaptureError, FlowError, ValidationError};
use mitra_core::language::Language;
use mitra_core::record::RecordKind;
use mitra_core::result::ExchangeResult;
use mitra_engine::capture::VoiceState;
use mitra_platform::test::{MemorySynthesizer, Script, ScriptedRecognizer};
use mitra_runtime::runtime_backends::build_backends;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Fixture {
    _dir: tempfile::TempDir,
    svc: AppService,
    recognizer: Arc<ScriptedRecognizer>,
    speaker: Arc<MemorySynthesizer>,
}

fn fixture(script: Vec<Script>) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let recognizer = Arc::new(ScriptedRecognizer::new(script));
    let speaker = Arc::new(MemorySynthesizer::default());
    let svc = AppService::new(
        dir.path().join("config.json"),
        recognizer.clone(),
        speaker.clone(),
    );
    Fixture {
        _dir: dir,
        svc,
        recognizer,
        speaker,
    }
}

#[tokio::test]
async fn simulated_voice_question_is_answered_spoken_and_logged() {
    let f = fixture(vec![Script::Hear("What's the tomato price today?".into())]);
    let mut cfg = f.svc.load_config().unwrap();
    cfg.language = Language::Hindi;
    f.svc.save_config(&cfg).unwrap();

    let mut ui = f.svc.build_controller().unwrap();
    assert!(ui.trigger(QuickAction::AskVoice));
    assert!(ui.is_voice_open());

    let outcome = ui.ask_voice().await.unwrap();
    let answer = &outcome.result.as_voice_answer().unwrap().text;
    assert!(answer.contains("price"));
    assert!(ui.last_notification().is_none());

    let spoken = f.speaker.spoken();
    assert_eq!(spoken.len(), 1);
    assert_eq!(spoken[0].1, "hi-IN");

    let history = f.svc.recent_activity(10).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, RecordKind::VoiceInteraction);
    assert_eq!(history[0].input, "What's the tomato price today?");
    assert_eq!(history[0].language, Language::Hindi);
    assert!(history[0].output.is_some());
}

#[tokio::test]
async fn denied_microphone_is_notified_and_recorded_as_error() {
    let f = fixture(vec![Script::DenyPermission]);
    let mut ui = f.svc.build_controller().unwrap();

    let err = ui.ask_voice().await.unwrap_err();
    assert!(matches!(
        err,
        FlowError::Capture(CaptureError::PermissionDenied(_))
    ));
    assert_eq!(f.recognizer.starts(), 0);
    assert_eq!(
        ui.last_notification().map(|n| n.title.as_str()),
        Some("Microphone access denied")
    );

    let history = f.svc.recent_activity(10).unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].error.is_some());
}

#[tokio::test]
async fn market_query_defaults_location_and_switches_tab() {
    let f = fixture(vec![]);
    let mut ui = f.svc.build_controller().unwrap();

    let (result, view) = ui.analyze_market("  Onion ", None).await.unwrap();
    assert_eq!(ui.active_tab(), Tab::Prices);
    assert_eq!(view.title, "Market Intelligence: Onion");
    let ExchangeResult::Market(m) = result else {
        panic!("expected market analysis");
    };
    assert_eq!(m.nearby_mandis[0].name, "Bangalore APMC");

    let history = f.svc.recent_activity(1).unwrap();
    assert_eq!(history[0].kind, RecordKind::MarketQuery);
    assert_eq!(history[0].location.as_deref(), Some("Bangalore"));
}

#[tokio::test]
async fn oversized_photo_is_rejected_with_size_message() {
    let f = fixture(vec![]);
    let mut ui = f.svc.build_controller().unwrap();

    let photo = ImageBlob::new("field.jpg", "image/jpeg", vec![0; 6 * 1024 * 1024]);
    let err = ui.diagnose(photo).await.unwrap_err();

    assert!(matches!(
        err,
        FlowError::Validation(ValidationError::FileTooLarge { .. })
    ));
    assert!(ui.is_camera_open());
    assert_eq!(
        ui.last_notification().map(|n| n.description.as_str()),
        Some("Please select an image smaller than 5MB")
    );
}

#[tokio::test]
async fn history_can_be_turned_off() {
    let f = fixture(vec![Script::Hear("hello".into())]);
    let mut cfg = f.svc.load_config().unwrap();
    cfg.history_enabled = false;
    f.svc.save_config(&cfg).unwrap();

    let mut ui = f.svc.build_controller().unwrap();
    ui.ask_voice().await.unwrap();
    assert!(f.svc.recent_activity(10).unwrap().is_empty());
}

#[tokio::test]
async fn functions_platform_answers_and_stores_rows() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/voice-assistant"))
        .and(body_partial_json(json!({"transcript": "ಇಂದು ಟೊಮೇಟೋ ಬೆಲೆ ಎಷ್ಟು?", "language": "kn"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "response": "Current tomato prices in Bangalore: ₹25-30 per kg."
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/voice_interactions"))
        .and(body_partial_json(json!({"language": "kn"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let f = fixture(vec![Script::Hear("ಇಂದು ಟೊಮೇಟೋ ಬೆಲೆ ಎಷ್ಟು?".into())]);
    let mut cfg = f.svc.load_config().unwrap();
    cfg.backends = BackendRoutes::all(BackendKind::Functions);
    cfg.functions.base_url = server.uri();
    cfg.language = Language::Kannada;

    let mut ui = f.svc.controller_with(&cfg, build_backends(&cfg, "anon".into()));
    let outcome = ui.ask_voice().await.unwrap();
    assert!(outcome.result.as_voice_answer().unwrap().text.contains("₹25-30"));
    assert_eq!(f.speaker.spoken()[0].1, "kn-IN");
}

#[tokio::test]
async fn failing_record_table_does_not_fail_the_interaction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/market-analysis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "analysis": {
                "current_price": "₹25-30 per kg",
                "price_trend": "Increasing (+15% this week)"
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/market_queries"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let f = fixture(vec![]);
    let mut cfg = f.svc.load_config().unwrap();
    cfg.backends.market = BackendKind::Functions;
    cfg.functions.base_url = server.uri();

    let mut ui = f.svc.controller_with(&cfg, build_backends(&cfg, String::new()));
    let (_, view) = ui.analyze_market("tomato", Some("Mysore")).await.unwrap();
    assert_eq!(view.field("Trend"), Some("Increasing (+15% this week)"));
    assert!(ui.last_notification().is_none());

    // Local history still got the record.
    assert_eq!(f.svc.recent_activity(5).unwrap().len(), 1);
}

#[tokio::test]
async fn stop_reaches_recognizer_only_while_recording() {
    let f = fixture(vec![Script::Hear("hello".into())]);
    let mut ui = f.svc.build_controller().unwrap();
    let voice = ui.voice().clone();

    voice.stop().await;
    assert_eq!(f.recognizer.stops(), 0);

    let during = voice.clone();
    ui.ask_voice_with_hook(move |state| {
        let during = during.clone();
        async move {
            if state == VoiceState::Recording {
                during.stop().await;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(f.recognizer.stops(), 1);
    assert_eq!(ui.voice_state().await, VoiceState::Idle);

    voice.stop().await;
    assert_eq!(f.recognizer.stops(), 1);
}

#[tokio::test]
async fn replay_repeats_last_answer_in_its_locale() {
    let f = fixture(vec![Script::Hear("Show me PM Kisan scheme".into())]);
    let mut cfg = f.svc.load_config().unwrap();
    cfg.language = Language::Kannada;
    f.svc.save_config(&cfg).unwrap();

    let mut ui = f.svc.build_controller().unwrap();
    assert!(!ui.voice().replay().await);

    ui.ask_voice().await.unwrap();
    assert!(ui.voice().replay().await);

    let spoken = f.speaker.spoken();
    assert_eq!(spoken.len(), 2);
    assert_eq!(spoken[0], spoken[1]);
    assert!(spoken[1].0.contains("PM-KISAN"));
    assert_eq!(spoken[1].1, "kn-IN");
}

#[tokio::test]
async fn price_board_opens_on_prices_tab() {
    let f = fixture(vec![]);
    let mut ui = f.svc.build_controller().unwrap();

    let view = ui.open_prices();
    assert_eq!(ui.active_tab(), Tab::Prices);
    assert_eq!(view.title, "Today's Market Prices");
    assert_eq!(view.steps.len(), 4);
    assert_eq!(
        view.steps[0],
        "Tomato (Bangalore APMC): ₹45/kg +8.2% [Sell Now]"
    );
    assert_eq!(view.steps[2], "Rice (Mandya Mandi): ₹3200/quintal 0% [Stable]");
    assert!(view.field("Tip").is_some_and(|t| t.starts_with("Tomato")));
}

#[tokio::test]
async fn activity_can_be_filtered_by_kind() {
    let f = fixture(vec![Script::Hear("tomato price".into())]);
    let mut ui = f.svc.build_controller().unwrap();

    ui.analyze_market("Onion", Some("Hubli")).await.unwrap();
    ui.ask_voice().await.unwrap();
    ui.analyze_market("Rice", None).await.unwrap();

    let market = f.svc.recent_activity_of(RecordKind::MarketQuery, 10).unwrap();
    let crops: Vec<_> = market.iter().map(|r| r.input.as_str()).collect();
    assert_eq!(crops, vec!["Rice", "Onion"]);

    let voice = f.svc.recent_activity_of(RecordKind::VoiceInteraction, 1).unwrap();
    assert_eq!(voice[0].input, "tomato price");
    assert!(f.svc.recent_activity_of(RecordKind::Diagnosis, 10).unwrap().is_empty());
}

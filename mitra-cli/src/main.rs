use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand, ValueEnum};
use mitra_appcore::service::AppService;
use mitra_appcore::view::QuickAction;
use mitra_core::artifact::ImageBlob;
use mitra_core::error::FlowError;
use mitra_core::language::Language;
use mitra_core::record::{InteractionRecord, RecordKind};
use mitra_core::validation::mime_type_for_filename;
use mitra_engine::capture::VoiceState;
use mitra_engine::render::RenderedView;
use mitra_engine::traits::SpeechRecognizer;
use mitra_platform::console::{SimulatedRecognizer, StdoutSynthesizer, TypedRecognizer};
use mitra_runtime::defaults::MARKET_LOCATIONS;

#[derive(Parser)]
#[command(
    name = "fasal-mitra",
    version,
    about = "Farmer assistant: voice questions, crop diagnosis and market prices"
)]
struct Cli {
    /// Config file (created by `config init`).
    #[arg(long, global = true, env = "MITRA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Quick actions and the latest activity.
    Home,
    /// Ask the voice assistant one question.
    Voice {
        /// Skip listening and use this text as the recognized speech.
        #[arg(long, conflicts_with = "simulate")]
        transcript: Option<String>,
        /// en, hi or kn. Defaults to the configured language.
        #[arg(long)]
        language: Option<String>,
        /// Pretend to hear one of the sample questions.
        #[arg(long)]
        simulate: bool,
    },
    /// Diagnose a crop photo.
    Diagnose {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        language: Option<String>,
    },
    /// Market price analysis for a crop.
    Market {
        #[arg(long)]
        crop: String,
        /// Defaults to the configured location.
        #[arg(long, value_parser = PossibleValuesParser::new(MARKET_LOCATIONS))]
        location: Option<String>,
    },
    /// Today's price board.
    Prices,
    /// Show or clear recent activity.
    History {
        #[arg(long)]
        clear: bool,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Only show one kind of interaction.
        #[arg(long, value_enum, conflicts_with = "clear")]
        kind: Option<ActivityKind>,
    },
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Manage the function platform API key in the OS keyring.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ActivityKind {
    Voice,
    Diagnosis,
    Market,
}

impl From<ActivityKind> for RecordKind {
    fn from(kind: ActivityKind) -> Self {
        match kind {
            ActivityKind::Voice => RecordKind::VoiceInteraction,
            ActivityKind::Diagnosis => RecordKind::Diagnosis,
            ActivityKind::Market => RecordKind::MarketQuery,
        }
    }
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default config.
    Init {
        #[arg(long)]
        force: bool,
    },
    Show,
}

#[derive(Subcommand)]
enum KeyAction {
    Set { value: String },
    Status,
    Clear,
}

fn default_config_path() -> PathBuf {
    PathBuf::from(".fasal-mitra").join("config.json")
}

fn print_view(view: &RenderedView) {
    print!("{}", view.to_text());
}

fn print_activity(entries: &[InteractionRecord]) {
    if entries.is_empty() {
        println!("Start using the app to see your activity here");
    }
    for e in entries {
        let status = match (&e.output, &e.error) {
            (Some(out), _) => out.kind_label().to_string(),
            (None, Some(err)) => format!("error: {err}"),
            (None, None) => "-".into(),
        };
        println!(
            "{} [{}] {:?} {} -> {}",
            e.ts_unix_ms,
            e.language.code(),
            e.kind,
            e.input,
            status
        );
    }
}

/// Puts the user-facing notification on top; `main` prints the chain once.
fn report(err: FlowError) -> anyhow::Error {
    let n = err.user_message();
    anyhow::Error::new(err).context(format!("{}: {}", n.title, n.description))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);

    let recognizer: Arc<dyn SpeechRecognizer> = match &cli.command {
        Command::Voice {
            simulate: true, ..
        } => Arc::new(SimulatedRecognizer::new(Duration::from_millis(1500))),
        Command::Voice { transcript, .. } => Arc::new(TypedRecognizer::new(transcript.clone())),
        _ => Arc::new(TypedRecognizer::default()),
    };
    let svc = AppService::new(config_path, recognizer, Arc::new(StdoutSynthesizer));

    match cli.command {
        Command::Home => {
            for action in QuickAction::ALL {
                let suffix = if action.enabled() { "" } else { " (coming soon)" };
                println!("{}{suffix}\n  {}", action.title(), action.description());
            }
            println!();
            println!("Recent Activity");
            print_activity(&svc.recent_activity(3)?);
        }
        Command::Voice {
            transcript,
            language,
            ..
        } => {
            let mut ui = svc.build_controller()?;
            if let Some(code) = language {
                ui.set_language(Language::from_code(&code)).await;
            }
            if transcript.is_none() {
                eprintln!("Tap to speak your question ({}):", ui.language().display_name());
            }

            let outcome = ui
                .ask_voice_with_hook(|state| async move {
                    match state {
                        VoiceState::Recording => eprintln!("Listening..."),
                        VoiceState::Processing => eprintln!("Processing your query..."),
                        _ => {}
                    }
                })
                .await
                .map_err(report)?;

            println!("You said: {}", outcome.transcript);
            print_view(&outcome.view);
        }
        Command::Diagnose { image, language } => {
            let bytes = std::fs::read(&image)
                .with_context(|| format!("read image: {}", image.display()))?;
            let filename = image
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".into());
            let mime = mime_type_for_filename(&filename);

            let mut ui = svc.build_controller()?;
            if let Some(code) = language {
                ui.set_language(Language::from_code(&code)).await;
            }
            let (_, view) = ui
                .diagnose(ImageBlob::new(filename, mime, bytes))
                .await
                .map_err(report)?;
            print_view(&view);
        }
        Command::Market { crop, location } => {
            let mut ui = svc.build_controller()?;
            let (_, view) = ui
                .analyze_market(&crop, location.as_deref())
                .await
                .map_err(report)?;
            print_view(&view);
        }
        Command::Prices => {
            let mut ui = svc.build_controller()?;
            print_view(&ui.open_prices());
        }
        Command::History { clear, limit, kind } => {
            if clear {
                svc.history_store().clear()?;
                println!("History cleared");
                return Ok(());
            }
            let entries = match kind {
                Some(kind) => svc.recent_activity_of(kind.into(), limit)?,
                None => svc.recent_activity(limit)?,
            };
            print_activity(&entries);
        }
        Command::Config { action } => match action {
            ConfigAction::Init { force } => {
                let path = svc.config_path().to_path_buf();
                if path.exists() && !force {
                    anyhow::bail!("config already exists: {} (use --force)", path.display());
                }
                svc.save_config(&mitra_runtime::defaults::default_app_config())?;
                println!("Wrote {}", path.display());
            }
            ConfigAction::Show => {
                let cfg = svc.load_config()?;
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            }
        },
        Command::Key { action } => match action {
            KeyAction::Set { value } => {
                svc.set_functions_api_key(value.trim())?;
                println!("Stored functions API key");
            }
            KeyAction::Status => {
                let present = svc.get_functions_api_key_present()?;
                println!("functions API key: {}", if present { "set" } else { "not set" });
            }
            KeyAction::Clear => {
                svc.clear_api_keys()?;
                println!("Cleared stored API keys");
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn market_location_must_be_a_known_market() {
        let cli = Cli::try_parse_from([
            "fasal-mitra",
            "market",
            "--crop",
            "Onion",
            "--location",
            "Hubli",
        ])
        .unwrap();
        match cli.command {
            Command::Market { crop, location } => {
                assert_eq!(crop, "Onion");
                assert_eq!(location.as_deref(), Some("Hubli"));
            }
            _ => panic!("expected market"),
        }

        let err = Cli::try_parse_from([
            "fasal-mitra",
            "market",
            "--crop",
            "Onion",
            "--location",
            "Delhi",
        ])
        .err()
        .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn history_kind_maps_to_record_kind() {
        let cli = Cli::try_parse_from(["fasal-mitra", "history", "--kind", "market"]).unwrap();
        match cli.command {
            Command::History { kind, clear, .. } => {
                assert!(!clear);
                assert_eq!(kind.map(RecordKind::from), Some(RecordKind::MarketQuery));
            }
            _ => panic!("expected history"),
        }
        assert!(Cli::try_parse_from(["fasal-mitra", "history", "--kind", "voice", "--clear"]).is_err());
    }

    #[test]
    fn failures_carry_the_notification_once() {
        let err = report(FlowError::Busy);
        let n = FlowError::Busy.user_message();
        assert_eq!(err.to_string(), format!("{}: {}", n.title, n.description));
        assert_eq!(err.downcast_ref::<FlowError>(), Some(&FlowError::Busy));
        assert_eq!(err.chain().count(), 2);
    }

    #[test]
    fn home_and_prices_take_no_arguments() {
        assert!(matches!(
            Cli::try_parse_from(["fasal-mitra", "prices"]).unwrap().command,
            Command::Prices
        ));
        assert!(matches!(
            Cli::try_parse_from(["fasal-mitra", "home"]).unwrap().command,
            Command::Home
        ));
    }
}

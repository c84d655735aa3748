use std::sync::Mutex;
use std::time::Duration;

use mitra_core::error::CaptureError;
use mitra_core::language::Language;
use mitra_engine::traits::{SpeechRecognizer, SpeechSynthesizer};
use rand::Rng;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Demo questions offered when no microphone is available.
pub fn sample_queries(language: Language) -> [&'static str; 3] {
    match language {
        Language::English => [
            "What's the tomato price today?",
            "My wheat crop has yellow spots",
            "Show me PM Kisan scheme",
        ],
        Language::Hindi => [
            "आज टमाटर का भाव क्या है?",
            "मेरी गेहूं की फसल में पीले धब्बे हैं",
            "पीएम किसान योजना दिखाएं",
        ],
        Language::Kannada => [
            "ಇಂದು ಟೊಮೇಟೋ ಬೆಲೆ ಎಷ್ಟು?",
            "ನನ್ನ ಗೋಧಿ ಬೆಳೆಯಲ್ಲಿ ಹಳದಿ ಚುಕ್ಕೆಗಳಿವೆ",
            "ಪಿಎಂ ಕಿಸಾನ್ ಯೋಜನೆ ತೋರಿಸಿ",
        ],
    }
}

/// "Hears" a random sample question after a short listening delay.
#[derive(Debug)]
pub struct SimulatedRecognizer {
    listen_for: Duration,
    language: Mutex<Language>,
}

impl SimulatedRecognizer {
    pub fn new(listen_for: Duration) -> Self {
        Self {
            listen_for,
            language: Mutex::new(Language::English),
        }
    }
}

#[async_trait::async_trait]
impl SpeechRecognizer for SimulatedRecognizer {
    async fn start(&self, language: Language) -> Result<(), CaptureError> {
        *self.language.lock().unwrap_or_else(|e| e.into_inner()) = language;
        Ok(())
    }

    async fn finalize(&self) -> Result<String, CaptureError> {
        tokio::time::sleep(self.listen_for).await;
        let language = *self.language.lock().unwrap_or_else(|e| e.into_inner());
        let queries = sample_queries(language);
        let pick = rand::thread_rng().gen_range(0..queries.len());
        Ok(queries[pick].to_string())
    }

    fn stop(&self) {}
}

/// Uses a transcript given up front, or reads one line from stdin.
#[derive(Debug, Default)]
pub struct TypedRecognizer {
    preset: Mutex<Option<String>>,
}

impl TypedRecognizer {
    pub fn new(preset: Option<String>) -> Self {
        Self {
            preset: Mutex::new(preset),
        }
    }
}

#[async_trait::async_trait]
impl SpeechRecognizer for TypedRecognizer {
    async fn start(&self, language: Language) -> Result<(), CaptureError> {
        log::debug!("listening ({})", language.locale_tag());
        Ok(())
    }

    async fn finalize(&self) -> Result<String, CaptureError> {
        let preset = self.preset.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(text) = preset {
            return Ok(text);
        }

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .map_err(|e| CaptureError::Recognition(e.to_string()))?;
        let line = line.trim();
        if line.is_empty() {
            return Err(CaptureError::Recognition("no speech detected".into()));
        }
        Ok(line.to_string())
    }

    fn stop(&self) {}
}

/// Prints what would be spoken.
#[derive(Debug, Default)]
pub struct StdoutSynthesizer;

impl SpeechSynthesizer for StdoutSynthesizer {
    fn speak(&self, text: &str, locale: &str) {
        println!("[speak:{locale}] {text}");
    }
}

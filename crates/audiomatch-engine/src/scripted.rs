use crate::recognizer_trait::SpeechRecognizer;
use async_trait::async_trait;
use audiomatch_core::{RecognizerError, WavAudio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Fixed behavior the scripted engine plays back on every call.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    Transcript(String),
    NoSpeech,
    Unreachable,
    Failed,
}

/// Deterministic engine for tests: returns a preconfigured outcome and
/// records how it was called.
pub struct ScriptedRecognizer {
    outcome: ScriptedOutcome,
    delay: Duration,
    call_count: AtomicUsize,
    last_language: Mutex<Option<String>>,
}

impl ScriptedRecognizer {
    pub fn new() -> Self {
        Self::with_outcome(ScriptedOutcome::Transcript(String::new()))
    }

    pub fn with_outcome(outcome: ScriptedOutcome) -> Self {
        Self {
            outcome,
            delay: Duration::ZERO,
            call_count: AtomicUsize::new(0),
            last_language: Mutex::new(None),
        }
    }

    pub fn with_transcript(text: &str) -> Self {
        Self::with_outcome(ScriptedOutcome::Transcript(text.to_string()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_language(&self) -> Option<String> {
        self.last_language.lock().ok().and_then(|l| l.clone())
    }
}

impl Default for ScriptedRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), RecognizerError> {
        if let Some(text) = config.get("transcript").and_then(|v| v.as_str()) {
            self.outcome = ScriptedOutcome::Transcript(text.to_string());
        }
        if let Some(mode) = config.get("mode").and_then(|v| v.as_str()) {
            self.outcome = match mode {
                "no_speech" => ScriptedOutcome::NoSpeech,
                "unreachable" => ScriptedOutcome::Unreachable,
                "failed" => ScriptedOutcome::Failed,
                other => {
                    return Err(RecognizerError::InitializationFailed(format!(
                        "unknown scripted mode: {other}"
                    )))
                }
            };
        }
        if let Some(ms) = config.get("delay_ms").and_then(|v| v.as_integer()) {
            self.delay = Duration::from_millis(ms.max(0) as u64);
        }
        Ok(())
    }

    async fn recognize(&self, audio: &WavAudio, language: &str) -> Result<String, RecognizerError> {
        let count = self.call_count.fetch_add(1, Ordering::Relaxed) + 1;
        if let Ok(mut last) = self.last_language.lock() {
            *last = Some(language.to_string());
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        tracing::trace!(
            "ScriptedRecognizer call #{count}, {} samples at {}Hz",
            audio.samples.len(),
            audio.sample_rate,
        );
        match &self.outcome {
            ScriptedOutcome::Transcript(text) => Ok(text.clone()),
            ScriptedOutcome::NoSpeech => Err(RecognizerError::NoSpeech),
            ScriptedOutcome::Unreachable => {
                Err(RecognizerError::Unreachable("scripted outage".to_string()))
            }
            ScriptedOutcome::Failed => {
                Err(RecognizerError::Failed("scripted failure".to_string()))
            }
        }
    }
}

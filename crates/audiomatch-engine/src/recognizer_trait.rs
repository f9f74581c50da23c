use async_trait::async_trait;
use audiomatch_core::{RecognizerError, WavAudio};

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    fn name(&self) -> &str;
    async fn initialize(&mut self, config: toml::Value) -> Result<(), RecognizerError>;
    async fn recognize(&self, audio: &WavAudio, language: &str) -> Result<String, RecognizerError>;
}

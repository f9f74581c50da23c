use crate::recognizer_trait::SpeechRecognizer;
use async_trait::async_trait;
use audiomatch_core::config::GoogleConfig;
use audiomatch_core::{RecognizerError, WavAudio};
use std::time::Duration;

const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Recognizer backed by the Google Web Speech v2 endpoint. Takes raw
/// little-endian 16-bit PCM as `audio/l16` and returns the first transcript
/// alternative from the line-delimited JSON response.
pub struct GoogleRecognizer {
    config: GoogleConfig,
    client: reqwest::Client,
}

impl GoogleRecognizer {
    pub fn new() -> Self {
        Self {
            config: GoogleConfig::default(),
            client: reqwest::Client::new(),
        }
    }
}

impl Default for GoogleRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechRecognizer for GoogleRecognizer {
    fn name(&self) -> &str {
        "google"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), RecognizerError> {
        self.config = config
            .try_into()
            .map_err(|e: toml::de::Error| RecognizerError::InitializationFailed(e.to_string()))?;
        self.client = reqwest::Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .build()
            .map_err(|e| RecognizerError::InitializationFailed(e.to_string()))?;
        Ok(())
    }

    async fn recognize(&self, audio: &WavAudio, language: &str) -> Result<String, RecognizerError> {
        let body: Vec<u8> = audio
            .samples
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();

        let response = self
            .client
            .post(&self.config.endpoint)
            .query(&[
                ("client", "chromium"),
                ("lang", language),
                ("key", self.config.api_key.as_str()),
            ])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("audio/l16; rate={}", audio.sample_rate),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| RecognizerError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecognizerError::Unreachable(format!(
                "speech endpoint returned HTTP {status}"
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| RecognizerError::Unreachable(e.to_string()))?;
        parse_response(&text)
    }
}

/// The v2 endpoint streams one JSON object per line; the first lines are
/// usually empty `{"result":[]}` placeholders. Well-formed lines with no
/// transcript mean nothing interpretable was heard; a non-empty body where
/// no line parses as JSON at all is the service misbehaving, not silence.
fn parse_response(body: &str) -> Result<String, RecognizerError> {
    let mut saw_json = false;
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(_) => continue,
        };
        saw_json = true;
        let Some(results) = value.get("result").and_then(|r| r.as_array()) else {
            continue;
        };
        let transcript = results
            .first()
            .and_then(|r| r.get("alternative"))
            .and_then(|a| a.as_array())
            .and_then(|a| a.first())
            .and_then(|alt| alt.get("transcript"))
            .and_then(|t| t.as_str());
        if let Some(transcript) = transcript {
            return Ok(transcript.to_string());
        }
    }
    if saw_json || body.trim().is_empty() {
        Err(RecognizerError::NoSpeech)
    } else {
        Err(RecognizerError::Unreachable(
            "speech endpoint returned an unparseable response".to_string(),
        ))
    }
}

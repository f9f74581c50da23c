use audiomatch_core::{MatchReport, RecognitionOutcome, RecognizerError, ServiceError};
use audiomatch_engine::SpeechRecognizer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Removes a temp file when dropped, so cleanup holds on every exit path.
struct TempArtifact {
    path: PathBuf,
}

impl TempArtifact {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("failed to remove temp file {}: {e}", self.path.display());
            }
        }
    }
}

/// Full request pipeline: persist the upload, normalize to WAV, run the
/// recognizer, compare against the expected text, clean up.
pub struct AudioMatchService {
    scratch_dir: PathBuf,
    recognizer: Arc<dyn SpeechRecognizer>,
    language: String,
    timeout: Duration,
}

impl AudioMatchService {
    /// Creates the scratch directory if absent. Per-request files inside it
    /// use randomized names, so concurrent requests never collide.
    pub fn new(
        scratch_dir: PathBuf,
        recognizer: Arc<dyn SpeechRecognizer>,
        language: String,
        timeout: Duration,
    ) -> std::io::Result<Self> {
        std::fs::create_dir_all(&scratch_dir)?;
        Ok(Self {
            scratch_dir,
            recognizer,
            language,
            timeout,
        })
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub async fn handle(
        &self,
        filename: &str,
        bytes: &[u8],
        expected_text: &str,
    ) -> Result<MatchReport, ServiceError> {
        // Strip any path components a client may have smuggled in.
        let base_name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("");
        if base_name.is_empty() {
            return Err(ServiceError::InvalidRequest("No file uploaded".to_string()));
        }

        let upload_path = self.scratch_dir.join(format!("{}_{base_name}", random_tag()));
        // Guard created before the write so a partial write is still removed.
        let _upload_guard = TempArtifact::new(upload_path.clone());
        tokio::fs::write(&upload_path, bytes)
            .await
            .map_err(|e| ServiceError::Processing(e.to_string()))?;
        tracing::debug!("saved upload to {}", upload_path.display());

        let outcome = self.recognize_file(&upload_path).await;
        Ok(MatchReport::new(
            outcome.into_text(),
            expected_text.to_string(),
        ))
    }

    /// Recognition step. Never returns an error; failures become outcome
    /// variants. The transcoded sibling, when one was produced, is removed
    /// before returning on every path.
    async fn recognize_file(&self, path: &Path) -> RecognitionOutcome {
        let (wav_path, _derived_guard) = if audiomatch_audio::is_wav(path) {
            (path.to_path_buf(), None)
        } else {
            let input = path.to_path_buf();
            let transcoded =
                tokio::task::spawn_blocking(move || audiomatch_audio::transcode_to_wav(&input))
                    .await;
            match transcoded {
                Ok(Ok(sibling)) => {
                    // The guard exists only once a derived file exists, so a
                    // failed transcode never touches the original upload.
                    let guard = TempArtifact::new(sibling.clone());
                    (sibling, Some(guard))
                }
                Ok(Err(e)) => {
                    tracing::warn!("transcode failed for {}: {e}", path.display());
                    return RecognitionOutcome::Failed;
                }
                Err(e) => {
                    tracing::error!("transcode task failed: {e}");
                    return RecognitionOutcome::Failed;
                }
            }
        };

        let read_path = wav_path.clone();
        let audio = match tokio::task::spawn_blocking(move || audiomatch_audio::read_wav(&read_path))
            .await
        {
            Ok(Ok(audio)) => audio,
            Ok(Err(e)) => {
                tracing::warn!("failed to read {}: {e}", wav_path.display());
                return RecognitionOutcome::Failed;
            }
            Err(e) => {
                tracing::error!("WAV read task failed: {e}");
                return RecognitionOutcome::Failed;
            }
        };

        match tokio::time::timeout(
            self.timeout,
            self.recognizer.recognize(&audio, &self.language),
        )
        .await
        {
            Ok(Ok(text)) => RecognitionOutcome::Text(text),
            Ok(Err(RecognizerError::NoSpeech)) => RecognitionOutcome::NoSpeech,
            Ok(Err(RecognizerError::Unreachable(e))) => {
                tracing::warn!("speech service unreachable: {e}");
                RecognitionOutcome::ServiceUnreachable
            }
            Ok(Err(e)) => {
                tracing::warn!("recognition failed: {e}");
                RecognitionOutcome::Failed
            }
            Err(_) => {
                tracing::warn!("recognition timed out after {:?}", self.timeout);
                RecognitionOutcome::ServiceUnreachable
            }
        }
    }
}

/// 8 random bytes as hex, prefixed to the original filename.
fn random_tag() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    hex[..16].to_string()
}

use serde::Serialize;

/// Transcript returned when the recognizer found no interpretable speech.
pub const NO_SPEECH_TEXT: &str = "تعذر التعرف على الصوت";

/// Transcript returned when the speech service could not be reached.
pub const SERVICE_UNREACHABLE_TEXT: &str = "حدث خطأ في الاتصال بخدمة التعرف على الكلام";

/// Transcript returned when decoding or reading the audio file failed.
pub const PROCESSING_FAILED_TEXT: &str = "حدث خطأ أثناء معالجة الملف الصوتي";

/// Decoded audio payload handed to a recognizer: mono 16-bit PCM.
#[derive(Debug, Clone)]
pub struct WavAudio {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl WavAudio {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Outcome of the recognition step. Failures are carried as variants rather
/// than errors; they become sentinel text only at the response boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    Text(String),
    NoSpeech,
    ServiceUnreachable,
    Failed,
}

impl RecognitionOutcome {
    /// Render the outcome as response text, substituting the fixed
    /// localized sentinel for each failure variant.
    pub fn into_text(self) -> String {
        match self {
            RecognitionOutcome::Text(text) => text,
            RecognitionOutcome::NoSpeech => NO_SPEECH_TEXT.to_string(),
            RecognitionOutcome::ServiceUnreachable => SERVICE_UNREACHABLE_TEXT.to_string(),
            RecognitionOutcome::Failed => PROCESSING_FAILED_TEXT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MatchReport {
    pub recognized_text: String,
    pub expected_text: String,
    #[serde(rename = "match")]
    pub matched: bool,
}

impl MatchReport {
    /// Compare after trimming leading/trailing whitespace on both sides.
    /// No case, punctuation, or diacritic normalization.
    pub fn new(recognized_text: String, expected_text: String) -> Self {
        let matched = recognized_text.trim() == expected_text.trim();
        Self {
            recognized_text,
            expected_text,
            matched,
        }
    }
}

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{ConfigError, RecognizerError, ServiceError, TranscodeError};
pub use types::{MatchReport, RecognitionOutcome, WavAudio};

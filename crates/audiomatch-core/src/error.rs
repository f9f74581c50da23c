use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),
}

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("failed to open audio file: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported or corrupt audio container: {0}")]
    Probe(String),

    #[error("no decodable audio track in file")]
    NoAudioTrack,

    #[error("audio decode failed: {0}")]
    Decode(String),

    #[error("failed to read WAV file: {0}")]
    WavRead(String),

    #[error("failed to write WAV file: {0}")]
    WavWrite(String),
}

#[derive(Debug, Error)]
pub enum RecognizerError {
    #[error("no interpretable speech in audio")]
    NoSpeech,

    #[error("speech service unreachable: {0}")]
    Unreachable(String),

    #[error("recognition failed: {0}")]
    Failed(String),

    #[error("recognizer initialization failed: {0}")]
    InitializationFailed(String),

    #[error("recognizer engine not found: {0}")]
    EngineNotFound(String),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Processing(String),
}

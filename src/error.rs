use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Encoder binary not found: {0}")]
    EncoderMissing(String),

    #[error("Encoder timed out after {0} seconds")]
    EncodeTimeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, PackError>;

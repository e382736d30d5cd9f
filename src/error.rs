//! Error types for Notewise.

use thiserror::Error;

/// Library-level error type for Notewise operations.
#[derive(Error, Debug)]
pub enum NotewiseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Download failure: {0}")]
    Download(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Upload failure: {0}")]
    Upload(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Notewise operations.
pub type Result<T> = std::result::Result<T, NotewiseError>;

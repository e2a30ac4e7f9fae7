use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovtreeError {
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Can't read source '{path}': {source}")]
    SourceUnreadable {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("Invalid profile data: {0}")]
    Profile(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CovtreeError>;

//! Error types for UnaTherm.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required column '{column}' in {path}")]
    MissingColumn { column: String, path: String },

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Remote service error: {0}")]
    Remote(String),
}

pub type Result<T> = std::result::Result<T, Error>;

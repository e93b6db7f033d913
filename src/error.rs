// Error types for the cachegate library.
// Covers transport failures, HTTP status failures, and payload parsing errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CachegateError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {status_text}")]
    HttpStatus { status: u16, status_text: String },

    #[error("request URL must not be empty")]
    EmptyUrl,

    #[error("invalid header value: {0}")]
    InvalidHeader(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CachegateError {
    /// HTTP status code carried by this error, if it is a status failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            CachegateError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CachegateError>;

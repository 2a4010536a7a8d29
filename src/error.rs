//! Error type shared by the client library.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("{0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("backend worker is not running")]
    BackendUnavailable,
}

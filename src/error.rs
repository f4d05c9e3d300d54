//! Error types for ryc

use serde::Serialize;
use thiserror::Error;

/// Main error type for ryc operations
#[derive(Debug, Error)]
pub enum RycError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Backend(String),

    #[error("{0}")]
    Precondition(String),

    #[error("{0}")]
    Retrieval(String),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Disconnected(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse error classification reported alongside user notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Backend,
    Precondition,
    Retrieval,
    Transport,
    Internal,
}

impl RycError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RycError::Validation(_) => ErrorKind::Validation,
            RycError::Backend(_) => ErrorKind::Backend,
            RycError::Precondition(_) => ErrorKind::Precondition,
            RycError::Retrieval(_) => ErrorKind::Retrieval,
            RycError::Transport(_) | RycError::Disconnected(_) => ErrorKind::Transport,
            RycError::IoError(_)
            | RycError::JsonError(_)
            | RycError::UrlError(_)
            | RycError::Config(_) => ErrorKind::Internal,
        }
    }

    /// Rebuild an error from a notification kind and its message
    pub fn from_kind(kind: ErrorKind, message: String) -> Self {
        match kind {
            ErrorKind::Validation => RycError::Validation(message),
            ErrorKind::Backend => RycError::Backend(message),
            ErrorKind::Precondition => RycError::Precondition(message),
            ErrorKind::Retrieval => RycError::Retrieval(message),
            ErrorKind::Transport => RycError::Disconnected(message),
            ErrorKind::Internal => RycError::Config(message),
        }
    }
}

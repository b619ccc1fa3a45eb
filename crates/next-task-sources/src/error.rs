//! Fetch error types

use next_task_core::SourceError;
use thiserror::Error;

/// Result type for adapter internals
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Failure inside a source adapter, before it is attributed to a source
#[derive(Debug, Error)]
pub enum FetchError {
    /// Credentials missing, unreadable or rejected by the token endpoint
    #[error("{0}")]
    Auth(String),

    /// Remote answered with a non-success status
    #[error("{status} - {message}")]
    Api { status: u16, message: String },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed endpoint URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Attribute this failure to a named source
    pub fn for_source(self, source_name: &str) -> SourceError {
        let source_name = source_name.to_string();
        match self {
            Self::Auth(reason) => SourceError::AuthenticationFailed {
                source_name,
                reason,
            },
            Self::Api { status, message } => SourceError::Api {
                source_name,
                status,
                message,
            },
            Self::Http(e) if e.is_decode() => SourceError::Decode {
                source_name,
                reason: e.to_string(),
            },
            Self::Http(e) => SourceError::Request {
                source_name,
                reason: e.to_string(),
            },
            Self::Url(e) => SourceError::Request {
                source_name,
                reason: e.to_string(),
            },
            Self::Json(e) => SourceError::Decode {
                source_name,
                reason: e.to_string(),
            },
            Self::Io(e) => SourceError::Io {
                source_name,
                reason: e.to_string(),
            },
        }
    }
}

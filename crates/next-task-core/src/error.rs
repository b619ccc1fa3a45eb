//! Error types for next-task

use std::path::PathBuf;
use thiserror::Error;

use crate::task::CacheKey;

/// Result type alias using NextTaskError
pub type Result<T> = std::result::Result<T, NextTaskError>;

/// Main error type for next-task operations
#[derive(Debug, Error)]
pub enum NextTaskError {
    /// Cache store errors
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Source fetcher errors
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Refill ran and the cache is still empty
    #[error("No tasks available from any configured source")]
    NoTasksAvailable,

    /// The task was delivered but its cache entry could not be removed
    #[error("Delivered task {key} could not be cleared from the cache: {source}")]
    Evict {
        key: CacheKey,
        #[source]
        source: CacheError,
    },

    /// IO errors outside the cache store (e.g. writing the delivered task)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Cache store errors
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem read/write/permission failure
    #[error("Cache IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Entry content could not be decoded into a task record
    #[error("Corrupt cache entry {key}: {source}")]
    Decode {
        key: CacheKey,
        #[source]
        source: serde_json::Error,
    },

    /// Task record could not be serialized
    #[error("Cache serialization error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Task record rejected before it reached the store
    #[error("Invalid task record: {0}")]
    InvalidRecord(String),

    /// Selection attempted on an empty cache
    #[error("Task cache is empty")]
    Empty,
}

impl CacheError {
    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the underlying IO error is "not found"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// No base directory could be resolved
    #[error("Could not determine home directory (set NEXT_TASK_HOME)")]
    NoHomeDirectory,

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Source fetcher errors
#[derive(Debug, Error)]
pub enum SourceError {
    /// Credentials missing, unreadable or rejected
    #[error("Authentication failed for {source_name}: {reason}")]
    AuthenticationFailed { source_name: String, reason: String },

    /// Transport-level failure (connect, timeout, TLS)
    #[error("Request to {source_name} failed: {reason}")]
    Request { source_name: String, reason: String },

    /// Remote answered with a non-success status
    #[error("{source_name} API error: {status} - {message}")]
    Api {
        source_name: String,
        status: u16,
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("Unexpected response from {source_name}: {reason}")]
    Decode { source_name: String, reason: String },

    /// Local IO (token files, prompts)
    #[error("IO error in {source_name}: {reason}")]
    Io { source_name: String, reason: String },
}

impl SourceError {
    /// Name of the source that failed
    pub fn source_name(&self) -> &str {
        match self {
            Self::AuthenticationFailed { source_name, .. }
            | Self::Request { source_name, .. }
            | Self::Api { source_name, .. }
            | Self::Decode { source_name, .. }
            | Self::Io { source_name, .. } => source_name,
        }
    }
}

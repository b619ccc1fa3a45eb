//! Configuration types

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults::{DEFAULT_CAPACITY, DEFAULT_HTTP_TIMEOUT_SECS};

/// Main configuration for next-task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Task cache configuration
    pub cache: CacheConfig,

    /// HTTP client configuration
    pub http: HttpConfig,

    /// Source fetcher configuration
    pub sources: SourcesConfig,
}

/// Task cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory (empty = `<base>/.cache/next-task/tasks`)
    pub dir: PathBuf,

    /// Maximum number of tasks admitted per refill
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::new(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl HttpConfig {
    /// Timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

/// Source fetcher configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Google Mail / Google Tasks
    pub google: Option<GoogleConfig>,

    /// Jira issue search
    pub jira: Option<JiraConfig>,
}

/// Google sources configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// OAuth2 client credentials JSON (empty = default location)
    pub credentials_path: PathBuf,

    /// Stored OAuth2 token JSON (empty = default location)
    pub token_path: PathBuf,

    /// Fetch inbox messages
    pub mail: bool,

    /// Fetch open tasks
    pub tasks: bool,

    /// Gmail search query applied to the message listing
    pub mail_query: Option<String>,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            credentials_path: PathBuf::new(),
            token_path: PathBuf::new(),
            mail: true,
            tasks: true,
            mail_query: None,
        }
    }
}

/// Jira configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    /// Base URL of the Jira instance
    pub instance_url: String,

    /// Personal access token (sent as a bearer token)
    pub access_token: String,

    /// JQL selecting the issues to fetch
    pub jql: String,
}

//! Default configuration values and well-known paths

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Tasks admitted per refill when not configured
pub const DEFAULT_CAPACITY: usize = 10;

/// HTTP timeout when not configured
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Environment variable overriding the base directory
pub const HOME_ENV: &str = "NEXT_TASK_HOME";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec!["next-task.toml", "next-task.yaml", "config.toml", "config.yaml"]
}

/// Well-known locations under the base directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Base directory (the user's home unless overridden)
    pub base: PathBuf,
}

impl Paths {
    /// Paths rooted at an explicit base directory
    pub fn from_base(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Resolve the base from `NEXT_TASK_HOME`, falling back to the home directory
    pub fn resolve() -> Result<Self, ConfigError> {
        if let Some(base) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::from_base(base));
        }
        dirs::home_dir()
            .map(Self::from_base)
            .ok_or(ConfigError::NoHomeDirectory)
    }

    /// `<base>/.config/next-task`
    pub fn config_dir(&self) -> PathBuf {
        self.base.join(".config").join("next-task")
    }

    /// `<base>/.cache/next-task/tasks`
    pub fn cache_dir(&self) -> PathBuf {
        self.base.join(".cache").join("next-task").join("tasks")
    }

    /// `<base>/.cache/next-task/logs`
    pub fn log_dir(&self) -> PathBuf {
        self.base.join(".cache").join("next-task").join("logs")
    }

    /// `<base>/.config/next-task/google/credentials.json`
    pub fn google_credentials(&self) -> PathBuf {
        self.google_dir().join("credentials.json")
    }

    /// `<base>/.config/next-task/google/token.json`
    pub fn google_token(&self) -> PathBuf {
        self.google_dir().join("token.json")
    }

    fn google_dir(&self) -> PathBuf {
        self.config_dir().join("google")
    }

    /// Base directory
    pub fn base(&self) -> &Path {
        &self.base
    }
}

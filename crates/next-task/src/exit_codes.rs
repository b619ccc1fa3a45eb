//! Exit codes for the CLI

use next_task_core::{CacheError, ConfigError, NextTaskError, SourceError};

/// Success
pub const SUCCESS: u8 = 0;

/// General error
pub const ERROR: u8 = 1;

/// Configuration error
pub const CONFIG_ERROR: u8 = 2;

/// Cache store error
pub const CACHE_ERROR: u8 = 3;

/// Source fetch error
pub const SOURCE_ERROR: u8 = 4;

/// Refill produced nothing to deliver
pub const NO_TASKS: u8 = 5;

/// Task delivered but not cleared from the cache
pub const EVICT_ERROR: u8 = 6;

/// Map a command failure to its exit code
pub fn for_error(err: &anyhow::Error) -> u8 {
    if let Some(err) = err.downcast_ref::<NextTaskError>() {
        return match err {
            NextTaskError::Cache(_) => CACHE_ERROR,
            NextTaskError::Config(_) => CONFIG_ERROR,
            NextTaskError::Source(_) => SOURCE_ERROR,
            NextTaskError::NoTasksAvailable => NO_TASKS,
            NextTaskError::Evict { .. } => EVICT_ERROR,
            NextTaskError::Io(_) => ERROR,
        };
    }

    if err.downcast_ref::<ConfigError>().is_some() {
        CONFIG_ERROR
    } else if err.downcast_ref::<CacheError>().is_some() {
        CACHE_ERROR
    } else if err.downcast_ref::<SourceError>().is_some() {
        SOURCE_ERROR
    } else {
        ERROR
    }
}

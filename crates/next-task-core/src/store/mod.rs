//! Task cache store
//!
//! A store holds one entry per pending task, addressed by the task's
//! [`CacheKey`]. An entry's presence means the task is still waiting to be
//! delivered; deleting it is the only terminal transition.

mod fs;
mod memory;

pub use fs::{CacheStats, FsTaskStore};
pub use memory::InMemoryTaskStore;

use crate::error::CacheError;
use crate::task::{CacheKey, TaskRecord};

/// Key-value persistence of task records
///
/// Implementations must agree on these contracts:
/// - `put` is create-or-truncate and returns the entry's key
/// - `list_keys` on an empty store is an empty vec, never an error
/// - `get` on corrupt content is [`CacheError::Decode`] and leaves the entry in place
/// - `delete` of an absent key is an IO "not found" error
pub trait TaskStore {
    /// Write a task, replacing any entry with the same key
    fn put(&mut self, task: &TaskRecord) -> Result<CacheKey, CacheError>;

    /// Whether an entry exists for this key
    fn contains(&self, key: &CacheKey) -> bool;

    /// All current entry keys, in no meaningful order
    fn list_keys(&self) -> Result<Vec<CacheKey>, CacheError>;

    /// Read and decode one entry
    fn get(&self, key: &CacheKey) -> Result<TaskRecord, CacheError>;

    /// Remove one entry
    fn delete(&mut self, key: &CacheKey) -> Result<(), CacheError>;

    /// Whether an entry exists for this task
    fn exists(&self, task: &TaskRecord) -> bool {
        self.contains(&task.cache_key())
    }

    /// Number of current entries; zero means a refill is due
    fn count(&self) -> Result<usize, CacheError> {
        Ok(self.list_keys()?.len())
    }
}

/// Reject records that cannot be addressed
pub(crate) fn validate_record(task: &TaskRecord) -> Result<(), CacheError> {
    if task.kind.is_empty() {
        return Err(CacheError::InvalidRecord(format!(
            "task '{}' has an empty kind",
            task.title
        )));
    }
    if task.id.is_empty() {
        return Err(CacheError::InvalidRecord(format!(
            "{} task '{}' has an empty id",
            task.kind, task.title
        )));
    }
    Ok(())
}

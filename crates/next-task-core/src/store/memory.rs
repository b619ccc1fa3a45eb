//! In-memory task store

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{validate_record, TaskStore};
use crate::error::CacheError;
use crate::task::{CacheKey, TaskRecord};

/// Task store backed by a map of encoded entries
///
/// Entries are kept encoded so decode failures behave exactly like a
/// corrupt file on disk.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTaskStore {
    entries: BTreeMap<CacheKey, Vec<u8>>,
}

impl InMemoryTaskStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with tasks
    pub fn with_tasks<'a>(tasks: impl IntoIterator<Item = &'a TaskRecord>) -> Result<Self, CacheError> {
        let mut store = Self::new();
        for task in tasks {
            store.put(task)?;
        }
        Ok(store)
    }

    /// Insert raw entry bytes under a key, bypassing encoding
    pub fn insert_raw(&mut self, key: CacheKey, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(key, bytes.into());
    }
}

impl TaskStore for InMemoryTaskStore {
    fn put(&mut self, task: &TaskRecord) -> Result<CacheKey, CacheError> {
        validate_record(task)?;
        let key = task.cache_key();
        self.entries.insert(key.clone(), task.encode()?);
        Ok(key)
    }

    fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    fn list_keys(&self) -> Result<Vec<CacheKey>, CacheError> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn get(&self, key: &CacheKey) -> Result<TaskRecord, CacheError> {
        let bytes = self.entries.get(key).ok_or_else(|| not_found(key))?;
        TaskRecord::decode(bytes).map_err(|source| CacheError::Decode {
            key: key.clone(),
            source,
        })
    }

    fn delete(&mut self, key: &CacheKey) -> Result<(), CacheError> {
        self.entries
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| not_found(key))
    }

    fn count(&self) -> Result<usize, CacheError> {
        Ok(self.entries.len())
    }
}

fn not_found(key: &CacheKey) -> CacheError {
    CacheError::io(
        PathBuf::from(key.as_str()),
        std::io::Error::new(std::io::ErrorKind::NotFound, "no such cache entry"),
    )
}

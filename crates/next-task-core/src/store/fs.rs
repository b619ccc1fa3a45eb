//! Filesystem task store: one file per entry, named by cache key

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{validate_record, TaskStore};
use crate::error::CacheError;
use crate::task::{CacheKey, TaskRecord};

/// Content-addressable task cache on the local filesystem
///
/// The directory is created lazily on the first write, owner-only. There is
/// no locking: two processes sharing a directory can race on
/// put/delete/list and nothing here prevents it.
#[derive(Debug, Clone)]
pub struct FsTaskStore {
    /// Cache directory
    cache_dir: PathBuf,
}

impl FsTaskStore {
    /// Create a store rooted at `cache_dir` (not created until first write)
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Get the cache directory
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the entry file for a key
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(key.as_str())
    }

    /// Delete the entire cache directory; absent directory is a no-op
    pub fn reset(&self) -> Result<(), CacheError> {
        match fs::remove_dir_all(&self.cache_dir) {
            Ok(()) => {
                info!(dir = %self.cache_dir.display(), "cache directory removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %self.cache_dir.display(), "cache directory already absent");
                Ok(())
            }
            Err(e) => Err(CacheError::io(&self.cache_dir, e)),
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> Result<CacheStats, CacheError> {
        let mut stats = CacheStats::default();

        if !self.cache_dir.exists() {
            return Ok(stats);
        }

        for key in self.list_keys()? {
            let path = self.entry_path(&key);
            let meta = fs::metadata(&path).map_err(|e| CacheError::io(&path, e))?;
            stats.entries += 1;
            stats.total_size += meta.len();
        }

        Ok(stats)
    }

    fn ensure_dir(&self) -> Result<(), CacheError> {
        if self.cache_dir.is_dir() {
            return Ok(());
        }
        debug!(dir = %self.cache_dir.display(), "creating cache directory");
        create_private_dir(&self.cache_dir).map_err(|e| CacheError::io(&self.cache_dir, e))
    }
}

impl TaskStore for FsTaskStore {
    fn put(&mut self, task: &TaskRecord) -> Result<CacheKey, CacheError> {
        validate_record(task)?;
        self.ensure_dir()?;

        let key = task.cache_key();
        let path = self.entry_path(&key);
        let bytes = task.encode()?;

        let mut file = open_private_file(&path).map_err(|e| CacheError::io(&path, e))?;
        file.write_all(&bytes)
            .map_err(|e| CacheError::io(&path, e))?;

        debug!(key = %key, kind = %task.kind, "stored task in cache");
        Ok(key)
    }

    fn contains(&self, key: &CacheKey) -> bool {
        self.entry_path(key).is_file()
    }

    fn list_keys(&self) -> Result<Vec<CacheKey>, CacheError> {
        let entries = match fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CacheError::io(&self.cache_dir, e)),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CacheError::io(&self.cache_dir, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| CacheError::io(entry.path(), e))?;
            if !file_type.is_file() {
                continue;
            }
            keys.push(CacheKey(entry.file_name().to_string_lossy().into_owned()));
        }

        keys.sort();
        Ok(keys)
    }

    fn get(&self, key: &CacheKey) -> Result<TaskRecord, CacheError> {
        let path = self.entry_path(key);
        let bytes = fs::read(&path).map_err(|e| CacheError::io(&path, e))?;
        TaskRecord::decode(&bytes).map_err(|source| CacheError::Decode {
            key: key.clone(),
            source,
        })
    }

    fn delete(&mut self, key: &CacheKey) -> Result<(), CacheError> {
        let path = self.entry_path(key);
        fs::remove_file(&path).map_err(|e| CacheError::io(&path, e))?;
        debug!(key = %key, "removed task from cache");
        Ok(())
    }
}

#[cfg(unix)]
fn create_private_dir(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(path)
}

#[cfg(not(unix))]
fn create_private_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)
}

fn open_private_file(path: &Path) -> std::io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

/// Cache statistics
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Number of cache entries
    pub entries: usize,
    /// Total size in bytes
    pub total_size: u64,
}

impl CacheStats {
    /// Format total size in human-readable form
    pub fn formatted_size(&self) -> String {
        if self.total_size < 1024 {
            format!("{} B", self.total_size)
        } else if self.total_size < 1024 * 1024 {
            format!("{:.1} KB", self.total_size as f64 / 1024.0)
        } else {
            format!("{:.1} MB", self.total_size as f64 / (1024.0 * 1024.0))
        }
    }
}

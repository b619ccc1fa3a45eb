//! next-task core - task cache and selection engine
//!
//! This crate owns everything between the source fetchers and the CLI:
//! the task record and its content-addressed cache key, the cache store,
//! the per-refill capacity budget and title deduplication, the uniform
//! random selection over cached entries, and the orchestrator that ties
//! them into one refill/select/evict cycle.

pub mod admission;
pub mod budget;
pub mod config;
pub mod dedup;
pub mod error;
pub mod orchestrator;
pub mod selection;
pub mod store;
pub mod task;

pub use admission::{admit, Admission};
pub use budget::CapacityBudget;
pub use dedup::DedupFilter;
pub use error::{CacheError, ConfigError, NextTaskError, Result, SourceError};
pub use orchestrator::{Orchestrator, RefillReport, SourceReport, TaskSource};
pub use selection::{select_random, Selection};
pub use store::{CacheStats, FsTaskStore, InMemoryTaskStore, TaskStore};
pub use task::{CacheKey, TaskRecord};

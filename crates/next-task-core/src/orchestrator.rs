//! Refill / select / evict cycle

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::budget::CapacityBudget;
use crate::dedup::DedupFilter;
use crate::error::{CacheError, NextTaskError, Result};
use crate::selection::{select_random, system_rng, Selection};
use crate::store::TaskStore;
use crate::task::TaskRecord;

/// A producer of candidate tasks (mail inbox, task list, issue tracker, ...)
///
/// Implementations should pass `budget.remaining()` to the remote as a
/// result-size hint, offer every candidate through [`crate::admit`], and
/// stop as soon as it reports the budget is spent.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Human-readable source name, used in logs and errors
    fn name(&self) -> &str;

    /// Fetch the tasks admitted in this cycle
    async fn fetch(
        &self,
        budget: &mut CapacityBudget,
        dedup: &mut DedupFilter,
    ) -> Result<Vec<TaskRecord>>;
}

/// What one source contributed to a refill
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    /// Source name
    pub name: String,
    /// Whether the source was invoked at all
    pub invoked: bool,
    /// Tasks written to the store
    pub stored: usize,
}

/// Summary of one refill cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefillReport {
    /// Per-source results, in priority order
    pub sources: Vec<SourceReport>,
    /// Total tasks written
    pub stored: usize,
    /// Whether the budget ran out
    pub exhausted: bool,
}

/// Runs the per-invocation cycle over a store and a priority-ordered list of sources
pub struct Orchestrator<S> {
    store: S,
    sources: Vec<Box<dyn TaskSource>>,
    capacity: usize,
}

impl<S: TaskStore> Orchestrator<S> {
    /// Create an orchestrator with no sources
    pub fn new(store: S, capacity: usize) -> Self {
        Self {
            store,
            sources: Vec::new(),
            capacity,
        }
    }

    /// Append a source; sources are queried in insertion order
    pub fn with_source(mut self, source: Box<dyn TaskSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Append several sources, keeping their order
    pub fn with_sources(mut self, sources: impl IntoIterator<Item = Box<dyn TaskSource>>) -> Self {
        self.sources.extend(sources);
        self
    }

    /// Get the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Names of the configured sources, in priority order
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Query every source once with a fresh budget and filter, writing admitted tasks
    ///
    /// The first source error aborts the refill. Tasks already written by
    /// earlier sources stay in the store.
    pub async fn refill(&mut self) -> Result<RefillReport> {
        let mut budget = CapacityBudget::new(self.capacity);
        let mut dedup = DedupFilter::new();
        let mut report = RefillReport::default();

        for source in &self.sources {
            let name = source.name().to_string();

            if budget.is_exhausted() || report.stored >= self.capacity {
                debug!(source = %name, "capacity exhausted, skipping source");
                report.sources.push(SourceReport {
                    name,
                    invoked: false,
                    stored: 0,
                });
                continue;
            }

            debug!(source = %name, remaining = budget.remaining(), "fetching tasks");
            let tasks = source.fetch(&mut budget, &mut dedup).await?;

            let mut stored = 0;
            for task in &tasks {
                if report.stored >= self.capacity {
                    warn!(source = %name, returned = tasks.len(), "source returned more tasks than the budget allows");
                    break;
                }
                self.store.put(task)?;
                stored += 1;
                report.stored += 1;
            }

            info!(source = %name, stored, remaining = budget.remaining(), "source refilled cache");
            report.sources.push(SourceReport {
                name,
                invoked: true,
                stored,
            });
        }

        report.exhausted = budget.is_exhausted() || report.stored >= self.capacity;
        info!(stored = report.stored, exhausted = report.exhausted, "refill complete");
        Ok(report)
    }

    /// Check, refill if empty, then select one task without removing it
    pub async fn prepare(&mut self) -> Result<Selection> {
        self.prepare_with(&mut system_rng()).await
    }

    /// [`Self::prepare`] with an explicit random source
    pub async fn prepare_with<R: Rng>(&mut self, rng: &mut R) -> Result<Selection> {
        let count = self.store.count()?;
        if count == 0 {
            info!("task cache is empty, refilling from sources");
            self.refill().await?;
        } else {
            debug!(count, "serving from existing cache");
        }

        match select_random(&self.store, rng) {
            Ok(selection) => Ok(selection),
            Err(CacheError::Empty) => Err(NextTaskError::NoTasksAvailable),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a delivered task from the store
    pub fn evict(&mut self, selection: &Selection) -> Result<()> {
        self.store
            .delete(&selection.key)
            .map_err(|source| NextTaskError::Evict {
                key: selection.key.clone(),
                source,
            })?;
        debug!(key = %selection.key, "evicted delivered task");
        Ok(())
    }

    /// Run the whole cycle: select a task, hand it to `deliver`, then evict it
    ///
    /// If `deliver` fails the entry is left in place for the next run.
    pub async fn next_task<F>(&mut self, deliver: F) -> Result<TaskRecord>
    where
        F: FnOnce(&TaskRecord) -> std::io::Result<()>,
    {
        let selection = self.prepare().await?;
        deliver(&selection.task)?;
        self.evict(&selection)?;
        Ok(selection.task)
    }
}

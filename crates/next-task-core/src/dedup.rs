//! Batch-scoped title deduplication

/// Remembers the titles accepted so far in one refill cycle
///
/// Only titles are compared, across every source in the cycle. The filter
/// never looks at the cache store and is discarded when the cycle ends.
#[derive(Debug, Clone, Default)]
pub struct DedupFilter {
    titles: Vec<String>,
}

impl DedupFilter {
    /// Create an empty filter for a new cycle
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a task with exactly this title was already accepted
    pub fn already_seen(&self, title: &str) -> bool {
        self.titles.iter().any(|seen| seen == title)
    }

    /// Record an accepted title
    pub fn record(&mut self, title: impl Into<String>) {
        self.titles.push(title.into());
    }

    /// Number of titles accepted so far
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    /// Whether nothing has been accepted yet
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

//! Admission of candidate tasks during a refill

use tracing::debug;

use crate::budget::CapacityBudget;
use crate::dedup::DedupFilter;
use crate::task::TaskRecord;

/// Outcome of offering one candidate to the refill cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Counted against the budget and recorded in the filter
    Accepted,
    /// Same title already accepted in this cycle; nothing consumed
    Duplicate,
    /// Budget is spent; the caller should stop fetching
    CapacityExhausted,
}

impl Admission {
    /// Whether the candidate should be kept
    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }
}

/// Offer a candidate: budget is checked first, then the title filter
pub fn admit(budget: &mut CapacityBudget, dedup: &mut DedupFilter, task: &TaskRecord) -> Admission {
    if budget.is_exhausted() {
        return Admission::CapacityExhausted;
    }

    if dedup.already_seen(&task.title) {
        debug!(kind = %task.kind, id = %task.id, title = %task.title, "skipping duplicate title");
        return Admission::Duplicate;
    }

    budget.decrement();
    dedup.record(task.title.clone());
    Admission::Accepted
}

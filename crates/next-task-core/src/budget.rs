//! Per-refill capacity budget

/// Bounds how many new tasks one refill cycle may admit into the cache
///
/// A single budget is created per refill and threaded by `&mut` through
/// every source in priority order, so earlier sources claim slots first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityBudget {
    limit: usize,
    remaining: usize,
}

impl CapacityBudget {
    /// Create a fresh budget allowing `limit` admissions
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            remaining: limit,
        }
    }

    /// Admissions still allowed in this cycle
    ///
    /// Sources pass this to the remote as a page-size hint.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// The limit this budget was created with
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Admissions consumed so far
    pub fn admitted(&self) -> usize {
        self.limit - self.remaining
    }

    /// Whether no more tasks may be admitted
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Consume one slot; saturates at zero
    pub fn decrement(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_budget() {
        let budget = CapacityBudget::new(3);
        assert_eq!(budget.remaining(), 3);
        assert_eq!(budget.limit(), 3);
        assert_eq!(budget.admitted(), 0);
        assert!(!budget.is_exhausted());
    }

    #[test]
    fn test_decrement_never_goes_below_zero() {
        let mut budget = CapacityBudget::new(2);
        budget.decrement();
        budget.decrement();
        assert!(budget.is_exhausted());

        budget.decrement();
        assert_eq!(budget.remaining(), 0);
        assert_eq!(budget.admitted(), 2);
    }

    #[test]
    fn test_zero_budget_starts_exhausted() {
        assert!(CapacityBudget::new(0).is_exhausted());
    }
}

//! The per-allocation rollback ledger.
//!
//! Every successful (or partially successful) subtraction during one
//! allocation call is recorded here, so that abandoning the attempt can
//! return exactly what this context took — and nothing taken by concurrent
//! contexts in the same process. The ledger is created by the caller for
//! one allocation and dropped with it; it is never adapter-instance state.

use matchfund_types::{Currency, FundingId};

/// One recorded subtraction: how many minor units this allocation context
/// took from which funding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// The funding the amount was taken from.
    pub funding_id: FundingId,
    /// Currency of the funding, kept so releases can report decimal totals.
    pub currency: Currency,
    /// Minor units subtracted from the real-time balance.
    pub minor_units: i64,
}

/// Rollback ledger scoped to a single allocation call.
#[derive(Debug, Default)]
pub struct AllocationLedger {
    entries: Vec<LedgerEntry>,
}

impl AllocationLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a subtraction.
    pub fn record(&mut self, funding_id: FundingId, currency: Currency, minor_units: i64) {
        self.entries.push(LedgerEntry {
            funding_id,
            currency,
            minor_units,
        });
    }

    /// Remove and return the most recent entry.
    pub fn pop(&mut self) -> Option<LedgerEntry> {
        self.entries.pop()
    }

    /// All recorded entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Sum of recorded minor units.
    #[must_use]
    pub fn total_minor_units(&self) -> i64 {
        self.entries.iter().map(|e| e.minor_units).sum()
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use matchfund_types::Currency;

    use super::*;

    #[test]
    fn records_accumulate() {
        let mut ledger = AllocationLedger::new();
        assert!(ledger.is_empty());

        ledger.record(FundingId(1), Currency::gbp(), 600);
        ledger.record(FundingId(2), Currency::gbp(), 400);

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.total_minor_units(), 1_000);
        assert_eq!(ledger.entries()[0].funding_id, FundingId(1));
    }

    #[test]
    fn pop_is_lifo() {
        let mut ledger = AllocationLedger::new();
        ledger.record(FundingId(1), Currency::gbp(), 600);
        ledger.record(FundingId(2), Currency::gbp(), 400);

        let last = ledger.pop().unwrap();
        assert_eq!(last.funding_id, FundingId(2));
        assert_eq!(ledger.total_minor_units(), 600);

        ledger.pop().unwrap();
        assert!(ledger.pop().is_none());
    }

    #[test]
    fn same_funding_may_appear_twice() {
        let mut ledger = AllocationLedger::new();
        ledger.record(FundingId(1), Currency::gbp(), 600);
        ledger.record(FundingId(1), Currency::gbp(), 150);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.total_minor_units(), 750);
    }
}

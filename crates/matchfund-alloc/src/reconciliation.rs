//! Out-of-band reconciliation for funding balances.
//!
//! The adapter's compensation loop heals ordinary races on its own. What it
//! deliberately does *not* do is touch a balance whose retry budget ran out
//! — that negative remainder is left in the store as an operator-visible
//! anomaly. The [`Reconciler`] is the operator's tool for it: `audit`
//! compares the real-time view against the durable truth, `repair` writes
//! the truth back. Neither is ever called by the allocation path.
//!
//! The durable truth for a funding is its snapshot minus everything
//! withdrawn against it since the snapshot was taken; the caller supplies
//! that withdrawn total from the durable store.

use rust_decimal::Decimal;

use matchfund_store::CounterStore;
use matchfund_store::keys::funding_balance_key;
use matchfund_types::{CampaignFunding, FundingId, Result};

/// Classification of a funding's real-time balance against durable truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundingAuditStatus {
    /// Real-time view equals the durable truth.
    Consistent,
    /// Real-time view differs from the durable truth but is non-negative.
    Drifted,
    /// Real-time balance is negative — an exhausted compensation budget
    /// left it there.
    NegativeBalance,
}

/// The result of auditing one funding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingAudit {
    /// The audited funding.
    pub funding_id: FundingId,
    /// Classification of the real-time view.
    pub status: FundingAuditStatus,
    /// What the store (or snapshot fallback) currently reports.
    pub real_time_balance: Decimal,
    /// Snapshot minus withdrawn total, floored at zero.
    pub expected_balance: Decimal,
    /// Whether the real-time key exists at all.
    pub key_present: bool,
}

/// Operator-invoked audit and repair of real-time balances.
pub struct Reconciler<S: CounterStore> {
    store: S,
}

impl<S: CounterStore> Reconciler<S> {
    /// Create a reconciler over the counter store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The durable truth: snapshot minus withdrawn, floored at zero.
    fn expected_balance(funding: &CampaignFunding, withdrawn_total: Decimal) -> Decimal {
        (funding.amount_available - withdrawn_total).max(Decimal::ZERO)
    }

    /// Compare a funding's real-time balance against its durable truth.
    ///
    /// `withdrawn_total` is the sum of withdrawal amounts recorded against
    /// this funding since its snapshot was taken, as reported by the
    /// durable store.
    pub fn audit(
        &self,
        funding: &CampaignFunding,
        withdrawn_total: Decimal,
    ) -> Result<FundingAudit> {
        let key = funding_balance_key(funding.id);
        let stored = self.store.get(&key)?;
        let real_time_balance = match stored {
            Some(minor_units) => funding.currency.from_minor_units(minor_units),
            None => funding.amount_available,
        };
        let expected_balance = Self::expected_balance(funding, withdrawn_total);

        let status = if real_time_balance < Decimal::ZERO {
            FundingAuditStatus::NegativeBalance
        } else if real_time_balance == expected_balance {
            FundingAuditStatus::Consistent
        } else {
            FundingAuditStatus::Drifted
        };

        Ok(FundingAudit {
            funding_id: funding.id,
            status,
            real_time_balance,
            expected_balance,
            key_present: stored.is_some(),
        })
    }

    /// Overwrite the funding's real-time balance with the durable truth
    /// and return it. Explicitly operator-invoked — concurrent allocations
    /// against the funding while this runs can be lost, so callers quiesce
    /// or accept the window.
    pub fn repair(
        &self,
        funding: &CampaignFunding,
        withdrawn_total: Decimal,
    ) -> Result<Decimal> {
        let key = funding_balance_key(funding.id);
        let truth = Self::expected_balance(funding, withdrawn_total);
        let before = self.store.get(&key)?;
        self.store
            .set(&key, funding.currency.to_minor_units(truth)?)?;
        tracing::warn!(
            funding = %funding.id,
            before = ?before,
            repaired = %truth,
            "Real-time balance overwritten with durable truth"
        );
        Ok(truth)
    }
}

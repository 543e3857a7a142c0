//! The durable collaborator seam.
//!
//! The engine does not own persistence: which fundings exist, their
//! priority order, and the withdrawal rows all live with a durable store
//! behind [`FundingRepository`]. The trait models exactly what the
//! allocator needs — ordered fundings in, staged withdrawal writes out,
//! one flush as the unit-of-work boundary.
//!
//! [`InMemoryFundingRepository`] is the reference implementation used by
//! tests and single-process demos. Its flush can be made to fail on
//! demand, which is how the persistence-failure rollback path is exercised.

use std::collections::HashMap;

use matchfund_types::{
    CampaignFunding, CampaignId, DonationId, MatchfundError, Result, Withdrawal, WithdrawalId,
};

/// Durable store operations the allocator depends on.
///
/// `persist_withdrawals` and `delete_withdrawals` stage work;
/// nothing becomes durable until `flush` succeeds. A failed flush aborts
/// the whole staged unit of work.
pub trait FundingRepository {
    /// The campaign's fundings in consumption priority order. The
    /// allocator consumes sequentially and is otherwise order-agnostic.
    fn available_fundings(&self, campaign_id: CampaignId) -> Result<Vec<CampaignFunding>>;

    /// Stage withdrawal rows for persistence. A row whose id already
    /// exists is an update (upsert semantics).
    fn persist_withdrawals(&mut self, withdrawals: &[Withdrawal]) -> Result<()>;

    /// Stage deletion of all of a donation's withdrawal rows. Returns how
    /// many rows are currently stored for that donation.
    fn delete_withdrawals(&mut self, donation_id: DonationId) -> Result<usize>;

    /// Commit everything staged since the last flush, atomically.
    fn flush(&mut self) -> Result<()>;
}

enum Staged {
    Upsert(Withdrawal),
    DeleteForDonation(DonationId),
}

/// In-memory reference implementation of [`FundingRepository`].
#[derive(Default)]
pub struct InMemoryFundingRepository {
    fundings: Vec<CampaignFunding>,
    withdrawals: HashMap<WithdrawalId, Withdrawal>,
    staged: Vec<Staged>,
    fail_next_flush: bool,
}

impl InMemoryFundingRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a funding.
    pub fn add_funding(&mut self, funding: CampaignFunding) {
        self.fundings.push(funding);
    }

    /// All committed withdrawal rows for a donation.
    #[must_use]
    pub fn withdrawals_for_donation(&self, donation_id: DonationId) -> Vec<&Withdrawal> {
        let mut rows: Vec<&Withdrawal> = self
            .withdrawals
            .values()
            .filter(|w| w.donation_id == donation_id)
            .collect();
        rows.sort_by_key(|w| w.id);
        rows
    }

    /// Number of committed withdrawal rows.
    #[must_use]
    pub fn withdrawal_count(&self) -> usize {
        self.withdrawals.len()
    }

    /// Make the next `flush` fail, aborting its staged unit of work.
    pub fn fail_next_flush(&mut self) {
        self.fail_next_flush = true;
    }
}

impl FundingRepository for InMemoryFundingRepository {
    fn available_fundings(&self, campaign_id: CampaignId) -> Result<Vec<CampaignFunding>> {
        let mut fundings: Vec<CampaignFunding> = self
            .fundings
            .iter()
            .filter(|f| f.campaign_id == campaign_id)
            .cloned()
            .collect();
        fundings.sort_by_key(|f| (f.allocation_order, f.id));
        Ok(fundings)
    }

    fn persist_withdrawals(&mut self, withdrawals: &[Withdrawal]) -> Result<()> {
        for withdrawal in withdrawals {
            self.staged.push(Staged::Upsert(withdrawal.clone()));
        }
        Ok(())
    }

    fn delete_withdrawals(&mut self, donation_id: DonationId) -> Result<usize> {
        let count = self
            .withdrawals
            .values()
            .filter(|w| w.donation_id == donation_id)
            .count();
        self.staged.push(Staged::DeleteForDonation(donation_id));
        Ok(count)
    }

    fn flush(&mut self) -> Result<()> {
        if self.fail_next_flush {
            self.fail_next_flush = false;
            self.staged.clear();
            return Err(MatchfundError::PersistenceFailed {
                reason: "simulated flush failure".into(),
            });
        }
        for staged in self.staged.drain(..) {
            match staged {
                Staged::Upsert(withdrawal) => {
                    self.withdrawals.insert(withdrawal.id, withdrawal);
                }
                Staged::DeleteForDonation(donation_id) => {
                    self.withdrawals.retain(|_, w| w.donation_id != donation_id);
                }
            }
        }
        Ok(())
    }
}

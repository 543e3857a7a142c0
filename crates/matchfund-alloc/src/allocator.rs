//! The allocator — one donation against a campaign's ordered fundings.
//!
//! Orchestrates the [`MatchingAdapter`] across the priority-ordered funding
//! list supplied by the durable collaborator, accumulates withdrawal
//! records, and persists them in one unit of work. Every real-time
//! mutation made before a failure is reversed through the per-call
//! [`AllocationLedger`]; the durable side never sees a partially failed
//! attempt.

use rust_decimal::Decimal;

use matchfund_store::CounterStore;
use matchfund_types::{
    Donation, FundingId, MatchStatus, MatchfundError, Result, Withdrawal, WithdrawalId,
};

use crate::adapter::MatchingAdapter;
use crate::ledger::AllocationLedger;
use crate::repository::FundingRepository;

/// One granted amount from one funding, staged until persistence succeeds.
struct Grant {
    funding_id: FundingId,
    amount: Decimal,
}

/// Allocates and releases match funds for donations.
pub struct Allocator<S: CounterStore, R: FundingRepository> {
    adapter: MatchingAdapter<S>,
    repository: R,
}

impl<S: CounterStore, R: FundingRepository> Allocator<S, R> {
    /// Create an allocator over an adapter and a durable collaborator.
    pub fn new(adapter: MatchingAdapter<S>, repository: R) -> Self {
        Self {
            adapter,
            repository,
        }
    }

    /// The underlying adapter.
    pub fn adapter(&self) -> &MatchingAdapter<S> {
        &self.adapter
    }

    /// The durable collaborator.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Mutable access to the durable collaborator.
    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repository
    }

    /// Reserve match funds for a donation, consuming the campaign's
    /// fundings in priority order until the donation is fully matched or
    /// the fundings run dry. Returns the donation's total matched amount
    /// (pre-existing withdrawals included — allocation is resumable).
    ///
    /// # Errors
    /// - [`MatchfundError::CurrencyMismatch`] before any store mutation if
    ///   a candidate funding's currency differs from the donation's;
    /// - [`MatchfundError::TerminalLock`] when a funding's balance could
    ///   not self-heal, after this context's reservations were returned;
    /// - [`MatchfundError::PersistenceFailed`] (or any store error) after
    ///   the real-time side has been rolled back.
    pub fn allocate_match_funds(&mut self, donation: &mut Donation) -> Result<Decimal> {
        let fundings = self.repository.available_fundings(donation.campaign_id)?;

        // Pre-flight: every candidate funding must match the donation's
        // currency. Reject before touching the store.
        for funding in &fundings {
            if funding.currency != donation.currency {
                return Err(MatchfundError::CurrencyMismatch {
                    donation_currency: donation.currency.code().to_string(),
                    funding_currency: funding.currency.code().to_string(),
                    funding_id: funding.id,
                });
            }
        }

        // A released donation re-enters the machine at UNMATCHED.
        if donation.match_status == MatchStatus::Released {
            donation.set_match_status(MatchStatus::Unmatched)?;
        }

        let mut remaining = donation.amount_unmatched();
        let mut ledger = AllocationLedger::new();
        let mut grants: Vec<Grant> = Vec::new();

        for funding in &fundings {
            if remaining <= Decimal::ZERO {
                break;
            }

            let available = self.adapter.get_amount_available(funding)?;
            if available <= Decimal::ZERO {
                continue;
            }

            let request = remaining.min(available);
            match self.adapter.subtract_amount(&mut ledger, funding, request) {
                Ok(granted) => {
                    remaining -= granted;
                    grants.push(Grant {
                        funding_id: funding.id,
                        amount: granted,
                    });
                }
                Err(MatchfundError::LessThanRequested { allocated, .. }) => {
                    // A rival got there first. The adapter has already
                    // reconciled the store and ledger-recorded the partial
                    // amount; take it and move on — never retry a funding.
                    if allocated > Decimal::ZERO {
                        remaining -= allocated;
                        grants.push(Grant {
                            funding_id: funding.id,
                            amount: allocated,
                        });
                    }
                }
                Err(err) => {
                    self.rollback_real_time(&mut ledger);
                    return Err(err);
                }
            }
        }

        if let Err(err) = self.apply_and_persist(donation, &grants) {
            self.rollback_real_time(&mut ledger);
            return Err(err);
        }

        let matched = donation.amount_matched();
        donation.set_match_status(MatchStatus::derive(matched, donation.amount))?;
        tracing::debug!(
            donation = %donation.id,
            matched = %matched,
            new_grants = grants.len(),
            status = %donation.match_status,
            "Allocation complete"
        );
        Ok(matched)
    }

    /// Return all of a donation's reserved match funds to their fundings,
    /// delete its withdrawal rows, and flush. Returns the total released.
    pub fn release_match_funds(&mut self, donation: &mut Donation) -> Result<Decimal> {
        let released = self.adapter.release_all_funds_for_donation(donation)?;
        self.repository.delete_withdrawals(donation.id)?;
        self.repository.flush()?;
        donation.take_withdrawals();
        donation.set_match_status(MatchStatus::Released)?;
        tracing::debug!(
            donation = %donation.id,
            released = %released,
            "Match funds released"
        );
        Ok(released)
    }

    /// Turn staged grants into withdrawal rows on the donation and persist
    /// them in one unit of work. On failure the donation is restored to
    /// its pre-call shape.
    fn apply_and_persist(&mut self, donation: &mut Donation, grants: &[Grant]) -> Result<()> {
        if grants.is_empty() {
            return Ok(());
        }

        let mut sequence = u32::try_from(donation.withdrawals.len())
            .map_err(|_| MatchfundError::Internal("withdrawal count overflows u32".into()))?;
        let mut to_persist: Vec<Withdrawal> = Vec::with_capacity(grants.len());

        for grant in grants {
            if let Some(existing) = donation.withdrawal_for_funding_mut(grant.funding_id) {
                existing.extend(grant.amount)?;
                to_persist.push(existing.clone());
            } else {
                let withdrawal = Withdrawal::with_id(
                    WithdrawalId::deterministic(donation.id, grant.funding_id, sequence),
                    donation.id,
                    grant.funding_id,
                    grant.amount,
                )?;
                sequence += 1;
                donation.push_withdrawal(withdrawal.clone());
                to_persist.push(withdrawal);
            }
        }

        let persisted = self
            .repository
            .persist_withdrawals(&to_persist)
            .and_then(|()| self.repository.flush());
        if let Err(err) = persisted {
            Self::unapply_grants(donation, grants);
            return Err(err);
        }
        Ok(())
    }

    /// Undo in-memory withdrawal mutations after a failed persistence.
    fn unapply_grants(donation: &mut Donation, grants: &[Grant]) {
        for grant in grants {
            if let Some(existing) = donation.withdrawal_for_funding_mut(grant.funding_id) {
                existing.amount -= grant.amount;
            }
        }
        donation.withdrawals.retain(|w| w.amount > Decimal::ZERO);
    }

    /// Best-effort reversal of this context's real-time reservations. The
    /// original failure is what the caller needs to see; a rollback
    /// failure on top of it is logged, and whatever could not be reversed
    /// stays visible to reconciliation.
    fn rollback_real_time(&self, ledger: &mut AllocationLedger) {
        if let Err(err) = self.adapter.release_newly_allocated_funds(ledger) {
            tracing::error!(
                error = %err,
                unreversed_entries = ledger.len(),
                "Rollback failed after allocation error"
            );
        }
    }
}

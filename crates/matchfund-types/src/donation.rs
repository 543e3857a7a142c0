//! The donation model and its match-status state machine.
//!
//! ## State Machine
//!
//! ```text
//!   ┌───────────┐    ┌──────────────────┐    ┌──────────────┐
//!   │ UNMATCHED ├───▶│ PARTIALLY_MATCHED├───▶│ FULLY_MATCHED│
//!   └─────┬─────┘    └────────┬─────────┘    └──────┬───────┘
//!         │                   │                     │
//!         └───────────────────┴──────────┬──────────┘
//!                                        ▼
//!                                  ┌──────────┐
//!                                  │ RELEASED │──▶ re-matches from UNMATCHED
//!                                  └──────────┘
//! ```
//!
//! `Unmatched` may also jump straight to `FullyMatched` when a single
//! allocation pass covers the whole amount. Releasing returns every matched
//! penny to its funding and deletes the withdrawal rows, so a released
//! donation re-enters the machine at `Unmatched`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    CampaignId, Currency, DonationId, FundingId, MatchfundError, Result, Withdrawal,
};

/// How much of a donation's requested amount is currently match-funded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    /// No match funds reserved yet.
    Unmatched,
    /// Some, but not all, of the requested amount is reserved.
    PartiallyMatched,
    /// The full requested amount is reserved.
    FullyMatched,
    /// Previously reserved funds have been returned to their fundings.
    Released,
}

impl MatchStatus {
    /// Can this status transition to the given target?
    ///
    /// Same-status "transitions" are not covered here; setters treat them
    /// as no-ops.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Unmatched, Self::PartiallyMatched | Self::FullyMatched)
                | (Self::PartiallyMatched, Self::FullyMatched)
                | (_, Self::Released)
                | (Self::Released, Self::Unmatched)
        )
    }

    /// The status a donation lands in after an allocation pass, given how
    /// much is matched against how much was requested.
    #[must_use]
    pub fn derive(matched: Decimal, requested: Decimal) -> Self {
        if matched <= Decimal::ZERO {
            Self::Unmatched
        } else if matched < requested {
            Self::PartiallyMatched
        } else {
            Self::FullyMatched
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unmatched => write!(f, "UNMATCHED"),
            Self::PartiallyMatched => write!(f, "PARTIALLY_MATCHED"),
            Self::FullyMatched => write!(f, "FULLY_MATCHED"),
            Self::Released => write!(f, "RELEASED"),
        }
    }
}

/// A donation requesting match funds from its campaign's fundings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    /// Globally unique identifier.
    pub id: DonationId,
    /// The campaign donated to.
    pub campaign_id: CampaignId,
    /// The donated amount — the ceiling on how much match funding this
    /// donation can attract.
    pub amount: Decimal,
    /// Currency of the donation. Every funding consumed must agree.
    pub currency: Currency,
    /// Current position in the match-status state machine.
    pub match_status: MatchStatus,
    /// Withdrawal records accumulated by allocation.
    pub withdrawals: Vec<Withdrawal>,
    /// When the donation was created.
    pub created_at: DateTime<Utc>,
}

impl Donation {
    /// Create a new, unmatched donation.
    #[must_use]
    pub fn new(campaign_id: CampaignId, amount: Decimal, currency: Currency) -> Self {
        Self {
            id: DonationId::new(),
            campaign_id,
            amount,
            currency,
            match_status: MatchStatus::Unmatched,
            withdrawals: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Total already matched: the sum of this donation's withdrawal amounts.
    #[must_use]
    pub fn amount_matched(&self) -> Decimal {
        self.withdrawals.iter().map(|w| w.amount).sum()
    }

    /// How much of the requested amount is still unmatched.
    #[must_use]
    pub fn amount_unmatched(&self) -> Decimal {
        (self.amount - self.amount_matched()).max(Decimal::ZERO)
    }

    /// The withdrawal already drawn from the given funding, if any.
    pub fn withdrawal_for_funding_mut(
        &mut self,
        funding_id: FundingId,
    ) -> Option<&mut Withdrawal> {
        self.withdrawals
            .iter_mut()
            .find(|w| w.funding_id == funding_id)
    }

    /// Append a withdrawal record.
    pub fn push_withdrawal(&mut self, withdrawal: Withdrawal) {
        self.withdrawals.push(withdrawal);
    }

    /// Remove and return all withdrawal records (release path).
    pub fn take_withdrawals(&mut self) -> Vec<Withdrawal> {
        std::mem::take(&mut self.withdrawals)
    }

    /// Move to a new match status, enforcing the state machine.
    /// Setting the current status again is a no-op.
    ///
    /// # Errors
    /// Returns [`MatchfundError::InvalidStatusTransition`] for a forbidden
    /// transition.
    pub fn set_match_status(&mut self, status: MatchStatus) -> Result<()> {
        if self.match_status == status {
            return Ok(());
        }
        if !self.match_status.can_transition_to(status) {
            return Err(MatchfundError::InvalidStatusTransition {
                from: self.match_status,
                to: status,
            });
        }
        self.match_status = status;
        Ok(())
    }
}

/// Dummy donation for testing.
#[cfg(any(test, feature = "test-helpers"))]
impl Donation {
    /// Create a dummy GBP donation for unit tests.
    #[must_use]
    pub fn dummy(amount: Decimal) -> Self {
        Self::new(CampaignId(uuid::Uuid::nil()), amount, Currency::gbp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_valid() {
        assert!(MatchStatus::Unmatched.can_transition_to(MatchStatus::PartiallyMatched));
        assert!(MatchStatus::Unmatched.can_transition_to(MatchStatus::FullyMatched));
        assert!(MatchStatus::PartiallyMatched.can_transition_to(MatchStatus::FullyMatched));
    }

    #[test]
    fn any_status_can_release() {
        assert!(MatchStatus::Unmatched.can_transition_to(MatchStatus::Released));
        assert!(MatchStatus::PartiallyMatched.can_transition_to(MatchStatus::Released));
        assert!(MatchStatus::FullyMatched.can_transition_to(MatchStatus::Released));
    }

    #[test]
    fn released_rematches_from_unmatched() {
        assert!(MatchStatus::Released.can_transition_to(MatchStatus::Unmatched));
        assert!(!MatchStatus::Released.can_transition_to(MatchStatus::PartiallyMatched));
        assert!(!MatchStatus::Released.can_transition_to(MatchStatus::FullyMatched));
    }

    #[test]
    fn backward_transitions_invalid() {
        assert!(!MatchStatus::FullyMatched.can_transition_to(MatchStatus::PartiallyMatched));
        assert!(!MatchStatus::FullyMatched.can_transition_to(MatchStatus::Unmatched));
        assert!(!MatchStatus::PartiallyMatched.can_transition_to(MatchStatus::Unmatched));
    }

    #[test]
    fn derive_statuses() {
        let requested = Decimal::new(1_000, 2);
        assert_eq!(
            MatchStatus::derive(Decimal::ZERO, requested),
            MatchStatus::Unmatched
        );
        assert_eq!(
            MatchStatus::derive(Decimal::new(400, 2), requested),
            MatchStatus::PartiallyMatched
        );
        assert_eq!(
            MatchStatus::derive(requested, requested),
            MatchStatus::FullyMatched
        );
    }

    #[test]
    fn amount_matched_sums_withdrawals() {
        let mut donation = Donation::dummy(Decimal::new(1_000, 2));
        assert_eq!(donation.amount_matched(), Decimal::ZERO);
        assert_eq!(donation.amount_unmatched(), Decimal::new(1_000, 2));

        donation.push_withdrawal(
            Withdrawal::new(donation.id, FundingId(1), Decimal::new(600, 2)).unwrap(),
        );
        donation.push_withdrawal(
            Withdrawal::new(donation.id, FundingId(2), Decimal::new(400, 2)).unwrap(),
        );

        assert_eq!(donation.amount_matched(), Decimal::new(1_000, 2));
        assert_eq!(donation.amount_unmatched(), Decimal::ZERO);
    }

    #[test]
    fn set_status_enforces_machine() {
        let mut donation = Donation::dummy(Decimal::new(1_000, 2));
        donation
            .set_match_status(MatchStatus::PartiallyMatched)
            .unwrap();
        donation.set_match_status(MatchStatus::FullyMatched).unwrap();

        let err = donation
            .set_match_status(MatchStatus::PartiallyMatched)
            .unwrap_err();
        assert!(matches!(err, MatchfundError::InvalidStatusTransition { .. }));
        assert_eq!(donation.match_status, MatchStatus::FullyMatched);
    }

    #[test]
    fn same_status_is_noop() {
        let mut donation = Donation::dummy(Decimal::new(1_000, 2));
        assert!(donation.set_match_status(MatchStatus::Unmatched).is_ok());
    }

    #[test]
    fn release_cycle() {
        let mut donation = Donation::dummy(Decimal::new(1_000, 2));
        donation.set_match_status(MatchStatus::FullyMatched).unwrap();
        donation.set_match_status(MatchStatus::Released).unwrap();
        donation.set_match_status(MatchStatus::Unmatched).unwrap();
        assert_eq!(donation.match_status, MatchStatus::Unmatched);
    }

    #[test]
    fn take_withdrawals_empties() {
        let mut donation = Donation::dummy(Decimal::new(500, 2));
        donation.push_withdrawal(
            Withdrawal::new(donation.id, FundingId(1), Decimal::new(500, 2)).unwrap(),
        );
        let taken = donation.take_withdrawals();
        assert_eq!(taken.len(), 1);
        assert!(donation.withdrawals.is_empty());
        assert_eq!(donation.amount_matched(), Decimal::ZERO);
    }

    #[test]
    fn serde_roundtrip() {
        let donation = Donation::dummy(Decimal::new(2_500, 2));
        let json = serde_json::to_string(&donation).unwrap();
        let back: Donation = serde_json::from_str(&json).unwrap();
        assert_eq!(donation, back);
    }
}

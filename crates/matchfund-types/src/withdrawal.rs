//! The withdrawal record — how much of one funding one donation consumed.
//!
//! Withdrawals are the durable trace of allocation: the sum of a funding's
//! withdrawal amounts must never exceed its true available balance (outside
//! the bounded race window the adapter self-heals), and the sum of a
//! donation's withdrawal amounts is its matched total.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{DonationId, FundingId, MatchfundError, Result, WithdrawalId};

/// An amount of one funding consumed by one specific donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    /// Globally unique identifier.
    pub id: WithdrawalId,
    /// The donation this withdrawal matches.
    pub donation_id: DonationId,
    /// The funding the amount was drawn from.
    pub funding_id: FundingId,
    /// Amount consumed. Always strictly positive.
    pub amount: Decimal,
    /// When the withdrawal was first created.
    pub created_at: DateTime<Utc>,
}

impl Withdrawal {
    /// Create a withdrawal record.
    ///
    /// # Errors
    /// Returns [`MatchfundError::InvalidWithdrawalAmount`] if `amount` is
    /// not strictly positive.
    pub fn new(donation_id: DonationId, funding_id: FundingId, amount: Decimal) -> Result<Self> {
        Self::with_id(WithdrawalId::new(), donation_id, funding_id, amount)
    }

    /// Create a withdrawal with a caller-chosen id — used with
    /// [`WithdrawalId::deterministic`] so re-running an allocation persists
    /// the same row instead of a duplicate.
    ///
    /// # Errors
    /// Returns [`MatchfundError::InvalidWithdrawalAmount`] if `amount` is
    /// not strictly positive.
    pub fn with_id(
        id: WithdrawalId,
        donation_id: DonationId,
        funding_id: FundingId,
        amount: Decimal,
    ) -> Result<Self> {
        if amount <= Decimal::ZERO {
            return Err(MatchfundError::InvalidWithdrawalAmount { amount });
        }
        Ok(Self {
            id,
            donation_id,
            funding_id,
            amount,
            created_at: Utc::now(),
        })
    }

    /// Extend this withdrawal by an additional granted amount. Used when a
    /// resumed allocation draws again from a funding the donation has
    /// already consumed, keeping the (funding, donation) pair unique.
    ///
    /// # Errors
    /// Returns [`MatchfundError::InvalidWithdrawalAmount`] if `additional`
    /// is not strictly positive.
    pub fn extend(&mut self, additional: Decimal) -> Result<()> {
        if additional <= Decimal::ZERO {
            return Err(MatchfundError::InvalidWithdrawalAmount { amount: additional });
        }
        self.amount += additional;
        Ok(())
    }
}

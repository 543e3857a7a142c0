//! Error types for the Matchfund allocation engine.
//!
//! All errors use the `MF_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Donation / model errors
//! - 2xx: Balance / allocation errors
//! - 3xx: Counter store errors
//! - 4xx: Persistence errors
//! - 9xx: General / internal errors
//!
//! Two variants deserve a note because they are *protocol outcomes*, not
//! failures in the usual sense:
//!
//! - [`LessThanRequested`](MatchfundError::LessThanRequested) is the expected
//!   result of losing a race for the last of a funding's balance. The adapter
//!   has already reconciled the store and recorded the partial amount in the
//!   allocation ledger; the caller proceeds with the reduced amount.
//! - [`TerminalLock`](MatchfundError::TerminalLock) means the compensation
//!   retry budget was exhausted with the balance still negative. It is fatal
//!   for the current attempt and operator-visible.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{FundingId, MatchStatus};

/// Central error enum for all Matchfund operations.
#[derive(Debug, Error)]
pub enum MatchfundError {
    // =================================================================
    // Donation / Model Errors (1xx)
    // =================================================================
    /// A candidate funding's currency differs from the donation's.
    /// Raised pre-flight, before any store mutation.
    #[error("MF_ERR_100: Currency mismatch: donation is {donation_currency}, {funding_id} is {funding_currency}")]
    CurrencyMismatch {
        donation_currency: String,
        funding_currency: String,
        funding_id: FundingId,
    },

    /// The match-status state machine forbids this transition.
    #[error("MF_ERR_103: Invalid match status transition: {from} -> {to}")]
    InvalidStatusTransition { from: MatchStatus, to: MatchStatus },

    /// A withdrawal must consume a strictly positive amount.
    #[error("MF_ERR_104: Withdrawal amount must be positive, got {amount}")]
    InvalidWithdrawalAmount { amount: Decimal },

    // =================================================================
    // Balance / Allocation Errors (2xx)
    // =================================================================
    /// A concurrent donation consumed part of the requested amount first.
    /// Carries how much was actually allocated (already ledger-recorded).
    #[error("MF_ERR_200: Allocated less than requested: requested {requested}, allocated {allocated}")]
    LessThanRequested { requested: Decimal, allocated: Decimal },

    /// The compensation retry budget was exhausted with the real-time
    /// balance still negative. The negative remainder is left in the store
    /// for out-of-band reconciliation.
    #[error("MF_ERR_201: Terminal lock on {key}: {balance_minor_units} minor units after {attempts} compensation attempts")]
    TerminalLock {
        key: String,
        balance_minor_units: i64,
        attempts: usize,
    },

    /// A decimal amount does not fit the i64 minor-unit representation.
    #[error("MF_ERR_202: Amount overflow converting {amount} {currency} to minor units")]
    AmountOverflow { amount: Decimal, currency: String },

    /// A decimal amount has a sub-minor-unit remainder.
    #[error("MF_ERR_203: Precision loss converting {amount} {currency} to minor units")]
    PrecisionLoss { amount: Decimal, currency: String },

    // =================================================================
    // Counter Store Errors (3xx)
    // =================================================================
    /// The counter store could not be reached or rejected the operation.
    #[error("MF_ERR_300: Counter store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    // =================================================================
    // Persistence Errors (4xx)
    // =================================================================
    /// The durable collaborator failed to persist or flush. Raised only
    /// after the real-time side has been rolled back.
    #[error("MF_ERR_400: Persistence failed: {reason}")]
    PersistenceFailed { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("MF_ERR_900: Internal error: {0}")]
    Internal(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, MatchfundError>;

//! Deterministic counter-key derivation.
//!
//! Keys are derived from the funding's durable identity alone, so every
//! process addressing the same funding computes the same key. The prefix
//! carries a format version: a future key-format change bumps the version
//! rather than aliasing keys written by an older release.

use matchfund_types::FundingId;
use matchfund_types::constants::BALANCE_KEY_PREFIX;

/// The real-time balance key for a funding.
#[must_use]
pub fn funding_balance_key(funding_id: FundingId) -> String {
    format!("{BALANCE_KEY_PREFIX}:funding:{}:available", funding_id.0)
}

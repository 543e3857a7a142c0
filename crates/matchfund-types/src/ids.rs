//! Identifiers used throughout Matchfund.
//!
//! Request-scoped entities (donations, withdrawals) use UUIDv7 for
//! time-ordered lexicographic sorting. Durable entities owned by the
//! database collaborator ([`FundId`], [`FundingId`]) use the numeric
//! identity assigned at persistence time — the funding id doubles as the
//! source of the real-time counter key.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// FundId
// ---------------------------------------------------------------------------

/// Durable identity of a [`Fund`](crate::Fund), assigned at persistence time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct FundId(pub i64);

impl fmt::Display for FundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fund:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// FundingId
// ---------------------------------------------------------------------------

/// Durable identity of a [`CampaignFunding`](crate::CampaignFunding).
///
/// Assigned by the database collaborator at persistence time; the real-time
/// counter key is derived deterministically from this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct FundingId(pub i64);

impl fmt::Display for FundingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "funding:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// CampaignId
// ---------------------------------------------------------------------------

/// Unique identifier for a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CampaignId(pub Uuid);

impl CampaignId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for CampaignId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// DonationId
// ---------------------------------------------------------------------------

/// Globally unique donation identifier. Uses UUIDv7 for time-ordered sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct DonationId(pub Uuid);

impl DonationId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for DonationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DonationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// WithdrawalId
// ---------------------------------------------------------------------------

/// Globally unique withdrawal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct WithdrawalId(pub Uuid);

impl WithdrawalId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Deterministic `WithdrawalId` from the (donation, funding) pair and a
    /// per-donation sequence number.
    ///
    /// Re-running an allocation that persists the same withdrawal produces
    /// the **exact same** id, so the durable collaborator can upsert rather
    /// than duplicate.
    #[must_use]
    pub fn deterministic(donation_id: DonationId, funding_id: FundingId, sequence: u32) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(b"matchfund:withdrawal_id:v1:");
        hasher.update(donation_id.0.as_bytes());
        hasher.update(funding_id.0.to_le_bytes());
        hasher.update(sequence.to_le_bytes());
        let hash = hasher.finalize();
        let bytes: [u8; 16] = hash[..16].try_into().expect("SHA-256 produces 32 bytes");
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for WithdrawalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WithdrawalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wd:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! The campaign-funding model.
//!
//! A `CampaignFunding` binds a [`Fund`](crate::Fund) to one campaign with a
//! durable snapshot of how much of the fund that campaign may still consume.
//! The real-time balance in the counter store is keyed by this row's numeric
//! identity and, when the key is absent, falls back to the snapshot here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CampaignId, Currency, FundId, FundingId};

/// A fund's allocation to one campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignFunding {
    /// Durable identity, assigned at persistence time. Source of the
    /// real-time counter key.
    pub id: FundingId,
    /// The campaign this funding belongs to.
    pub campaign_id: CampaignId,
    /// The fund the money comes from.
    pub fund_id: FundId,
    /// Currency, copied from the fund at creation.
    pub currency: Currency,
    /// Durable snapshot of the amount still available. The counter store
    /// holds the low-latency view; this is the fallback and the
    /// reconciliation baseline.
    pub amount_available: Decimal,
    /// Consumption priority supplied by the durable collaborator
    /// (smaller first; by convention pledges before champion funds).
    pub allocation_order: u32,
}

/// Dummy funding for testing.
#[cfg(any(test, feature = "test-helpers"))]
impl CampaignFunding {
    /// Create a dummy GBP funding for unit tests.
    #[must_use]
    pub fn dummy(id: i64, amount_available: Decimal) -> Self {
        Self {
            id: FundingId(id),
            campaign_id: CampaignId(uuid::Uuid::nil()),
            fund_id: FundId(id),
            currency: Currency::gbp(),
            amount_available,
            allocation_order: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip() {
        let funding = CampaignFunding::dummy(12, Decimal::new(50_000, 2));
        let json = serde_json::to_string(&funding).unwrap();
        let back: CampaignFunding = serde_json::from_str(&json).unwrap();
        assert_eq!(funding, back);
        assert_eq!(back.amount_available, Decimal::new(50_000, 2));
    }
}

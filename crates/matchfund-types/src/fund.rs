//! The fund model — a pool of pledged match-money.
//!
//! A fund belongs to a champion or pledger and is bound to one or more
//! campaigns through [`CampaignFunding`](crate::CampaignFunding) rows. Funds
//! are immutable after creation except for top-up events, which are the
//! durable collaborator's concern; the engine only ever sees top-ups as
//! credits to a funding's real-time balance.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Currency, FundId};

/// The kind of match-money a fund holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FundType {
    /// An individual supporter's pledge, committed before the campaign.
    Pledge,
    /// A pledge topped up while the campaign is live.
    TopupPledge,
    /// A champion's fund, typically consumed after pledges.
    ChampionFund,
}

impl fmt::Display for FundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pledge => write!(f, "PLEDGE"),
            Self::TopupPledge => write!(f, "TOPUP_PLEDGE"),
            Self::ChampionFund => write!(f, "CHAMPION_FUND"),
        }
    }
}

/// A pool of pledged match-money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fund {
    /// Durable identity, assigned at persistence time.
    pub id: FundId,
    /// Currency every allocation from this fund is denominated in.
    pub currency: Currency,
    /// What kind of match-money this is.
    pub fund_type: FundType,
    /// Display name shown to donors ("The Smith Family Pledge").
    pub name: String,
    /// Identity of this fund in the external CRM, when synced.
    pub external_ref: Option<String>,
}

/// Dummy fund for testing.
#[cfg(any(test, feature = "test-helpers"))]
impl Fund {
    /// Create a dummy GBP pledge fund for unit tests.
    #[must_use]
    pub fn dummy(id: i64, fund_type: FundType) -> Self {
        Self {
            id: FundId(id),
            currency: Currency::gbp(),
            fund_type,
            name: format!("Test fund {id}"),
            external_ref: None,
        }
    }
}

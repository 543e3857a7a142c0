//! # matchfund-types
//!
//! Shared types, errors, and configuration for the **Matchfund** allocation
//! engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`FundId`], [`FundingId`], [`CampaignId`], [`DonationId`], [`WithdrawalId`]
//! - **Money**: [`Currency`] with exact minor-unit conversion
//! - **Fund model**: [`Fund`], [`FundType`]
//! - **Funding model**: [`CampaignFunding`]
//! - **Donation model**: [`Donation`], [`MatchStatus`]
//! - **Withdrawal model**: [`Withdrawal`]
//! - **Configuration**: [`MatchingConfig`]
//! - **Errors**: [`MatchfundError`] with `MF_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod config;
pub mod constants;
pub mod donation;
pub mod error;
pub mod fund;
pub mod funding;
pub mod ids;
pub mod money;
pub mod withdrawal;

// Re-export all primary types at crate root for ergonomic imports:
//   use matchfund_types::{Donation, CampaignFunding, Withdrawal, ...};

pub use config::*;
pub use donation::*;
pub use error::*;
pub use fund::*;
pub use funding::*;
pub use ids::*;
pub use money::*;
pub use withdrawal::*;

// Constants are accessed via `matchfund_types::constants::FOO`
// (not re-exported to avoid name collisions).

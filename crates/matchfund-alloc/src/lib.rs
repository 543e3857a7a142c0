//! # matchfund-alloc
//!
//! The allocation core: decides how much of a campaign's shared match-fund
//! pools to reserve for each donation, under concurrent traffic, without a
//! durable-database lock per request.
//!
//! ## Architecture
//!
//! ```text
//! allocate_match_funds(donation)
//!         │
//!         ▼
//!   ┌───────────┐   get_amount_available / subtract_amount   ┌──────────────┐
//!   │ Allocator ├───────────────────────────────────────────▶│MatchingAdapter│
//!   └─────┬─────┘                                            └──────┬───────┘
//!         │ persist withdrawals + flush                             │ fetch-and-add
//!         ▼                                                         ▼
//!   FundingRepository (durable collaborator)               CounterStore (atomic KV)
//! ```
//!
//! The only synchronization primitive is the counter store's per-key atomic
//! fetch-and-add. A decrement that drives a balance negative is healed by a
//! bounded compensation loop; every partial mutation before a failure is
//! reversed through the per-call [`AllocationLedger`].
//!
//! - [`MatchingAdapter`]: the optimistic subtract/compensate protocol
//! - [`AllocationLedger`]: per-allocation rollback ledger
//! - [`Allocator`]: orchestrates one donation across ordered fundings
//! - [`FundingRepository`]: the durable collaborator seam
//! - [`Reconciler`]: out-of-band repair after a terminal lock

pub mod adapter;
pub mod allocator;
pub mod ledger;
pub mod reconciliation;
pub mod repository;

pub use adapter::MatchingAdapter;
pub use allocator::Allocator;
pub use ledger::{AllocationLedger, LedgerEntry};
pub use reconciliation::{FundingAudit, FundingAuditStatus, Reconciler};
pub use repository::{FundingRepository, InMemoryFundingRepository};

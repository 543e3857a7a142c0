//! End-to-end allocation scenarios across the whole stack:
//! Allocator -> MatchingAdapter -> CounterStore, with the in-memory
//! durable collaborator persisting withdrawal rows.

use std::sync::Arc;

use rust_decimal::Decimal;

use matchfund_alloc::{Allocator, InMemoryFundingRepository, MatchingAdapter};
use matchfund_store::InMemoryCounterStore;
use matchfund_types::{
    CampaignFunding, CampaignId, Currency, Donation, FundingId, MatchStatus, MatchfundError,
    WithdrawalId,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn dec(minor: i64) -> Decimal {
    Decimal::new(minor, 2)
}

/// Helper: a campaign with a set of GBP fundings behind a shared counter
/// store, ready to take donations.
struct MatchingHarness {
    allocator: Allocator<Arc<InMemoryCounterStore>, InMemoryFundingRepository>,
    fundings: Vec<CampaignFunding>,
    campaign: CampaignId,
}

impl MatchingHarness {
    /// `fundings`: (id, amount available, allocation order).
    fn new(fundings: &[(i64, Decimal, u32)]) -> Self {
        init_tracing();
        let campaign = CampaignId::new();
        let mut repo = InMemoryFundingRepository::new();
        let mut built = Vec::new();
        for &(id, amount, order) in fundings {
            let mut funding = CampaignFunding::dummy(id, amount);
            funding.campaign_id = campaign;
            funding.allocation_order = order;
            repo.add_funding(funding.clone());
            built.push(funding);
        }
        Self {
            allocator: Allocator::new(
                MatchingAdapter::new(Arc::new(InMemoryCounterStore::new())),
                repo,
            ),
            fundings: built,
            campaign,
        }
    }

    fn donation(&self, amount: Decimal) -> Donation {
        Donation::new(self.campaign, amount, Currency::gbp())
    }

    fn balance_of(&self, id: i64) -> Decimal {
        let funding = self
            .fundings
            .iter()
            .find(|f| f.id == FundingId(id))
            .expect("unknown funding id");
        self.allocator.adapter().get_amount_available(funding).unwrap()
    }
}

#[test]
fn single_funding_exact_match() {
    let mut harness = MatchingHarness::new(&[(1, dec(100), 100)]);
    let mut donation = harness.donation(dec(100));

    let matched = harness.allocator.allocate_match_funds(&mut donation).unwrap();

    assert_eq!(matched, dec(100));
    assert_eq!(matched.to_string(), "1.00");
    assert_eq!(donation.match_status, MatchStatus::FullyMatched);
    assert_eq!(donation.withdrawals.len(), 1);
    assert_eq!(donation.withdrawals[0].amount, dec(100));
    assert_eq!(harness.balance_of(1), Decimal::ZERO);

    // Exactly one row persisted.
    let rows = harness
        .allocator
        .repository()
        .withdrawals_for_donation(donation.id);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, dec(100));
}

#[test]
fn spillover_consumes_fundings_in_priority_order() {
    // 6.00 of pledge money first, then a deep champion fund.
    let mut harness =
        MatchingHarness::new(&[(1, dec(600), 100), (2, dec(100_000_000), 200)]);
    let mut donation = harness.donation(dec(1_000));

    let matched = harness.allocator.allocate_match_funds(&mut donation).unwrap();

    assert_eq!(matched, dec(1_000));
    assert_eq!(matched.to_string(), "10.00");
    assert_eq!(donation.match_status, MatchStatus::FullyMatched);

    // Withdrawals in consumption order: 6.00 then 4.00.
    let amounts: Vec<(FundingId, Decimal)> = donation
        .withdrawals
        .iter()
        .map(|w| (w.funding_id, w.amount))
        .collect();
    assert_eq!(
        amounts,
        vec![(FundingId(1), dec(600)), (FundingId(2), dec(400))]
    );

    assert_eq!(harness.balance_of(1), Decimal::ZERO);
    assert_eq!(harness.balance_of(2), dec(99_999_600));
}

#[test]
fn currency_mismatch_means_zero_mutation() {
    let harness = MatchingHarness::new(&[(1, dec(10_000), 100)]);
    // Swap the funding to USD behind the repository's back.
    let mut usd_funding = harness.fundings[0].clone();
    usd_funding.currency = Currency::usd();
    let mut repo = InMemoryFundingRepository::new();
    repo.add_funding(usd_funding);
    let mut allocator = Allocator::new(
        MatchingAdapter::new(Arc::new(InMemoryCounterStore::new())),
        repo,
    );

    let mut donation = harness.donation(dec(1_000));
    let err = allocator.allocate_match_funds(&mut donation).unwrap_err();

    assert!(matches!(err, MatchfundError::CurrencyMismatch { .. }));
    assert!(donation.withdrawals.is_empty());
    assert_eq!(donation.match_status, MatchStatus::Unmatched);
    assert!(allocator.adapter().store().is_empty().unwrap());
    assert_eq!(allocator.repository().withdrawal_count(), 0);
}

#[test]
fn sequential_donations_drain_the_pool() {
    // 50.00 pool: first 30.00 donation matches in full, the second gets
    // the 20.00 remainder, the third gets nothing.
    let mut harness = MatchingHarness::new(&[(1, dec(5_000), 100)]);

    let mut first = harness.donation(dec(3_000));
    assert_eq!(
        harness.allocator.allocate_match_funds(&mut first).unwrap(),
        dec(3_000)
    );
    assert_eq!(first.match_status, MatchStatus::FullyMatched);
    assert_eq!(harness.balance_of(1), dec(2_000));

    let mut second = harness.donation(dec(3_000));
    assert_eq!(
        harness.allocator.allocate_match_funds(&mut second).unwrap(),
        dec(2_000)
    );
    assert_eq!(second.match_status, MatchStatus::PartiallyMatched);
    assert_eq!(second.withdrawals.len(), 1);
    assert_eq!(second.withdrawals[0].amount, dec(2_000));
    assert_eq!(harness.balance_of(1), Decimal::ZERO);

    let mut third = harness.donation(dec(3_000));
    assert_eq!(
        harness.allocator.allocate_match_funds(&mut third).unwrap(),
        Decimal::ZERO
    );
    assert_eq!(third.match_status, MatchStatus::Unmatched);
    assert!(third.withdrawals.is_empty());
}

#[test]
fn donation_larger_than_all_fundings() {
    let mut harness = MatchingHarness::new(&[(1, dec(600), 100), (2, dec(500), 200)]);
    let mut donation = harness.donation(dec(2_000));

    let matched = harness.allocator.allocate_match_funds(&mut donation).unwrap();

    assert_eq!(matched, dec(1_100));
    assert_eq!(donation.match_status, MatchStatus::PartiallyMatched);
    assert_eq!(donation.withdrawals.len(), 2);
    assert_eq!(harness.balance_of(1), Decimal::ZERO);
    assert_eq!(harness.balance_of(2), Decimal::ZERO);
}

#[test]
fn release_returns_funds_and_rows_then_rematches() {
    let mut harness = MatchingHarness::new(&[(1, dec(600), 100), (2, dec(500), 200)]);
    let mut donation = harness.donation(dec(1_000));

    harness.allocator.allocate_match_funds(&mut donation).unwrap();
    let first_ids: Vec<WithdrawalId> = donation.withdrawals.iter().map(|w| w.id).collect();
    assert_eq!(harness.allocator.repository().withdrawal_count(), 2);

    let released = harness.allocator.release_match_funds(&mut donation).unwrap();
    assert_eq!(released, dec(1_000));
    assert_eq!(donation.match_status, MatchStatus::Released);
    assert!(donation.withdrawals.is_empty());
    assert_eq!(harness.allocator.repository().withdrawal_count(), 0);
    assert_eq!(harness.balance_of(1), dec(600));
    assert_eq!(harness.balance_of(2), dec(500));

    // Re-matching starts from UNMATCHED and produces the same rows again —
    // withdrawal ids are deterministic per (donation, funding, sequence).
    let matched = harness.allocator.allocate_match_funds(&mut donation).unwrap();
    assert_eq!(matched, dec(1_000));
    assert_eq!(donation.match_status, MatchStatus::FullyMatched);
    let second_ids: Vec<WithdrawalId> = donation.withdrawals.iter().map(|w| w.id).collect();
    assert_eq!(first_ids, second_ids);
    assert_eq!(harness.allocator.repository().withdrawal_count(), 2);
}

#[test]
fn top_up_lets_a_partial_match_complete() {
    let mut harness = MatchingHarness::new(&[(1, dec(700), 100)]);
    let mut donation = harness.donation(dec(1_000));

    let matched = harness.allocator.allocate_match_funds(&mut donation).unwrap();
    assert_eq!(matched, dec(700));
    assert_eq!(donation.match_status, MatchStatus::PartiallyMatched);

    // The fund is topped up; the collaborator credits the real-time side.
    let funding = harness.fundings[0].clone();
    harness
        .allocator
        .adapter()
        .add_amount(&funding, dec(1_000))
        .unwrap();

    let matched = harness.allocator.allocate_match_funds(&mut donation).unwrap();
    assert_eq!(matched, dec(1_000));
    assert_eq!(donation.match_status, MatchStatus::FullyMatched);
    // Still a single row for the (funding, donation) pair.
    assert_eq!(donation.withdrawals.len(), 1);
    assert_eq!(donation.withdrawals[0].amount, dec(1_000));
    assert_eq!(harness.balance_of(1), dec(700));
}

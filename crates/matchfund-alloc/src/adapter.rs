//! The matching adapter — optimistic subtract/compensate over the counter store.
//!
//! One funding at a time, the adapter turns "reserve this much match money"
//! into a single atomic decrement. Contested writes are common; contested
//! re-reads are rare. So the protocol spends nothing on the happy path
//! (decrement lands at or above zero — done) and treats an overshoot into
//! negative territory as the exceptional, self-healing path:
//!
//! ```text
//! decr_by(key, n) = v
//!   v ≥ 0 → full allocation
//!   v < 0 → overshoot o = -v; up to `max_compensation_attempts` times:
//!             incr_by(key, min(o, n - given so far)) = b
//!             b ≥ 0 → partial allocation of n - total given  (LessThanRequested)
//!             b < 0 → o = -b, retry (rivals pushed it further down)
//!           budget exhausted → TerminalLock, negative value left in store
//! ```
//!
//! Give-backs are cumulatively capped at this call's own decrement: a
//! caller can only return money it took. Without the cap, two callers
//! compensating for the same negative window would both credit it and
//! mint balance that was never pledged.
//!
//! No caller ever blocks on another. A balance may transiently read
//! negative mid-compensation; a balance that *stays* negative past the
//! retry budget is an operator-visible anomaly handled out of band by the
//! [`Reconciler`](crate::Reconciler).

use rust_decimal::Decimal;

use matchfund_store::CounterStore;
use matchfund_store::keys::funding_balance_key;
use matchfund_types::{
    CampaignFunding, Donation, MatchfundError, MatchingConfig, Result,
};

use crate::ledger::AllocationLedger;

/// Implements the optimistic allocation protocol for one funding at a time.
///
/// The adapter is stateless apart from the injected store handle and
/// config: all rollback bookkeeping lives in the caller's
/// [`AllocationLedger`], so any number of concurrent allocation contexts
/// can share one adapter.
pub struct MatchingAdapter<S: CounterStore> {
    store: S,
    config: MatchingConfig,
}

impl<S: CounterStore> MatchingAdapter<S> {
    /// Create an adapter with the default config.
    pub fn new(store: S) -> Self {
        Self::with_config(store, MatchingConfig::default())
    }

    /// Create an adapter with an explicit config.
    pub fn with_config(store: S, config: MatchingConfig) -> Self {
        Self { store, config }
    }

    /// The underlying counter store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The funding's real-time balance: the stored value if the key exists,
    /// else the durable snapshot. Never writes — lazy initialization
    /// happens only when a mutation first touches the key.
    pub fn get_amount_available(&self, funding: &CampaignFunding) -> Result<Decimal> {
        let key = funding_balance_key(funding.id);
        match self.store.get(&key)? {
            Some(minor_units) => Ok(funding.currency.from_minor_units(minor_units)),
            None => Ok(funding.amount_available),
        }
    }

    /// Atomically credit the funding's real-time balance. Used for top-up
    /// credits, compensation, and releases. Returns the new balance.
    pub fn add_amount(&self, funding: &CampaignFunding, amount: Decimal) -> Result<Decimal> {
        let key = funding_balance_key(funding.id);
        let minor_units = funding.currency.to_minor_units(amount)?;
        self.ensure_initialised(&key, funding)?;
        let balance = self.store.incr_by(&key, minor_units)?;
        Ok(funding.currency.from_minor_units(balance))
    }

    /// Atomically reserve `amount` from the funding.
    ///
    /// On full success the granted amount is recorded in `ledger` and
    /// returned. Losing a race for the last of the balance yields
    /// [`MatchfundError::LessThanRequested`] with the store already
    /// reconciled and the partial amount ledger-recorded; exhausting the
    /// compensation budget yields [`MatchfundError::TerminalLock`] with the
    /// negative remainder left in place.
    pub fn subtract_amount(
        &self,
        ledger: &mut AllocationLedger,
        funding: &CampaignFunding,
        amount: Decimal,
    ) -> Result<Decimal> {
        let key = funding_balance_key(funding.id);
        let requested_units = funding.currency.to_minor_units(amount)?;
        self.ensure_initialised(&key, funding)?;

        let value = self.store.decr_by(&key, requested_units)?;
        if value >= 0 {
            ledger.record(funding.id, funding.currency.clone(), requested_units);
            tracing::debug!(
                funding = %funding.id,
                amount = %amount,
                balance_minor_units = value,
                "Allocated in full"
            );
            return Ok(amount);
        }

        self.compensate(ledger, funding, &key, requested_units, -value, amount)
    }

    /// Bounded compensation after a decrement overshot the balance.
    fn compensate(
        &self,
        ledger: &mut AllocationLedger,
        funding: &CampaignFunding,
        key: &str,
        requested_units: i64,
        mut overshoot: i64,
        requested: Decimal,
    ) -> Result<Decimal> {
        let attempts = self.config.max_compensation_attempts;
        let mut given: i64 = 0;
        for attempt in 1..=attempts {
            // Give back what we over-took — cumulatively capped at our own
            // decrement, so this call can never credit money it did not
            // subtract. A zero give-back still re-reads the balance, which
            // lets a rival's in-flight compensation unblock us.
            let give_back = overshoot.min(requested_units - given);
            let balance = self.store.incr_by(key, give_back)?;
            given += give_back;

            if balance >= 0 {
                let allocated_units = requested_units - given;
                if allocated_units > 0 {
                    ledger.record(funding.id, funding.currency.clone(), allocated_units);
                }
                let allocated = funding.currency.from_minor_units(allocated_units);
                tracing::warn!(
                    funding = %funding.id,
                    requested = %requested,
                    allocated = %allocated,
                    attempt,
                    "Balance contention: allocated less than requested"
                );
                return Err(MatchfundError::LessThanRequested {
                    requested,
                    allocated,
                });
            }

            // Rivals drove the balance further down between our decrement
            // and this compensation; re-measure and try again.
            overshoot = -balance;
        }

        tracing::error!(
            funding = %funding.id,
            key,
            balance_minor_units = -overshoot,
            attempts,
            "Compensation budget exhausted; negative balance left for reconciliation"
        );
        Err(MatchfundError::TerminalLock {
            key: key.to_string(),
            balance_minor_units: -overshoot,
            attempts,
        })
    }

    /// Remove the funding's real-time key. Subsequent reads fall back to
    /// the durable snapshot.
    pub fn delete(&self, funding: &CampaignFunding) -> Result<()> {
        self.store.del(&funding_balance_key(funding.id))
    }

    /// Reverse every subtraction recorded in this allocation context,
    /// returning the total credited back. Entries are consumed as they are
    /// reversed, so a store failure mid-way leaves exactly the unreversed
    /// remainder in the ledger for a retry.
    pub fn release_newly_allocated_funds(&self, ledger: &mut AllocationLedger) -> Result<Decimal> {
        let mut total = Decimal::ZERO;
        while let Some(entry) = ledger.pop() {
            let key = funding_balance_key(entry.funding_id);
            match self.store.incr_by(&key, entry.minor_units) {
                Ok(_) => total += entry.currency.from_minor_units(entry.minor_units),
                Err(err) => {
                    ledger.record(entry.funding_id, entry.currency, entry.minor_units);
                    return Err(err);
                }
            }
        }
        if total > Decimal::ZERO {
            tracing::debug!(released = %total, "Released newly allocated funds");
        }
        Ok(total)
    }

    /// Credit each of the donation's existing withdrawal amounts back to
    /// its funding's real-time balance. Returns the total released. Pairs
    /// with the caller deleting the withdrawal rows from the durable store.
    pub fn release_all_funds_for_donation(&self, donation: &Donation) -> Result<Decimal> {
        let mut total = Decimal::ZERO;
        for withdrawal in &donation.withdrawals {
            let key = funding_balance_key(withdrawal.funding_id);
            let minor_units = donation.currency.to_minor_units(withdrawal.amount)?;
            self.store.incr_by(&key, minor_units)?;
            total += withdrawal.amount;
        }
        tracing::debug!(
            donation = %donation.id,
            released = %total,
            withdrawals = donation.withdrawals.len(),
            "Released all funds for donation"
        );
        Ok(total)
    }

    fn ensure_initialised(&self, key: &str, funding: &CampaignFunding) -> Result<()> {
        let snapshot_units = funding.currency.to_minor_units(funding.amount_available)?;
        self.store.set_if_absent(key, snapshot_units)?;
        Ok(())
    }
}

//! # matchfund-store
//!
//! The atomic counter-store abstraction holding real-time funding balances.
//!
//! The matching protocol needs exactly one synchronization primitive:
//! per-key atomic fetch-and-add. Anything that provides it (Redis, a
//! sharded cache, the in-process implementation here) can back the engine
//! by implementing [`CounterStore`]. No cross-key atomicity is assumed or
//! required.
//!
//! - [`CounterStore`]: the trait contract
//! - [`InMemoryCounterStore`]: reference implementation (`Mutex<HashMap>`)
//! - [`keys`]: deterministic, versioned key derivation from funding ids
//! - [`HookedCounterStore`]: test wrapper injecting adversarial concurrent
//!   writers (behind the `test-helpers` feature)

pub mod counter;
pub mod keys;
pub mod memory;

#[cfg(any(test, feature = "test-helpers"))]
pub mod hooked;

pub use counter::CounterStore;
pub use memory::InMemoryCounterStore;

#[cfg(any(test, feature = "test-helpers"))]
pub use hooked::HookedCounterStore;

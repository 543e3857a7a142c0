//! The counter-store trait contract.

use matchfund_types::Result;

/// An atomic key-value counter store.
///
/// Every operation acts on a single key and is atomic with respect to all
/// other operations on that key — equivalent to a single fetch-and-add.
/// Implementations make no atomicity promise across keys, and the engine
/// never relies on one.
///
/// Values are integer minor units. A key that has never been written is
/// *absent*, which the adapter distinguishes from a zero balance: absent
/// means "fall back to the durable snapshot".
///
/// Implementations must be shareable across threads; any number of adapter
/// instances in any number of processes may drive the same store
/// concurrently, and none owns exclusive access.
pub trait CounterStore: Send + Sync {
    /// Read a key. `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<i64>>;

    /// Write a key unconditionally.
    fn set(&self, key: &str, value: i64) -> Result<()>;

    /// Write a key only if it is absent (lazy initialization). Returns
    /// `true` if the write happened, `false` if the key already existed.
    fn set_if_absent(&self, key: &str, value: i64) -> Result<bool>;

    /// Atomically add `delta` to a key and return the new value. An absent
    /// key is treated as 0.
    fn incr_by(&self, key: &str, delta: i64) -> Result<i64>;

    /// Atomically subtract `delta` from a key and return the new value. An
    /// absent key is treated as 0.
    fn decr_by(&self, key: &str, delta: i64) -> Result<i64>;

    /// Remove a key. Removing an absent key is a no-op.
    fn del(&self, key: &str) -> Result<()>;
}

// A shared handle to a store is itself a store, so components can hold
// `Arc<S>` without caring which side owns the connection.
impl<S: CounterStore + ?Sized> CounterStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<i64>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: i64) -> Result<()> {
        (**self).set(key, value)
    }

    fn set_if_absent(&self, key: &str, value: i64) -> Result<bool> {
        (**self).set_if_absent(key, value)
    }

    fn incr_by(&self, key: &str, delta: i64) -> Result<i64> {
        (**self).incr_by(key, delta)
    }

    fn decr_by(&self, key: &str, delta: i64) -> Result<i64> {
        (**self).decr_by(key, delta)
    }

    fn del(&self, key: &str) -> Result<()> {
        (**self).del(key)
    }
}

//! In-memory counter store.
//!
//! The reference [`CounterStore`]: a mutex-guarded map, shareable via
//! `Arc`, satisfying the per-key atomicity contract for any number of
//! threads in one process. Production deployments that span processes back
//! the trait with an external atomic key-value service instead.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Mutex, MutexGuard};

use matchfund_types::{MatchfundError, Result};

use crate::counter::CounterStore;

/// A process-local, thread-safe counter store.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    counters: Mutex<HashMap<String, i64>>,
}

impl InMemoryCounterStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys. Test and diagnostics helper.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, i64>>> {
        self.counters
            .lock()
            .map_err(|_| MatchfundError::StoreUnavailable {
                reason: "counter mutex poisoned".into(),
            })
    }
}

impl CounterStore for InMemoryCounterStore {
    fn get(&self, key: &str) -> Result<Option<i64>> {
        Ok(self.lock()?.get(key).copied())
    }

    fn set(&self, key: &str, value: i64) -> Result<()> {
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }

    fn set_if_absent(&self, key: &str, value: i64) -> Result<bool> {
        match self.lock()?.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(true)
            }
            Entry::Occupied(_) => Ok(false),
        }
    }

    fn incr_by(&self, key: &str, delta: i64) -> Result<i64> {
        let mut counters = self.lock()?;
        let value = counters.entry(key.to_string()).or_insert(0);
        *value += delta;
        Ok(*value)
    }

    fn decr_by(&self, key: &str, delta: i64) -> Result<i64> {
        let mut counters = self.lock()?;
        let value = counters.entry(key.to_string()).or_insert(0);
        *value -= delta;
        Ok(*value)
    }

    fn del(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

//! Hookable store wrapper for deterministic race simulation.
//!
//! The compensation protocol exists for the window between one caller's
//! read and its decrement. Real schedulers make that window hard to hit on
//! demand; [`HookedCounterStore`] makes it trivial by running a registered
//! closure immediately *before* forwarding each `decr_by`/`incr_by` to the
//! wrapped store. The closure plays the adversarial concurrent writer —
//! typically by decrementing the same key through its own handle to the
//! inner store.
//!
//! Available only with the `test-helpers` feature; never used in
//! production paths.

use std::sync::Mutex;

use matchfund_types::Result;

use crate::counter::CounterStore;

type Hook = Box<dyn FnMut(&str, i64) + Send>;

/// Wraps any [`CounterStore`], invoking hooks before counter mutations.
pub struct HookedCounterStore<S: CounterStore> {
    inner: S,
    before_decr: Mutex<Option<Hook>>,
    before_incr: Mutex<Option<Hook>>,
}

impl<S: CounterStore> HookedCounterStore<S> {
    /// Wrap a store with no hooks installed.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            before_decr: Mutex::new(None),
            before_incr: Mutex::new(None),
        }
    }

    /// Run `hook` before every `decr_by` forwarded to the inner store.
    pub fn set_before_decr(&self, hook: impl FnMut(&str, i64) + Send + 'static) {
        *self.before_decr.lock().expect("hook mutex poisoned") = Some(Box::new(hook));
    }

    /// Run `hook` before every `incr_by` forwarded to the inner store.
    pub fn set_before_incr(&self, hook: impl FnMut(&str, i64) + Send + 'static) {
        *self.before_incr.lock().expect("hook mutex poisoned") = Some(Box::new(hook));
    }

    /// Remove both hooks.
    pub fn clear_hooks(&self) {
        *self.before_decr.lock().expect("hook mutex poisoned") = None;
        *self.before_incr.lock().expect("hook mutex poisoned") = None;
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn fire(slot: &Mutex<Option<Hook>>, key: &str, delta: i64) {
        if let Some(hook) = slot.lock().expect("hook mutex poisoned").as_mut() {
            hook(key, delta);
        }
    }
}

impl<S: CounterStore> CounterStore for HookedCounterStore<S> {
    fn get(&self, key: &str) -> Result<Option<i64>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: i64) -> Result<()> {
        self.inner.set(key, value)
    }

    fn set_if_absent(&self, key: &str, value: i64) -> Result<bool> {
        self.inner.set_if_absent(key, value)
    }

    fn incr_by(&self, key: &str, delta: i64) -> Result<i64> {
        Self::fire(&self.before_incr, key, delta);
        self.inner.incr_by(key, delta)
    }

    fn decr_by(&self, key: &str, delta: i64) -> Result<i64> {
        Self::fire(&self.before_decr, key, delta);
        self.inner.decr_by(key, delta)
    }

    fn del(&self, key: &str) -> Result<()> {
        self.inner.del(key)
    }
}

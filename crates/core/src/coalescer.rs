//! Request coalescing
//!
//! When several callers ask for the same logical request while one is already
//! in flight, only the first triggers network work. Later callers are parked
//! on the same key and all of them receive the single result.
//!
//! ```text
//! caller A ─┐
//!           ├──► CallbackCache ──(first only)──► OperationQueue ──► transport
//! caller B ─┘        ▲                                                 │
//!                    └──────────── resolve(key, result) ◄──────────────┘
//! ```
//!
//! One mutex guards the whole map, so `add` and `drain` are atomic with
//! respect to each other across all keys. Callbacks always run after the lock
//! is released and may re-enter the facade.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use purchases_domain::PurchasesError;
use tracing::{debug, error};

use crate::cache_key::CacheKey;

/// Completion callback receiving the outcome of one request.
pub type Completion<T> = Box<dyn FnOnce(Result<T, PurchasesError>) + Send + 'static>;

/// Outcome of registering a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// No request was in flight for the key; the caller must dispatch one.
    FirstCallbackAdded,
    /// A request is already in flight; the callback will be invoked with its result.
    AddedToExisting,
}

/// Statistics for monitoring coalescing effectiveness.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CoalescerStats {
    /// Total callbacks registered
    pub total_requests: u64,
    /// Callbacks that joined an in-flight request
    pub coalesced_requests: u64,
    /// Callbacks that started a new request
    pub new_requests: u64,
}

impl CoalescerStats {
    /// Returns the coalescing ratio (0.0 to 1.0)
    pub fn coalescing_ratio(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.coalesced_requests as f64 / self.total_requests as f64
        }
    }
}

/// Per-key registry of callbacks waiting on an in-flight request.
pub struct CallbackCache<T> {
    name: &'static str,
    pending: Mutex<HashMap<CacheKey, Vec<Completion<T>>>>,
    total_requests: AtomicU64,
    coalesced_requests: AtomicU64,
    new_requests: AtomicU64,
}

impl<T> CallbackCache<T> {
    /// Creates an empty cache. `name` only labels log events.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            pending: Mutex::new(HashMap::new()),
            total_requests: AtomicU64::new(0),
            coalesced_requests: AtomicU64::new(0),
            new_requests: AtomicU64::new(0),
        }
    }

    /// Register `callback` under `key`, preserving insertion order.
    pub fn add(&self, key: &CacheKey, callback: Completion<T>) -> CacheStatus {
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        let mut pending = self.pending.lock();
        if let Some(callbacks) = pending.get_mut(key) {
            callbacks.push(callback);
            self.coalesced_requests.fetch_add(1, Ordering::Relaxed);
            debug!(
                cache = self.name,
                key = %key,
                waiters = callbacks.len(),
                "Coalescing request onto in-flight call"
            );
            CacheStatus::AddedToExisting
        } else {
            pending.insert(key.clone(), vec![callback]);
            self.new_requests.fetch_add(1, Ordering::Relaxed);
            debug!(cache = self.name, key = %key, in_flight = pending.len(), "New in-flight request");
            CacheStatus::FirstCallbackAdded
        }
    }

    /// Remove and return every callback registered under `key`.
    ///
    /// # Panics
    ///
    /// Panics if nothing is registered under `key`. Each key is drained exactly
    /// once by the request its first callback dispatched, so an absent key is a
    /// logic error.
    #[allow(clippy::panic)]
    pub fn drain(&self, key: &CacheKey) -> Vec<Completion<T>> {
        let drained = self.pending.lock().remove(key);
        match drained {
            Some(callbacks) => callbacks,
            None => panic!("no callbacks registered for key `{key}` in `{}` cache", self.name),
        }
    }

    /// Number of keys with a request currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Returns a snapshot of the current statistics.
    pub fn stats(&self) -> CoalescerStats {
        CoalescerStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            coalesced_requests: self.coalesced_requests.load(Ordering::Relaxed),
            new_requests: self.new_requests.load(Ordering::Relaxed),
        }
    }

    /// Label used in log events.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: Clone> CallbackCache<T> {
    /// Drain `key` and hand every waiter a value-equal copy of `result`.
    ///
    /// Callbacks run in registration order, outside the lock. A panicking
    /// callback is logged and the remaining waiters still receive the result.
    pub fn resolve(&self, key: &CacheKey, result: Result<T, PurchasesError>) {
        let mut callbacks = self.drain(key);
        debug!(cache = self.name, key = %key, waiters = callbacks.len(), "Resolving request");

        let last = callbacks.pop();
        for callback in callbacks {
            self.invoke(key, callback, result.clone());
        }
        if let Some(last) = last {
            self.invoke(key, last, result);
        }
    }

    fn invoke(&self, key: &CacheKey, callback: Completion<T>, result: Result<T, PurchasesError>) {
        if panic::catch_unwind(AssertUnwindSafe(|| callback(result))).is_err() {
            error!(cache = self.name, key = %key, "Completion callback panicked");
        }
    }
}

//! Busy Flags
//!
//! Advisory "operation in flight" markers for UI display. They never block an
//! operation from starting; they only report that one is running.
//!
//! Both flavours are reference-counted and released by an RAII guard, so the
//! mark is cleared on every exit path (success, error or early return).

use ahash::AHashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A single operation-scoped busy flag (e.g. "creating")
#[derive(Clone, Debug, Default)]
pub struct BusyFlag {
    in_flight: Arc<AtomicUsize>,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark one operation as started; the mark is released when the guard drops
    pub fn enter(&self) -> BusyGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        BusyGuard {
            in_flight: self.in_flight.clone(),
        }
    }

    /// Whether any operation holding this flag is running
    pub fn is_set(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }
}

/// Releases a [`BusyFlag`] mark on drop
#[must_use = "the flag is cleared as soon as the guard is dropped"]
#[derive(Debug)]
pub struct BusyGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Busy flags keyed by name (e.g. one per item)
#[derive(Clone, Debug, Default)]
pub struct BusyMap {
    in_flight: Arc<Mutex<AHashMap<String, usize>>>,
}

impl BusyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` as busy until the guard drops
    pub fn enter(&self, key: impl Into<String>) -> BusyKeyGuard {
        let key = key.into();
        *self.in_flight.lock().entry(key.clone()).or_insert(0) += 1;
        BusyKeyGuard {
            in_flight: self.in_flight.clone(),
            key,
        }
    }

    /// Whether `key` has an operation in flight
    pub fn is_busy(&self, key: &str) -> bool {
        self.in_flight.lock().get(key).is_some_and(|count| *count > 0)
    }

    /// Names currently marked busy
    pub fn busy_keys(&self) -> Vec<String> {
        self.in_flight.lock().keys().cloned().collect()
    }
}

/// Releases a [`BusyMap`] mark on drop
#[must_use = "the flag is cleared as soon as the guard is dropped"]
#[derive(Debug)]
pub struct BusyKeyGuard {
    in_flight: Arc<Mutex<AHashMap<String, usize>>>,
    key: String,
}

impl Drop for BusyKeyGuard {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.lock();
        if let Some(count) = in_flight.get_mut(&self.key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                in_flight.remove(&self.key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_clears_when_guard_drops() {
        let flag = BusyFlag::new();
        assert!(!flag.is_set());

        let guard = flag.enter();
        assert!(flag.is_set());

        drop(guard);
        assert!(!flag.is_set());
    }

    #[test]
    fn flag_stays_set_while_any_guard_lives() {
        let flag = BusyFlag::new();
        let first = flag.enter();
        let second = flag.enter();

        drop(first);
        assert!(flag.is_set());
        drop(second);
        assert!(!flag.is_set());
    }

    #[test]
    fn map_tracks_keys_independently() {
        let map = BusyMap::new();
        let foo = map.enter("foo");
        let bar = map.enter("bar");

        drop(foo);
        assert!(!map.is_busy("foo"));
        assert!(map.is_busy("bar"));

        drop(bar);
        assert!(map.busy_keys().is_empty());
    }
}

// In crates/engine/src/state.rs

use core_types::{Crossover, PairKey};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The last notified crossover direction per (instrument, timeframe).
///
/// An absent entry means no crossover is currently known: nothing has been
/// detected since start-up, or the last observation was inconclusive.
/// Cloning produces another handle to the same map. Every method takes the lock
/// for a single key-level read or write, so cycles may overlap safely.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    inner: Arc<Mutex<HashMap<PairKey, Crossover>>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Entries are written in a single insert or remove, so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<PairKey, Crossover>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &PairKey) -> Option<Crossover> {
        self.lock().get(key).copied()
    }

    pub fn set(&self, key: PairKey, state: Crossover) {
        self.lock().insert(key, state);
    }

    /// Resets the entry to absent.
    pub fn clear(&self, key: &PairKey) {
        self.lock().remove(key);
    }

    /// Records `detected` for `key` and reports whether it is a new crossover.
    ///
    /// Returns `true` when the stored state was absent or pointed the other way.
    /// The read and the write happen under one lock.
    pub fn transition(&self, key: &PairKey, detected: Crossover) -> bool {
        let mut map = self.lock();
        match map.get(key) {
            Some(current) if *current == detected => false,
            _ => {
                map.insert(key.clone(), detected);
                true
            }
        }
    }

    /// All known states, sorted by key.
    pub fn snapshot(&self) -> Vec<(PairKey, Crossover)> {
        let mut entries: Vec<_> = self.lock().iter().map(|(k, v)| (k.clone(), *v)).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Symbol;

    fn key(symbol: &str, timeframe: &str) -> PairKey {
        PairKey {
            symbol: Symbol::from(symbol),
            timeframe: timeframe.to_string(),
        }
    }

    #[test]
    fn absent_until_set_and_cleared_again() {
        let store = StateStore::new();
        let k = key("BTCUSDT", "15m");
        assert_eq!(store.get(&k), None);

        store.set(k.clone(), Crossover::Down);
        assert_eq!(store.get(&k), Some(Crossover::Down));

        store.clear(&k);
        assert_eq!(store.get(&k), None);
        assert!(store.is_empty());
    }

    #[test]
    fn transition_only_reports_changes() {
        let store = StateStore::new();
        let k = key("ETHUSDT", "1h");

        assert!(store.transition(&k, Crossover::Up));
        assert!(!store.transition(&k, Crossover::Up));
        assert!(store.transition(&k, Crossover::Down));
        assert_eq!(store.get(&k), Some(Crossover::Down));

        store.clear(&k);
        assert!(store.transition(&k, Crossover::Down));
    }

    #[test]
    fn keys_are_independent() {
        let store = StateStore::new();
        store.set(key("BTCUSDT", "15m"), Crossover::Up);
        assert_eq!(store.get(&key("BTCUSDT", "1h")), None);
        assert_eq!(store.get(&key("ETHUSDT", "15m")), None);
    }

    #[test]
    fn clones_share_the_same_map() {
        let store = StateStore::new();
        let handle = store.clone();
        handle.set(key("XRPUSDT", "15m"), Crossover::Up);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn snapshot_is_sorted_by_key() {
        let store = StateStore::new();
        store.set(key("XRPUSDT", "15m"), Crossover::Up);
        store.set(key("BTCUSDT", "1h"), Crossover::Down);
        store.set(key("BTCUSDT", "15m"), Crossover::Up);

        let keys: Vec<String> = store.snapshot().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["BTCUSDT_15m", "BTCUSDT_1h", "XRPUSDT_15m"]);
    }

    #[test]
    fn concurrent_transitions_report_a_change_once() {
        let store = StateStore::new();
        let k = key("BTCUSDT", "15m");
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let k = k.clone();
                std::thread::spawn(move || store.transition(&k, Crossover::Up))
            })
            .collect();
        let changes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|changed| *changed)
            .count();
        assert_eq!(changes, 1);
    }
}

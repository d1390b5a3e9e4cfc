//! Per-rule aggregate storage.
//!
//! An [`AggregateStore`] maps a node identifier to the observations extracted
//! for that node. While ingestion runs the only mutation is
//! [`AggregateStore::append`]; every append takes the same store-wide lock, so
//! concurrent appends for one node are linearised and none are lost.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Concurrent-safe node → observations map with append-only sequences.
#[derive(Debug)]
pub struct AggregateStore<T> {
    inner: Mutex<HashMap<String, Vec<T>>>,
}

impl<T> Default for AggregateStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AggregateStore<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Append `observation` to the end of `node`'s sequence.
    pub fn append(&self, node: &str, observation: T) {
        let mut map = self.lock();
        match map.get_mut(node) {
            Some(seq) => seq.push(observation),
            None => {
                map.insert(node.to_string(), vec![observation]);
            }
        }
    }

    /// Number of distinct nodes with at least one observation.
    pub fn node_count(&self) -> usize {
        self.lock().len()
    }

    /// Number of observations recorded for `node`.
    pub fn count_for(&self, node: &str) -> usize {
        self.lock().get(node).map_or(0, Vec::len)
    }

    /// Number of observations across all nodes.
    pub fn total(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Take the accumulated data out, leaving the store empty.
    pub fn take(&self) -> BTreeMap<String, Vec<T>> {
        std::mem::take(&mut *self.lock()).into_iter().collect()
    }

    // A panic while holding the lock can only happen between two complete
    // appends, so the map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<T>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> AggregateStore<T> {
    /// Copy of the observations for `node`, in append order.
    pub fn observations(&self, node: &str) -> Vec<T> {
        self.lock().get(node).cloned().unwrap_or_default()
    }

    /// Copy of the whole store, sorted by node.
    pub fn snapshot(&self) -> BTreeMap<String, Vec<T>> {
        self.lock()
            .iter()
            .map(|(node, seq)| (node.clone(), seq.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_append_preserves_order() {
        let store = AggregateStore::new();
        store.append("n1", 3);
        store.append("n1", 1);
        store.append("n1", 2);
        assert_eq!(store.observations("n1"), vec![3, 1, 2]);
    }

    #[test]
    fn test_keys_are_unique() {
        let store = AggregateStore::new();
        store.append("n1", 'a');
        store.append("n2", 'b');
        store.append("n1", 'c');
        assert_eq!(store.node_count(), 2);
        assert_eq!(store.count_for("n1"), 2);
        assert_eq!(store.count_for("missing"), 0);
        assert_eq!(store.total(), 3);
    }

    #[test]
    fn test_snapshot_sorted_by_node() {
        let store = AggregateStore::new();
        store.append("zeta", 1);
        store.append("alpha", 2);
        let keys: Vec<String> = store.snapshot().into_keys().collect();
        assert_eq!(keys, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_take_empties_store() {
        let store = AggregateStore::new();
        store.append("n1", 1);
        let data = store.take();
        assert_eq!(data["n1"], vec![1]);
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_appends_same_node_are_not_lost() {
        let store = Arc::new(AggregateStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..1_000 {
                        store.append("shared", t * 1_000 + i);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let mut values = store.take().remove("shared").unwrap();
        assert_eq!(values.len(), 8_000);
        values.sort_unstable();
        values.dedup();
        assert_eq!(values.len(), 8_000);
    }
}

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::hash::Hash;
use std::sync::Arc;

/// A concurrent map whose values are computed at most once per key
///
/// Each key owns its own once-cell, so initializing one key never blocks
/// lookups or initialization of another. Callers racing on the same empty key
/// wait for a single initializer and all observe its value. A failed
/// initialization stores nothing; the next caller tries again.
pub struct OnceMap<K, V> {
    cells: DashMap<K, Arc<OnceCell<V>>>,
}

impl<K, V> OnceMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            cells: DashMap::new(),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.cells.get(key).and_then(|cell| cell.get().cloned())
    }

    pub fn get_or_try_init<E, F>(&self, key: K, init: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        // Clone the cell out so the shard lock is released before `init` runs.
        let cell = self.cells.entry(key).or_default().clone();
        cell.get_or_try_init(init).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Number of keys holding a value
    pub fn len(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.value().get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for OnceMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

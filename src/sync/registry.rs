use std::collections::BTreeMap;
use std::collections::btree_map;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A lock-guarded key/value table shared between the acceptor and workers.
///
/// Every operation except [`Registry::empty`] takes a [`RegistryGuard`]
/// obtained from [`Registry::lock`] on the same instance. Holding the guard
/// across several calls makes sequences like "find a free id, then insert"
/// atomic.
///
/// Passing a guard that came from another registry is a programming error
/// and panics.
///
/// # Example
///
/// ```
/// # use porthole::sync::Registry;
/// let registry: Registry<u8, &str> = Registry::new();
///
/// let mut guard = registry.lock();
/// if !registry.check_exist(&1, &guard) {
///     registry.insert_or_assign(1, "first", &mut guard);
/// }
/// assert_eq!(registry.find(&1, &guard), Some(&"first"));
/// ```
pub struct Registry<K, V> {
    entries: Mutex<BTreeMap<K, V>>,
}

/// Proof that the holder owns the lock of one specific [`Registry`].
///
/// The lock is released when the guard is dropped.
pub struct RegistryGuard<'a, K, V> {
    owner: &'a Registry<K, V>,
    entries: MutexGuard<'a, BTreeMap<K, V>>,
}

impl<K: Ord, V> Registry<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Acquires this registry's lock. A poisoned lock is recovered.
    pub fn lock(&self) -> RegistryGuard<'_, K, V> {
        RegistryGuard {
            owner: self,
            entries: self.entries.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Point-in-time emptiness check. Takes and releases the lock itself.
    pub fn empty(&self) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Inserts `value` under `key`, returning the value it replaced.
    pub fn insert_or_assign(
        &self,
        key: K,
        value: V,
        guard: &mut RegistryGuard<'_, K, V>,
    ) -> Option<V> {
        self.check_guard(guard);
        guard.entries.insert(key, value)
    }

    /// Removes `key`, handing its value back to the caller.
    pub fn erase(&self, key: &K, guard: &mut RegistryGuard<'_, K, V>) -> Option<V> {
        self.check_guard(guard);
        guard.entries.remove(key)
    }

    pub fn find<'g>(&self, key: &K, guard: &'g RegistryGuard<'_, K, V>) -> Option<&'g V> {
        self.check_guard(guard);
        guard.entries.get(key)
    }

    pub fn find_mut<'g>(
        &self,
        key: &K,
        guard: &'g mut RegistryGuard<'_, K, V>,
    ) -> Option<&'g mut V> {
        self.check_guard(guard);
        guard.entries.get_mut(key)
    }

    /// Like [`Registry::find`], but a missing key is a contract violation.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not present.
    pub fn at<'g>(&self, key: &K, guard: &'g RegistryGuard<'_, K, V>) -> &'g V {
        self.find(key, guard)
            .unwrap_or_else(|| panic!("registry: no entry for the requested key"))
    }

    pub fn check_exist(&self, key: &K, guard: &RegistryGuard<'_, K, V>) -> bool {
        self.check_guard(guard);
        guard.entries.contains_key(key)
    }

    /// Iterates entries in key order.
    pub fn iter<'g>(&self, guard: &'g RegistryGuard<'_, K, V>) -> btree_map::Iter<'g, K, V> {
        self.check_guard(guard);
        guard.entries.iter()
    }

    pub fn len(&self, guard: &RegistryGuard<'_, K, V>) -> usize {
        self.check_guard(guard);
        guard.entries.len()
    }

    pub fn clear(&self, guard: &mut RegistryGuard<'_, K, V>) {
        self.check_guard(guard);
        guard.entries.clear();
    }

    /// Moves every entry out of the registry, in key order.
    pub fn take_all(&self, guard: &mut RegistryGuard<'_, K, V>) -> Vec<(K, V)> {
        self.check_guard(guard);
        std::mem::take(&mut *guard.entries).into_iter().collect()
    }

    fn check_guard(&self, guard: &RegistryGuard<'_, K, V>) {
        assert!(
            std::ptr::eq(self, guard.owner),
            "registry: guard was acquired from a different registry"
        );
    }
}

impl<K: Ord, V> Default for Registry<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_all_leaves_registry_empty() {
        let registry = Registry::new();
        {
            let mut guard = registry.lock();
            registry.insert_or_assign(2u8, "b", &mut guard);
            registry.insert_or_assign(1u8, "a", &mut guard);

            let taken = registry.take_all(&mut guard);
            assert_eq!(taken, vec![(1, "a"), (2, "b")]);
        }
        assert!(registry.empty());
    }
}

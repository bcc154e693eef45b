//! Request-scoped memoization.
//!
//! A [`ScopedCache`] only remembers values while a scope is open. Scopes nest
//! by depth: entries survive until the outermost [`ScopeGuard`] drops, and are
//! discarded then even if the unit of work failed or panicked. Outside any
//! scope every lookup misses and every insert is dropped.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

struct ScopeState<K, V> {
    depth: usize,
    entries: HashMap<K, V>,
}

/// A key-value store that is active only inside an explicit scope.
pub struct ScopedCache<K, V> {
    state: Mutex<ScopeState<K, V>>,
}

impl<K, V> ScopedCache<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ScopeState {
                depth: 0,
                entries: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScopeState<K, V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens a scope. The returned guard closes it on drop.
    pub fn enter(&self) -> ScopeGuard<'_, K, V> {
        self.lock().depth += 1;
        ScopeGuard { cache: self }
    }

    pub fn is_active(&self) -> bool {
        self.lock().depth > 0
    }

    /// Returns the stored value for `key`, or `None` outside a scope.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let state = self.lock();
        if state.depth == 0 {
            return None;
        }
        state.entries.get(key).cloned()
    }

    /// Stores a value. A no-op outside a scope.
    pub fn insert(&self, key: K, value: V) {
        let mut state = self.lock();
        if state.depth > 0 {
            state.entries.insert(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn exit(&self) {
        let mut state = self.lock();
        state.depth = state.depth.saturating_sub(1);
        if state.depth == 0 {
            state.entries.clear();
        }
    }
}

impl<K: Eq + Hash, V> Default for ScopedCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Closes a [`ScopedCache`] scope when dropped.
#[must_use = "the scope closes as soon as the guard is dropped"]
pub struct ScopeGuard<'a, K: Eq + Hash, V> {
    cache: &'a ScopedCache<K, V>,
}

impl<K: Eq + Hash, V> Drop for ScopeGuard<'_, K, V> {
    fn drop(&mut self) {
        self.cache.exit();
    }
}

//! A bidirectional map.

use std::hash::Hash;

use ahash::AHashMap;
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MirrorError {
    #[error("Key is already mapped")]
    KeyPresent,
    #[error("Value is already mapped")]
    ValuePresent,
}

/// A one-to-one map that can be looked up from either side.
///
/// Both directions are owned by this type and only change together, so after every call
/// `get(k) == Some(v)` exactly when `get_key(v) == Some(k)`. Iteration follows insertion order.
#[derive(Clone, Debug)]
pub struct MirrorMap<K, V> {
    forward: IndexMap<K, V, ahash::RandomState>,
    backward: AHashMap<V, K>,
}

impl<K, V> Default for MirrorMap<K, V> {
    fn default() -> Self {
        MirrorMap {
            forward: IndexMap::default(),
            backward: AHashMap::default(),
        }
    }
}

impl<K, V> MirrorMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Hash + Eq + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `key` to `value`.
    ///
    /// Never replaces: if either side is already mapped, nothing changes and an error says
    /// which side collided.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), MirrorError> {
        if self.forward.contains_key(&key) {
            return Err(MirrorError::KeyPresent);
        }
        if self.backward.contains_key(&value) {
            return Err(MirrorError::ValuePresent);
        }
        self.backward.insert(value.clone(), key.clone());
        self.forward.insert(key, value);
        Ok(())
    }

    /// Unmaps `key`, returning the value it was mapped to.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.forward.shift_remove(key)?;
        self.backward.remove(&value);
        Some(value)
    }

    /// Unmaps `value`, returning the key it was mapped from.
    pub fn remove_value(&mut self, value: &V) -> Option<K> {
        let key = self.backward.remove(value)?;
        self.forward.shift_remove(&key);
        Some(key)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.forward.get(key)
    }

    pub fn get_key(&self, value: &V) -> Option<&K> {
        self.backward.get(value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.forward.contains_key(key)
    }

    pub fn contains_value(&self, value: &V) -> bool {
        self.backward.contains_key(value)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.forward.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.forward.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.forward.values()
    }

    pub fn clear(&mut self) {
        self.forward.clear();
        self.backward.clear();
    }
}

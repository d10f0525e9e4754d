//! Pending item set and the batches drained from it

use ahash::AHashMap;
use std::ops::Deref;

/// Items waiting for the next delivery, keyed by caller-chosen strings
///
/// Only the control loop touches this. A later upsert for an existing key
/// replaces the stored item in place.
#[derive(Debug)]
pub struct PendingSet<T> {
    items: AHashMap<String, T>,
}

impl<T> PendingSet<T> {
    pub fn new() -> Self {
        Self {
            items: AHashMap::new(),
        }
    }

    /// Insert or replace the item stored under `key`
    ///
    /// Returns the replaced item, if any.
    pub fn upsert(&mut self, key: String, item: T) -> Option<T> {
        self.items.insert(key, item)
    }

    /// Remove the item stored under `key`, if present
    pub fn remove(&mut self, key: &str) -> Option<T> {
        self.items.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Move every pending item into a fresh [`Batch`], leaving the set empty
    ///
    /// The batch owns its items outright; nothing done to the set afterwards
    /// can reach it.
    pub fn drain(&mut self) -> Batch<T> {
        let items = std::mem::take(&mut self.items);
        Batch {
            items: items.into_values().collect(),
        }
    }
}

impl<T> Default for PendingSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of pending items handed to one callback invocation
///
/// Item order is unspecified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch<T> {
    items: Vec<T>,
}

impl<T> Batch<T> {
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> From<Vec<T>> for Batch<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> Deref for Batch<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> IntoIterator for Batch<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

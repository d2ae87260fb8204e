// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Bounded storage for objects that are expensive to load or derive.
//!
//! Each [`SlotStore`] has a fixed number of slots. Once all slots are in use,
//! a new object replaces the one in the slot after the most recently filled
//! slot, regardless of how recently the evicted object was used. Lookups go
//! through a hash map from key to slot.

mod error;

pub use error::CacheError;

use std::{collections::HashMap, fmt::Debug, hash::Hash, rc::Rc};

use log::{debug, trace};

/// What a full [`SlotStore`] does when asked to store another object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    /// Replace the object in the next round-robin slot.
    Evict,

    /// Refuse to store the object.
    Fail,
}

pub struct SlotStore<K, V> {
    /// What is being stored, for messages (e.g. "images").
    kind: &'static str,
    capacity: usize,
    overflow: Overflow,
    slots: Vec<(K, Rc<V>)>,
    index: HashMap<K, usize>,
    /// The most recently filled slot.
    cursor: usize,
}

impl<K: Hash + Eq + Clone + Debug, V> SlotStore<K, V> {
    pub fn new(kind: &'static str, capacity: usize, overflow: Overflow) -> SlotStore<K, V> {
        SlotStore {
            kind,
            capacity,
            overflow,
            slots: Vec::new(),
            index: HashMap::new(),
            cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of filled slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<Rc<V>> {
        self.index.get(key).map(|&i| Rc::clone(&self.slots[i].1))
    }

    /// The slot currently holding `key`.
    pub fn slot_of(&self, key: &K) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Store `value` under `key`. If `key` is already present, the new value
    /// gets its own slot and lookups of `key` resolve to it from now on.
    pub fn insert(&mut self, key: K, value: V) -> Result<Rc<V>, CacheError> {
        let value = Rc::new(value);
        if self.slots.len() < self.capacity {
            self.cursor = self.slots.len();
            self.slots.push((key.clone(), Rc::clone(&value)));
        } else {
            if self.overflow == Overflow::Fail || self.capacity == 0 {
                return Err(CacheError::Full {
                    kind: self.kind,
                    capacity: self.capacity,
                });
            }
            self.cursor = (self.cursor + 1) % self.capacity;
            let (old_key, _) = std::mem::replace(
                &mut self.slots[self.cursor],
                (key.clone(), Rc::clone(&value)),
            );
            debug!("Evicting {old_key:?} from the {} storage", self.kind);
            // A key that was stored again later lives in another slot.
            if self.index.get(&old_key) == Some(&self.cursor) {
                self.index.remove(&old_key);
            }
        }
        trace!("Stored {key:?} in slot {} of the {} storage", self.cursor, self.kind);
        self.index.insert(key, self.cursor);
        Ok(value)
    }

    /// Return the object stored under `key`, or create it with `load` and
    /// store it.
    pub fn get_or_try_insert_with<E, F>(&mut self, key: &K, load: F) -> Result<Rc<V>, E>
    where
        E: From<CacheError>,
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(v) = self.get(key) {
            return Ok(v);
        }
        let value = load()?;
        Ok(self.insert(key.clone(), value)?)
    }
}

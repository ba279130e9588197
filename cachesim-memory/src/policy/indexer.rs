//  Copyright 2024 cachesim Project Authors
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

use cachesim_common::{code::Key, error::Error, error::Result, request::Stored, strict_assert};
use hashbrown::HashMap;

/// An indexed entry: the stored object plus the policy-specific bookkeeping.
#[derive(Debug)]
pub struct Slot<K, T> {
    /// The stored object.
    pub stored: Stored<K>,
    /// Policy-specific bookkeeping.
    pub ext: T,
}

/// Key index shared by the policies. Tracks the occupied bytes alongside the entries.
#[derive(Debug)]
pub struct Indexer<K, T> {
    table: HashMap<K, Slot<K, T>>,
    occupancy: usize,
}

impl<K, T> Default for Indexer<K, T>
where
    K: Key,
{
    fn default() -> Self {
        Self {
            table: HashMap::new(),
            occupancy: 0,
        }
    }
}

impl<K, T> Indexer<K, T>
where
    K: Key,
{
    /// Insert a new slot. Fails if the key is already indexed.
    pub fn insert(&mut self, stored: Stored<K>, ext: T) -> Result<()> {
        if self.table.contains_key(stored.key()) {
            return Err(Error::contract_violation(format!(
                "store of {:?} which is already present",
                stored.key()
            )));
        }
        self.occupancy += stored.size();
        self.table.insert(stored.key().clone(), Slot { stored, ext });
        Ok(())
    }

    /// Remove the slot of `key`.
    pub fn remove(&mut self, key: &K) -> Option<Slot<K, T>> {
        let slot = self.table.remove(key)?;
        strict_assert!(self.occupancy >= slot.stored.size());
        self.occupancy -= slot.stored.size();
        Some(slot)
    }

    /// Get the slot of `key`.
    pub fn get(&self, key: &K) -> Option<&Slot<K, T>> {
        self.table.get(key)
    }

    /// Get the mutable slot of `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut Slot<K, T>> {
        self.table.get_mut(key)
    }

    /// Returns `true` if `key` is indexed.
    pub fn contains(&self, key: &K) -> bool {
        self.table.contains_key(key)
    }

    /// Iterate all slots in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Slot<K, T>> {
        self.table.values()
    }

    /// Total bytes of the indexed entries.
    pub fn occupancy(&self) -> usize {
        self.occupancy
    }

    /// Count of the indexed entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

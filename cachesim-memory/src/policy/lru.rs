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

use cachesim_common::{
    code::Key,
    error::{Error, Result},
    removable_queue::{RemovableQueue, Token},
    request::Stored,
};
use serde::{Deserialize, Serialize};

use super::{indexer::Indexer, Context, Policy};
use crate::watermark::Watermark;

/// Lru eviction algorithm config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LruConfig {}

/// Least-recently-used policy.
///
/// Every lookup of a stored key moves it to the tail of the recency queue. Evicts from the head.
#[derive(Debug)]
pub struct Lru<K>
where
    K: Key,
{
    indexer: Indexer<K, Token>,
    queue: RemovableQueue<K>,

    capacity: usize,
    watermark: Watermark,
}

impl<K> Policy for Lru<K>
where
    K: Key,
{
    type Key = K;
    type Config = LruConfig;

    fn new(capacity: usize, watermark: Watermark, _: Self::Config) -> Result<Self> {
        Ok(Self {
            indexer: Indexer::default(),
            queue: RemovableQueue::new(),
            capacity,
            watermark,
        })
    }

    fn lookup(&mut self, key: &K) -> Option<&Stored<K>> {
        let slot = self.indexer.get_mut(key)?;
        self.queue.remove(slot.ext);
        slot.ext = self.queue.push(key.clone());
        Some(&slot.stored)
    }

    fn store(&mut self, stored: Stored<K>, _: &Context) -> Result<()> {
        if self.indexer.contains(stored.key()) {
            return Err(Error::contract_violation(format!(
                "store of {:?} which is already present",
                stored.key()
            )));
        }
        let token = self.queue.push(stored.key().clone());
        self.indexer.insert(stored, token)
    }

    fn evict(&mut self, _: &Context) -> Result<Stored<K>> {
        let key = self
            .queue
            .pop()
            .ok_or_else(|| Error::contract_violation("evict on an empty lru"))?;
        self.indexer
            .remove(&key)
            .map(|slot| slot.stored)
            .ok_or_else(|| Error::contract_violation(format!("lru queue holds unindexed key {key:?}")))
    }

    fn remove(&mut self, key: &K) -> Option<Stored<K>> {
        let slot = self.indexer.remove(key)?;
        self.queue.remove(slot.ext);
        Some(slot.stored)
    }

    fn occupancy(&self) -> usize {
        self.indexer.occupancy()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn len(&self) -> usize {
        self.indexer.len()
    }

    fn watermark(&self) -> Watermark {
        self.watermark
    }
}

impl<K> Lru<K>
where
    K: Key,
{
    /// Keys from the least to the most recently used.
    pub fn dump(&self) -> Vec<K> {
        self.queue.iter().cloned().collect()
    }
}

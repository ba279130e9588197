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

use std::{cmp::Reverse, sync::Arc};

use cachesim_common::{
    code::Key,
    error::{Error, Result},
    request::Stored,
};
use hashbrown::HashMap;

use super::{indexer::Indexer, Context, Policy};
use crate::watermark::Watermark;

/// Positions of every key in the future request sequence.
#[derive(Debug)]
struct Oracle<K> {
    len: usize,
    occurrences: HashMap<K, Vec<usize>>,
}

impl<K> Oracle<K>
where
    K: Key,
{
    /// Position of the first occurrence of `key` at or after `position`.
    fn next_occurrence(&self, key: &K, position: usize) -> Option<usize> {
        let occurrences = self.occurrences.get(key)?;
        let index = occurrences.partition_point(|&p| p < position);
        occurrences.get(index).copied()
    }
}

/// Belady eviction algorithm config.
///
/// Carries the whole future request sequence, by key, in trace order.
#[derive(Debug, Clone)]
pub struct BeladyConfig<K> {
    oracle: Arc<Oracle<K>>,
}

impl<K> BeladyConfig<K>
where
    K: Key,
{
    /// Build the config from the keys of the trace that is going to be replayed, in order.
    pub fn new(future: impl IntoIterator<Item = K>) -> Self {
        let mut occurrences: HashMap<K, Vec<usize>> = HashMap::new();
        let mut len = 0;
        for (position, key) in future.into_iter().enumerate() {
            occurrences.entry(key).or_default().push(position);
            len = position + 1;
        }
        Self {
            oracle: Arc::new(Oracle { len, occurrences }),
        }
    }

    /// Length of the future request sequence.
    pub fn len(&self) -> usize {
        self.oracle.len
    }

    /// Returns `true` if the future request sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Offline-optimal policy.
///
/// Evicts the entry whose next reference lies farthest in the future, starting at the position of the request being
/// processed. Entries never referenced again are treated as infinitely far and go first; ties are broken by evicting
/// the oldest inserted entry.
///
/// It needs oracle knowledge of the trace, so it only serves as a benchmark for the online policies.
#[derive(Debug)]
pub struct Belady<K>
where
    K: Key,
{
    indexer: Indexer<K, u64>,
    oracle: Arc<Oracle<K>>,
    seq: u64,

    capacity: usize,
    watermark: Watermark,
}

impl<K> Belady<K>
where
    K: Key,
{
    /// Position of the next reference of `key` at or after `position`, if any.
    pub fn next_occurrence(&self, key: &K, position: usize) -> Option<usize> {
        self.oracle.next_occurrence(key, position)
    }
}

impl<K> Policy for Belady<K>
where
    K: Key,
{
    type Key = K;
    type Config = BeladyConfig<K>;

    fn new(capacity: usize, watermark: Watermark, config: Self::Config) -> Result<Self> {
        Ok(Self {
            indexer: Indexer::default(),
            oracle: config.oracle,
            seq: 0,
            capacity,
            watermark,
        })
    }

    fn lookup(&mut self, key: &K) -> Option<&Stored<K>> {
        self.indexer.get(key).map(|slot| &slot.stored)
    }

    fn store(&mut self, stored: Stored<K>, _: &Context) -> Result<()> {
        let seq = self.seq;
        self.seq += 1;
        self.indexer.insert(stored, seq)
    }

    fn evict(&mut self, context: &Context) -> Result<Stored<K>> {
        let victim = self
            .indexer
            .iter()
            .max_by_key(|slot| {
                let next = self
                    .oracle
                    .next_occurrence(slot.stored.key(), context.position)
                    .unwrap_or(usize::MAX);
                (next, Reverse(slot.ext))
            })
            .map(|slot| slot.stored.key().clone())
            .ok_or_else(|| Error::contract_violation("evict on an empty belady"))?;
        self.indexer
            .remove(&victim)
            .map(|slot| slot.stored)
            .ok_or_else(|| Error::contract_violation(format!("belady lost key {victim:?}")))
    }

    fn remove(&mut self, key: &K) -> Option<Stored<K>> {
        self.indexer.remove(key).map(|slot| slot.stored)
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

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

use std::collections::BTreeMap;

use cachesim_common::{
    code::Key,
    error::{Error, Result},
    request::Stored,
};
use serde::{Deserialize, Serialize};

use super::{indexer::Indexer, Context, Policy};
use crate::watermark::Watermark;

/// Lfu eviction algorithm config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LfuConfig {}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Frequency {
    count: u64,
    /// Insertion sequence, breaks ties between equal counts.
    seq: u64,
}

/// Least-frequently-used policy.
///
/// Each stored entry carries an access counter that starts at zero and is incremented by every lookup hit. Evicts
/// the entry with the lowest counter; among equal counters the oldest inserted entry goes first.
///
/// Freshly admitted entries start at zero and are therefore the first eviction candidates until accessed again.
#[derive(Debug)]
pub struct Lfu<K>
where
    K: Key,
{
    indexer: Indexer<K, Frequency>,
    /// `(count, seq)` ordered from the next victim.
    ranking: BTreeMap<(u64, u64), K>,
    seq: u64,

    capacity: usize,
    watermark: Watermark,
}

impl<K> Lfu<K>
where
    K: Key,
{
    /// Access counter of a stored key.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.indexer.get(key).map(|slot| slot.ext.count)
    }

    /// Keys from the next to evict to the last.
    pub fn dump(&self) -> Vec<K> {
        self.ranking.values().cloned().collect()
    }

    pub(crate) fn insert(&mut self, stored: Stored<K>, count: u64) -> Result<()> {
        if self.indexer.contains(stored.key()) {
            return Err(Error::contract_violation(format!(
                "store of {:?} which is already present",
                stored.key()
            )));
        }
        let seq = self.seq;
        self.seq += 1;
        self.ranking.insert((count, seq), stored.key().clone());
        self.indexer.insert(stored, Frequency { count, seq })
    }

    pub(crate) fn pop_least(&mut self) -> Result<(Stored<K>, u64)> {
        let (_, key) = self
            .ranking
            .pop_first()
            .ok_or_else(|| Error::contract_violation("evict on an empty lfu"))?;
        self.indexer
            .remove(&key)
            .map(|slot| (slot.stored, slot.ext.count))
            .ok_or_else(|| Error::contract_violation(format!("lfu ranking holds unindexed key {key:?}")))
    }

    pub(crate) fn take(&mut self, key: &K) -> Option<(Stored<K>, u64)> {
        let slot = self.indexer.remove(key)?;
        self.ranking.remove(&(slot.ext.count, slot.ext.seq));
        Some((slot.stored, slot.ext.count))
    }
}

impl<K> Policy for Lfu<K>
where
    K: Key,
{
    type Key = K;
    type Config = LfuConfig;

    fn new(capacity: usize, watermark: Watermark, _: Self::Config) -> Result<Self> {
        Ok(Self {
            indexer: Indexer::default(),
            ranking: BTreeMap::new(),
            seq: 0,
            capacity,
            watermark,
        })
    }

    fn lookup(&mut self, key: &K) -> Option<&Stored<K>> {
        let slot = self.indexer.get_mut(key)?;
        let Frequency { count, seq } = slot.ext;
        if let Some(key) = self.ranking.remove(&(count, seq)) {
            self.ranking.insert((count + 1, seq), key);
        }
        slot.ext.count += 1;
        Some(&slot.stored)
    }

    fn store(&mut self, stored: Stored<K>, _: &Context) -> Result<()> {
        self.insert(stored, 0)
    }

    fn evict(&mut self, _: &Context) -> Result<Stored<K>> {
        self.pop_least().map(|(stored, _)| stored)
    }

    fn remove(&mut self, key: &K) -> Option<Stored<K>> {
        self.take(key).map(|(stored, _)| stored)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::test_utils::{ctx, stored};

    #[test]
    fn test_lfu() {
        let mut lfu = Lfu::<u64>::new(100, Watermark::default(), LfuConfig {}).unwrap();

        for i in 0..4 {
            lfu.store(stored(i, 1), &ctx(i as usize)).unwrap();
        }
        for _ in 0..3 {
            lfu.lookup(&0);
        }
        lfu.lookup(&1);
        lfu.lookup(&3);

        assert_eq!(lfu.frequency(&0), Some(3));
        assert_eq!(lfu.frequency(&2), Some(0));
        assert_eq!(lfu.dump(), vec![2, 1, 3, 0]);

        assert_eq!(lfu.evict(&ctx(4)).unwrap().key(), &2);
        // 1 and 3 tie, 1 was inserted first.
        assert_eq!(lfu.evict(&ctx(4)).unwrap().key(), &1);

        // A fresh entry starts at zero and becomes the next victim.
        lfu.store(stored(4, 1), &ctx(5)).unwrap();
        assert_eq!(lfu.evict(&ctx(6)).unwrap().key(), &4);

        assert_eq!(lfu.remove(&3).unwrap().key(), &3);
        assert_eq!(lfu.dump(), vec![0]);
        assert_eq!(lfu.occupancy(), 1);
    }

    #[test]
    fn test_lfu_reinsert_restarts_at_zero() {
        let mut lfu = Lfu::<u64>::new(100, Watermark::default(), LfuConfig {}).unwrap();
        lfu.store(stored(1, 1), &ctx(0)).unwrap();
        lfu.lookup(&1);
        lfu.lookup(&1);
        assert_eq!(lfu.evict(&ctx(1)).unwrap().key(), &1);

        lfu.store(stored(1, 1), &ctx(2)).unwrap();
        assert_eq!(lfu.frequency(&1), Some(0));
        assert!(matches!(lfu.evict(&ctx(3)), Ok(_)));
        assert!(matches!(lfu.evict(&ctx(3)), Err(Error::ContractViolation(_))));
    }
}

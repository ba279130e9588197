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

use cachesim_common::{code::Key, error::Result, request::Stored};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::{
    lfu::{Lfu, LfuConfig},
    Context, Policy,
};
use crate::watermark::Watermark;

/// Global lfu eviction algorithm config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalLfuConfig {}

/// Lfu that remembers the access counter of evicted entries.
///
/// An object re-admitted after an eviction resumes from its historical counter instead of restarting at zero. The
/// ledger of evicted keys is unbounded.
#[derive(Debug)]
pub struct GlobalLfu<K>
where
    K: Key,
{
    lfu: Lfu<K>,
    ledger: HashMap<K, u64>,
}

impl<K> GlobalLfu<K>
where
    K: Key,
{
    /// Lifetime access counter of a key, stored or not.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.lfu.frequency(key).or_else(|| self.ledger.get(key).copied())
    }

    /// Count of keys remembered after eviction.
    pub fn ledger_len(&self) -> usize {
        self.ledger.len()
    }
}

impl<K> Policy for GlobalLfu<K>
where
    K: Key,
{
    type Key = K;
    type Config = GlobalLfuConfig;

    fn new(capacity: usize, watermark: Watermark, _: Self::Config) -> Result<Self> {
        Ok(Self {
            lfu: Lfu::new(capacity, watermark, LfuConfig {})?,
            ledger: HashMap::new(),
        })
    }

    fn lookup(&mut self, key: &K) -> Option<&Stored<K>> {
        self.lfu.lookup(key)
    }

    fn store(&mut self, stored: Stored<K>, _: &Context) -> Result<()> {
        let count = self.ledger.get(stored.key()).copied().unwrap_or_default();
        let key = stored.key().clone();
        self.lfu.insert(stored, count)?;
        self.ledger.remove(&key);
        Ok(())
    }

    fn evict(&mut self, _: &Context) -> Result<Stored<K>> {
        let (stored, count) = self.lfu.pop_least()?;
        self.ledger.insert(stored.key().clone(), count);
        Ok(stored)
    }

    fn remove(&mut self, key: &K) -> Option<Stored<K>> {
        let (stored, count) = self.lfu.take(key)?;
        self.ledger.insert(key.clone(), count);
        Some(stored)
    }

    fn occupancy(&self) -> usize {
        self.lfu.occupancy()
    }

    fn capacity(&self) -> usize {
        self.lfu.capacity()
    }

    fn len(&self) -> usize {
        self.lfu.len()
    }

    fn watermark(&self) -> Watermark {
        self.lfu.watermark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::test_utils::{ctx, stored};

    #[test]
    fn test_global_lfu_resumes_frequency() {
        let mut lfu = GlobalLfu::<u64>::new(100, Watermark::default(), GlobalLfuConfig {}).unwrap();

        lfu.store(stored(1, 1), &ctx(0)).unwrap();
        lfu.store(stored(2, 1), &ctx(1)).unwrap();
        for _ in 0..5 {
            lfu.lookup(&1);
        }
        lfu.lookup(&2);

        assert_eq!(lfu.evict(&ctx(2)).unwrap().key(), &2);
        assert_eq!(lfu.evict(&ctx(2)).unwrap().key(), &1);
        assert_eq!(lfu.ledger_len(), 2);
        assert_eq!(lfu.frequency(&1), Some(5));

        // 1 comes back with its history, 3 is brand new.
        lfu.store(stored(1, 1), &ctx(3)).unwrap();
        lfu.store(stored(3, 1), &ctx(4)).unwrap();
        assert_eq!(lfu.frequency(&1), Some(5));
        assert_eq!(lfu.frequency(&3), Some(0));
        assert_eq!(lfu.ledger_len(), 1);

        assert_eq!(lfu.evict(&ctx(5)).unwrap().key(), &3);
        assert_eq!(lfu.evict(&ctx(5)).unwrap().key(), &1);
    }

    #[test]
    fn test_global_lfu_remove_keeps_history() {
        let mut lfu = GlobalLfu::<u64>::new(100, Watermark::default(), GlobalLfuConfig {}).unwrap();
        lfu.store(stored(1, 1), &ctx(0)).unwrap();
        lfu.lookup(&1);
        lfu.lookup(&1);
        assert!(lfu.remove(&1).is_some());
        assert_eq!(lfu.frequency(&1), Some(2));

        lfu.store(stored(1, 1), &ctx(1)).unwrap();
        lfu.lookup(&1);
        assert_eq!(lfu.frequency(&1), Some(3));
    }
}

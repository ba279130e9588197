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
    request::{Fetched, Stored},
};
use serde::{Deserialize, Serialize};

use super::{
    fifo::{Fifo, FifoConfig},
    Context, Policy,
};
use crate::watermark::Watermark;

/// Size-protected fifo config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectedFifoConfig {
    /// Largest admitted object, as a fraction of the total capacity.
    ///
    /// Must be in (0, 1].
    pub limit_fraction: f64,
}

impl Default for ProtectedFifoConfig {
    fn default() -> Self {
        Self { limit_fraction: 0.1 }
    }
}

/// Fifo that refuses objects larger than a fraction of the capacity, so one large object cannot displace many
/// small ones on a single insert.
#[derive(Debug)]
pub struct ProtectedFifo<K>
where
    K: Key,
{
    fifo: Fifo<K>,
    limit: f64,
}

impl<K> ProtectedFifo<K>
where
    K: Key,
{
    /// Largest admitted object size in bytes.
    pub fn limit(&self) -> f64 {
        self.limit
    }
}

impl<K> Policy for ProtectedFifo<K>
where
    K: Key,
{
    type Key = K;
    type Config = ProtectedFifoConfig;

    fn new(capacity: usize, watermark: Watermark, config: Self::Config) -> Result<Self> {
        if !(config.limit_fraction > 0.0 && config.limit_fraction <= 1.0) {
            return Err(Error::config(format!(
                "limit_fraction must be in (0, 1], given: {}",
                config.limit_fraction
            )));
        }
        Ok(Self {
            fifo: Fifo::new(capacity, watermark, FifoConfig {})?,
            limit: capacity as f64 * config.limit_fraction,
        })
    }

    fn lookup(&mut self, key: &K) -> Option<&Stored<K>> {
        self.fifo.lookup(key)
    }

    fn admit(&self, fetched: &Fetched<K>) -> bool {
        fetched.size() as f64 <= self.limit
    }

    fn store(&mut self, stored: Stored<K>, context: &Context) -> Result<()> {
        self.fifo.store(stored, context)
    }

    fn evict(&mut self, context: &Context) -> Result<Stored<K>> {
        self.fifo.evict(context)
    }

    fn remove(&mut self, key: &K) -> Option<Stored<K>> {
        self.fifo.remove(key)
    }

    fn occupancy(&self) -> usize {
        self.fifo.occupancy()
    }

    fn capacity(&self) -> usize {
        self.fifo.capacity()
    }

    fn len(&self) -> usize {
        self.fifo.len()
    }

    fn watermark(&self) -> Watermark {
        self.fifo.watermark()
    }
}

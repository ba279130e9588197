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

use cachesim_common::{code::Key, error::Result, outcome::Served, request::Request};

use crate::{
    engine::CacheEngine,
    policy::{
        belady::{Belady, BeladyConfig},
        fifo::{Fifo, FifoConfig},
        global_lfu::{GlobalLfu, GlobalLfuConfig},
        lfu::{Lfu, LfuConfig},
        lru::{Lru, LruConfig},
        noop::{Noop, NoopConfig},
        protected_fifo::{ProtectedFifo, ProtectedFifoConfig},
    },
    watermark::Watermark,
};

/// Cache engine with the fifo policy.
pub type FifoCache<K> = CacheEngine<Fifo<K>>;
/// Cache engine with the size-protected fifo policy.
pub type ProtectedFifoCache<K> = CacheEngine<ProtectedFifo<K>>;
/// Cache engine with the lru policy.
pub type LruCache<K> = CacheEngine<Lru<K>>;
/// Cache engine with the lfu policy.
pub type LfuCache<K> = CacheEngine<Lfu<K>>;
/// Cache engine with the global lfu policy.
pub type GlobalLfuCache<K> = CacheEngine<GlobalLfu<K>>;
/// Cache engine with the belady policy.
pub type BeladyCache<K> = CacheEngine<Belady<K>>;
/// Cache engine with the noop policy.
pub type NoopCache<K> = CacheEngine<Noop<K>>;

/// Eviction algorithm config, selects the policy of a [`Cache`].
#[derive(Debug, Clone)]
pub enum EvictionConfig<K> {
    /// First-in first-out.
    Fifo(FifoConfig),
    /// First-in first-out with size-protected admission.
    ProtectedFifo(ProtectedFifoConfig),
    /// Least-recently-used.
    Lru(LruConfig),
    /// Least-frequently-used.
    Lfu(LfuConfig),
    /// Least-frequently-used with lifetime counters.
    GlobalLfu(GlobalLfuConfig),
    /// Offline-optimal.
    Belady(BeladyConfig<K>),
    /// No caching at all.
    Noop(NoopConfig),
}

impl<K> From<FifoConfig> for EvictionConfig<K> {
    fn from(value: FifoConfig) -> Self {
        Self::Fifo(value)
    }
}

impl<K> From<ProtectedFifoConfig> for EvictionConfig<K> {
    fn from(value: ProtectedFifoConfig) -> Self {
        Self::ProtectedFifo(value)
    }
}

impl<K> From<LruConfig> for EvictionConfig<K> {
    fn from(value: LruConfig) -> Self {
        Self::Lru(value)
    }
}

impl<K> From<LfuConfig> for EvictionConfig<K> {
    fn from(value: LfuConfig) -> Self {
        Self::Lfu(value)
    }
}

impl<K> From<GlobalLfuConfig> for EvictionConfig<K> {
    fn from(value: GlobalLfuConfig) -> Self {
        Self::GlobalLfu(value)
    }
}

impl<K> From<BeladyConfig<K>> for EvictionConfig<K> {
    fn from(value: BeladyConfig<K>) -> Self {
        Self::Belady(value)
    }
}

impl<K> From<NoopConfig> for EvictionConfig<K> {
    fn from(value: NoopConfig) -> Self {
        Self::Noop(value)
    }
}

impl<K> EvictionConfig<K> {
    /// Short name of the selected policy.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fifo(_) => "fifo",
            Self::ProtectedFifo(_) => "protected-fifo",
            Self::Lru(_) => "lru",
            Self::Lfu(_) => "lfu",
            Self::GlobalLfu(_) => "global-lfu",
            Self::Belady(_) => "belady",
            Self::Noop(_) => "noop",
        }
    }
}

/// A cache engine whose policy is selected at runtime.
#[derive(Debug)]
pub enum Cache<K>
where
    K: Key,
{
    /// First-in first-out.
    Fifo(FifoCache<K>),
    /// First-in first-out with size-protected admission.
    ProtectedFifo(ProtectedFifoCache<K>),
    /// Least-recently-used.
    Lru(LruCache<K>),
    /// Least-frequently-used.
    Lfu(LfuCache<K>),
    /// Least-frequently-used with lifetime counters.
    GlobalLfu(GlobalLfuCache<K>),
    /// Offline-optimal.
    Belady(BeladyCache<K>),
    /// No caching at all.
    Noop(NoopCache<K>),
}

macro_rules! dispatch {
    ($cache:expr, $engine:ident => $body:expr) => {
        match $cache {
            Cache::Fifo($engine) => $body,
            Cache::ProtectedFifo($engine) => $body,
            Cache::Lru($engine) => $body,
            Cache::Lfu($engine) => $body,
            Cache::GlobalLfu($engine) => $body,
            Cache::Belady($engine) => $body,
            Cache::Noop($engine) => $body,
        }
    };
}

impl<K> Cache<K>
where
    K: Key,
{
    /// Process a single request. See [`CacheEngine::process`].
    pub fn process(&mut self, request: Request<K>) -> Result<Served<K>> {
        dispatch!(self, engine => engine.process(request))
    }

    /// Lazily process every request in order. See [`CacheEngine::process_all`].
    pub fn process_all<'a, I>(&'a mut self, requests: I) -> impl Iterator<Item = Result<Served<K>>> + 'a
    where
        I: IntoIterator<Item = Request<K>>,
        I::IntoIter: 'a,
    {
        requests.into_iter().map(move |request| self.process(request))
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> usize {
        dispatch!(self, engine => engine.capacity())
    }

    /// Occupied bytes.
    pub fn occupancy(&self) -> usize {
        dispatch!(self, engine => engine.occupancy())
    }

    /// Occupied fraction of the capacity.
    pub fn occupancy_fraction(&self) -> f64 {
        dispatch!(self, engine => engine.occupancy_fraction())
    }

    /// Count of processed requests.
    pub fn position(&self) -> usize {
        dispatch!(self, engine => engine.position())
    }
}

/// Builder of a [`Cache`].
#[derive(Debug, Clone)]
pub struct CacheBuilder<K> {
    capacity: usize,
    watermark: Watermark,
    eviction_config: EvictionConfig<K>,
}

impl<K> CacheBuilder<K>
where
    K: Key,
{
    /// Start building a cache of `capacity` bytes.
    ///
    /// Defaults to a fifo policy with the default watermarks.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            watermark: Watermark::default(),
            eviction_config: FifoConfig {}.into(),
        }
    }

    /// Set the eviction thresholds.
    ///
    /// The default value is 0.90 / 0.95.
    pub fn with_watermark(mut self, watermark: Watermark) -> Self {
        self.watermark = watermark;
        self
    }

    /// Set the eviction algorithm.
    pub fn with_eviction_config(mut self, eviction_config: impl Into<EvictionConfig<K>>) -> Self {
        self.eviction_config = eviction_config.into();
        self
    }

    /// Build the cache with the given configuration.
    pub fn build(self) -> Result<Cache<K>> {
        let (capacity, watermark) = (self.capacity, self.watermark);
        let cache = match self.eviction_config {
            EvictionConfig::Fifo(config) => Cache::Fifo(CacheEngine::with_config(capacity, watermark, config)?),
            EvictionConfig::ProtectedFifo(config) => {
                Cache::ProtectedFifo(CacheEngine::with_config(capacity, watermark, config)?)
            }
            EvictionConfig::Lru(config) => Cache::Lru(CacheEngine::with_config(capacity, watermark, config)?),
            EvictionConfig::Lfu(config) => Cache::Lfu(CacheEngine::with_config(capacity, watermark, config)?),
            EvictionConfig::GlobalLfu(config) => {
                Cache::GlobalLfu(CacheEngine::with_config(capacity, watermark, config)?)
            }
            EvictionConfig::Belady(config) => Cache::Belady(CacheEngine::with_config(capacity, watermark, config)?),
            EvictionConfig::Noop(config) => Cache::Noop(CacheEngine::with_config(capacity, watermark, config)?),
        };
        Ok(cache)
    }
}

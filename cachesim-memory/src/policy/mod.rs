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

use std::fmt::Debug;

use cachesim_common::{
    code::Key,
    error::Result,
    request::{Fetched, Stored, Timestamp},
};

use crate::watermark::Watermark;

/// Engine-supplied context for the mutating policy operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Context {
    /// Current simulation time.
    pub now: Timestamp,
    /// Zero-based index of the request being processed within the run.
    pub position: usize,
}

/// Cache policy.
///
/// A policy owns the cache index and decides what enters and what leaves. The engine drives it with a fixed
/// protocol:
///
/// 1. `lookup` the requested key.
/// 2. On a miss, `admit` the fetched object.
/// 3. If admitted, `evict` while over the high watermark until under the low watermark, then `store`.
///
/// `lookup` may update bookkeeping (recency, frequency) but must not remove entries. Expired entries stay until the
/// engine `remove`s them on refetch or until they are evicted.
pub trait Policy: Send + Sync + 'static {
    /// Key type of the cached objects.
    type Key: Key;
    /// Policy config.
    type Config: Clone + Debug + Send + Sync + 'static;

    /// Create a new policy with the given byte capacity.
    fn new(capacity: usize, watermark: Watermark, config: Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// Find the stored entry for `key`, expired or not.
    fn lookup(&mut self, key: &Self::Key) -> Option<&Stored<Self::Key>>;

    /// Decide whether a fetched object may enter the cache.
    ///
    /// The engine has already checked that the object is cacheable and no larger than the capacity.
    fn admit(&self, fetched: &Fetched<Self::Key>) -> bool {
        let _ = fetched;
        true
    }

    /// Insert a new entry.
    ///
    /// Storing a key that is already present is a contract violation.
    fn store(&mut self, stored: Stored<Self::Key>, context: &Context) -> Result<()>;

    /// Remove exactly one entry chosen by the policy ranking and return it.
    ///
    /// Evicting from an empty policy is a contract violation.
    fn evict(&mut self, context: &Context) -> Result<Stored<Self::Key>>;

    /// Remove the entry of `key` if present.
    fn remove(&mut self, key: &Self::Key) -> Option<Stored<Self::Key>>;

    /// Total bytes of the stored entries.
    fn occupancy(&self) -> usize;

    /// Capacity in bytes.
    fn capacity(&self) -> usize;

    /// Count of stored entries.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Eviction thresholds.
    fn watermark(&self) -> Watermark;

    /// Returns `true` if eviction should be triggered.
    fn over_high_watermark(&self) -> bool {
        self.watermark().is_over_high(self.occupancy(), self.capacity())
    }

    /// Returns `true` if eviction may stop.
    fn under_low_watermark(&self) -> bool {
        self.watermark().is_under_low(self.occupancy(), self.capacity())
    }
}

/// Offline optimal eviction driven by the future key sequence.
pub mod belady;
/// First-in first-out eviction.
pub mod fifo;
/// LFU whose counts outlive eviction.
pub mod global_lfu;
/// Key index shared by the policies.
pub mod indexer;
/// Least-frequently-used eviction.
pub mod lfu;
/// Least-recently-used eviction.
pub mod lru;
/// A policy that caches nothing.
pub mod noop;
/// FIFO that refuses objects above a fraction of the capacity.
pub mod protected_fifo;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

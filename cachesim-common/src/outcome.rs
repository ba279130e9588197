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

use serde::{Deserialize, Serialize};

use crate::request::{Fetched, Timestamp};

/// Outcome of a single request against the cache.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// Served from cache. `age` is the elapsed time since the cached copy was stored.
    Hit {
        /// Elapsed time since the cached copy was stored.
        age: Timestamp,
    },
    /// Fetched from origin and stored.
    Miss,
    /// Fetched from origin and not stored.
    Pass,
}

impl Outcome {
    /// Returns `true` if the request was served from cache.
    pub fn is_hit(&self) -> bool {
        matches!(self, Outcome::Hit { .. })
    }

    /// Returns `true` if the request was fetched and stored.
    pub fn is_miss(&self) -> bool {
        matches!(self, Outcome::Miss)
    }

    /// Returns `true` if the request bypassed the cache.
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }
}

/// A served request together with its outcome.
///
/// On a hit, `request` is a copy of the stored object reissued at the current access time.
#[derive(Debug, Clone)]
pub struct Served<K> {
    /// The served object.
    pub request: Fetched<K>,
    /// How it was served.
    pub outcome: Outcome,
}

impl<K> Served<K> {
    /// Bytes delivered to the client for this request.
    pub fn bytes(&self) -> usize {
        self.request.size()
    }
}

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

use std::{fmt::Write, ops::RangeInclusive};

use cachesim_common::{
    error::{Error, Result},
    request::{Request, Timestamp},
};
use rand::{rngs::StdRng, Rng, RngCore};

use crate::Timeline;

/// Issues objects with random keys and random metadata.
///
/// Keys are `hash_len` random bytes rendered as lowercase hex without leading zeros, so repeats are rare unless the
/// hash is short.
#[derive(Debug)]
pub struct RandomSource {
    rng: StdRng,
    hash_len: usize,
    size: RangeInclusive<usize>,
    max_age: RangeInclusive<i64>,
    count: usize,
    timeline: Timeline,
    issued: usize,
}

impl RandomSource {
    /// Start building a source of `count` requests.
    pub fn builder(count: usize) -> RandomSourceBuilder {
        RandomSourceBuilder::new(count)
    }

    fn key(&mut self) -> String {
        let mut bytes = vec![0u8; self.hash_len];
        self.rng.fill_bytes(&mut bytes);

        let mut key = String::with_capacity(self.hash_len * 2);
        for byte in bytes.iter().skip_while(|byte| **byte == 0) {
            if key.is_empty() {
                write!(key, "{byte:x}").ok();
            } else {
                write!(key, "{byte:02x}").ok();
            }
        }
        if key.is_empty() {
            key.push('0');
        }
        key
    }
}

impl Iterator for RandomSource {
    type Item = Result<Request<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.issued == self.count {
            return None;
        }
        let key = self.key();
        let size = self.rng.random_range(self.size.clone());
        let max_age = self.rng.random_range(self.max_age.clone());
        let request = Request::new(self.timeline.at(self.issued), key, size, max_age);
        self.issued += 1;
        Some(Ok(request))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.issued;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RandomSource {}

/// Builder of a [`RandomSource`].
#[derive(Debug, Clone)]
pub struct RandomSourceBuilder {
    count: usize,
    hash_len: usize,
    size: RangeInclusive<usize>,
    max_age: RangeInclusive<i64>,
    seed: Option<u64>,
    start: Timestamp,
    interval: Timestamp,
}

impl RandomSourceBuilder {
    fn new(count: usize) -> Self {
        Self {
            count,
            hash_len: 8,
            size: 1..=100,
            max_age: 60..=300,
            seed: None,
            start: 0.0,
            interval: 1.0,
        }
    }

    /// Set the key length in bytes.
    ///
    /// The default value is 8.
    pub fn with_hash_len(mut self, hash_len: usize) -> Self {
        self.hash_len = hash_len;
        self
    }

    /// Set the inclusive range object sizes are drawn from.
    ///
    /// The default value is `1..=100`.
    pub fn with_size_range(mut self, size: RangeInclusive<usize>) -> Self {
        self.size = size;
        self
    }

    /// Set the inclusive range max-ages are drawn from.
    ///
    /// The default value is `60..=300`.
    pub fn with_max_age_range(mut self, max_age: RangeInclusive<i64>) -> Self {
        self.max_age = max_age;
        self
    }

    /// Make the source reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Issue the `k`-th request at `start + k * interval`.
    pub fn with_timeline(mut self, start: Timestamp, interval: Timestamp) -> Self {
        self.start = start;
        self.interval = interval;
        self
    }

    /// Validate the configuration and build the source.
    pub fn build(self) -> Result<RandomSource> {
        if self.hash_len == 0 {
            return Err(Error::trace_integrity("hash length must be positive"));
        }
        if self.size.is_empty() {
            return Err(Error::config(format!("empty size range: {:?}", self.size)));
        }
        if self.max_age.is_empty() {
            return Err(Error::config(format!("empty max-age range: {:?}", self.max_age)));
        }
        Ok(RandomSource {
            rng: crate::rng(self.seed),
            hash_len: self.hash_len,
            size: self.size,
            max_age: self.max_age,
            count: self.count,
            timeline: Timeline::new(self.start, self.interval)?,
            issued: 0,
        })
    }
}

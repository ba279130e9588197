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
    error::{Error, Result},
    request::{Request, Timestamp},
};
use rand::{distr::Distribution, rngs::StdRng};
use rand_distr::Zipf;

use crate::Timeline;

/// Issues keys `0..n` drawn from a Zipf distribution, key `0` being the most popular.
///
/// Every object has the same size and max-age.
#[derive(Debug)]
pub struct ZipfSource {
    rng: StdRng,
    zipf: Zipf<f64>,
    size: usize,
    max_age: i64,
    count: usize,
    timeline: Timeline,
    issued: usize,
}

impl ZipfSource {
    /// Start building a source of `count` requests over `n` objects with exponent `s`.
    pub fn builder(n: usize, s: f64, count: usize) -> ZipfSourceBuilder {
        ZipfSourceBuilder {
            n,
            s,
            count,
            size: 1,
            max_age: i64::MAX,
            seed: None,
            start: 0.0,
            interval: 1.0,
        }
    }
}

impl Iterator for ZipfSource {
    type Item = Result<Request<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.issued == self.count {
            return None;
        }
        // Samples are integral and within [1, n].
        let rank = self.zipf.sample(&mut self.rng) as u64;
        let key = (rank - 1).to_string();
        let request = Request::new(self.timeline.at(self.issued), key, self.size, self.max_age);
        self.issued += 1;
        Some(Ok(request))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.issued;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ZipfSource {}

/// Builder of a [`ZipfSource`].
#[derive(Debug, Clone)]
pub struct ZipfSourceBuilder {
    n: usize,
    s: f64,
    count: usize,
    size: usize,
    max_age: i64,
    seed: Option<u64>,
    start: Timestamp,
    interval: Timestamp,
}

impl ZipfSourceBuilder {
    /// Set the size of every object.
    ///
    /// The default value is 1.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Set the max-age of every object.
    ///
    /// The default value never expires.
    pub fn with_max_age(mut self, max_age: i64) -> Self {
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

    /// Validate the distribution parameters and build the source.
    pub fn build(self) -> Result<ZipfSource> {
        if self.n == 0 {
            return Err(Error::config("zipf population must not be empty"));
        }
        let zipf = Zipf::new(self.n as f64, self.s)
            .map_err(|e| Error::config(format!("invalid zipf parameters n: {}, s: {}: {e}", self.n, self.s)))?;
        Ok(ZipfSource {
            rng: crate::rng(self.seed),
            zipf,
            size: self.size,
            max_age: self.max_age,
            count: self.count,
            timeline: Timeline::new(self.start, self.interval)?,
            issued: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn test_zipf() {
        let requests = ZipfSource::builder(100, 1.0, 10_000)
            .with_size(4)
            .with_max_age(3600)
            .with_seed(42)
            .build()
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(requests.len(), 10_000);

        let counts = requests
            .iter()
            .map(|r| r.key().parse::<usize>().unwrap())
            .inspect(|key| assert!(*key < 100))
            .counts();
        assert!(counts[&0] > counts.get(&1).copied().unwrap_or_default());
        assert!(counts[&0] > 10 * counts.get(&99).copied().unwrap_or_default());

        let fetched = requests[0].clone().fetch();
        assert_eq!(fetched.size(), 4);
        assert_eq!(fetched.max_age(), 3600);
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(ZipfSource::builder(0, 1.0, 1).build(), Err(Error::Config(_))));
        assert!(matches!(ZipfSource::builder(10, -1.0, 1).build(), Err(Error::Config(_))));
    }
}

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

//! Request trace sources of cachesim.
//!
//! Every source is an iterator of fallible [`Request`]s keyed by [`String`], ready to be replayed by a simulation.
//! Synthetic sources issue their requests at `start + k * interval`.

use cachesim_common::{
    error::{Error, Result},
    request::{Request, Timestamp},
};
use rand::{rngs::StdRng, SeedableRng};

/// Fixed request repeated.
pub mod constant;
/// Rows of a csv file, replayed cyclically.
pub mod csv_source;
/// Weighted draws from a population of objects.
pub mod population;
/// Uniformly random objects.
pub mod random;
/// Zipf distributed keys.
pub mod zipf;

pub use crate::{
    constant::ConstantSource,
    csv_source::CsvSource,
    population::{PopulationSource, Template},
    random::RandomSource,
    zipf::ZipfSource,
};

/// Drain a source into memory, failing on its first error.
///
/// Offline policies need the whole trace before the replay starts.
pub fn materialize<K, I>(source: I) -> Result<Vec<Request<K>>>
where
    I: IntoIterator<Item = Result<Request<K>>>,
{
    source.into_iter().collect()
}

/// Keys of the given requests, in order.
pub fn collect_keys<'a, K>(requests: impl IntoIterator<Item = &'a Request<K>>) -> Vec<K>
where
    K: Clone + 'a,
{
    requests.into_iter().map(|request| request.key().clone()).collect()
}

/// Issue times of a synthetic source.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Timeline {
    start: Timestamp,
    interval: Timestamp,
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            start: 0.0,
            interval: 1.0,
        }
    }
}

impl Timeline {
    pub(crate) fn new(start: Timestamp, interval: Timestamp) -> Result<Self> {
        if !start.is_finite() {
            return Err(Error::config(format!("start must be finite, given: {start}")));
        }
        if !(interval.is_finite() && interval >= 0.0) {
            return Err(Error::config(format!(
                "interval must be finite and non-negative, given: {interval}"
            )));
        }
        Ok(Self { start, interval })
    }

    pub(crate) fn at(&self, index: usize) -> Timestamp {
        self.start + index as f64 * self.interval
    }
}

/// Seeded generator, or one seeded from the OS when no seed is given.
pub(crate) fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeline() {
        let timeline = Timeline::new(10.0, 0.5).unwrap();
        assert_eq!(timeline.at(0), 10.0);
        assert_eq!(timeline.at(4), 12.0);

        assert!(Timeline::new(f64::NAN, 1.0).is_err());
        assert!(Timeline::new(0.0, -1.0).is_err());
        assert!(Timeline::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_materialize() {
        let requests = materialize((0..3).map(|i| Ok(Request::new(i as f64, i.to_string(), 1, 60)))).unwrap();
        assert_eq!(collect_keys(&requests), vec!["0", "1", "2"]);

        let source = vec![
            Ok(Request::new(0.0, "a".to_string(), 1, 60)),
            Err(Error::trace_integrity("broken")),
        ];
        assert!(materialize(source).is_err());
    }
}

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

use std::{fmt::Display, time::Instant};

use cachesim_common::{
    code::Key,
    error::Result,
    outcome::Served,
    request::Request,
};
use serde::Serialize;

use crate::{
    cache::Cache,
    engine::CacheEngine,
    metrics::{Metrics, MetricsSink},
    policy::Policy,
};

/// A cache that can replay a request trace.
pub trait Replay {
    /// Key type of replayed requests.
    type Key: Key;

    /// Process a single request.
    fn process(&mut self, request: Request<Self::Key>) -> Result<Served<Self::Key>>;

    /// Capacity in bytes.
    fn capacity(&self) -> usize;

    /// Occupied fraction of the capacity.
    fn occupancy_fraction(&self) -> f64;
}

impl<P> Replay for CacheEngine<P>
where
    P: Policy,
{
    type Key = P::Key;

    fn process(&mut self, request: Request<Self::Key>) -> Result<Served<Self::Key>> {
        CacheEngine::process(self, request)
    }

    fn capacity(&self) -> usize {
        CacheEngine::capacity(self)
    }

    fn occupancy_fraction(&self) -> f64 {
        CacheEngine::occupancy_fraction(self)
    }
}

impl<K> Replay for Cache<K>
where
    K: Key,
{
    type Key = K;

    fn process(&mut self, request: Request<K>) -> Result<Served<K>> {
        Cache::process(self, request)
    }

    fn capacity(&self) -> usize {
        Cache::capacity(self)
    }

    fn occupancy_fraction(&self) -> f64 {
        Cache::occupancy_fraction(self)
    }
}

/// Summary of a finished simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Label of the run.
    pub name: String,
    /// Cache capacity in bytes.
    pub capacity: usize,
    /// Aggregated counters.
    #[serde(flatten)]
    pub metrics: Metrics,
    /// Fraction of requests served from cache.
    pub hit_ratio: f64,
    /// Fraction of bytes served from cache.
    pub byte_hit_ratio: f64,
    /// Occupancy fraction when the run ended.
    pub final_occupancy: f64,
    /// Wall clock time of the run in seconds.
    pub elapsed_secs: f64,
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} (capacity: {} B)", self.name, self.capacity)?;
        writeln!(
            f,
            "  requests: {}, hits: {}, misses: {}, passes: {}",
            self.metrics.requests, self.metrics.hits, self.metrics.misses, self.metrics.passes
        )?;
        writeln!(
            f,
            "  hit ratio: {:.4}, byte hit ratio: {:.4}",
            self.hit_ratio, self.byte_hit_ratio
        )?;
        write!(
            f,
            "  final occupancy: {:.4}, elapsed: {:.3}s",
            self.final_occupancy, self.elapsed_secs
        )
    }
}

/// Drives a request source through a cache and reports the outcome.
#[derive(Debug, Clone)]
pub struct Simulation {
    name: String,
    limit: Option<usize>,
}

impl Simulation {
    /// Create a simulation labeled `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            limit: None,
        }
    }

    /// Stop after `limit` requests. Needed for cyclic sources that never end.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Replay `source` through `cache`, recording every served request in `sink`.
    ///
    /// Stops at the first error of either the source or the cache.
    pub fn run<R, I, S>(&self, cache: &mut R, source: I, sink: &mut S) -> Result<Report>
    where
        R: Replay + ?Sized,
        I: IntoIterator<Item = Result<Request<R::Key>>>,
        S: MetricsSink<R::Key> + ?Sized,
    {
        tracing::info!(name = %self.name, capacity = cache.capacity(), limit = ?self.limit, "simulation start");

        let start = Instant::now();
        let mut metrics = Metrics::default();
        let limit = self.limit.unwrap_or(usize::MAX);

        for request in source.into_iter().take(limit) {
            let served = cache.process(request?)?;
            let occupancy = cache.occupancy_fraction();
            metrics.record(&served, occupancy);
            sink.record(&served, occupancy);
        }

        let report = Report {
            name: self.name.clone(),
            capacity: cache.capacity(),
            hit_ratio: metrics.hit_ratio(),
            byte_hit_ratio: metrics.byte_hit_ratio(),
            final_occupancy: cache.occupancy_fraction(),
            elapsed_secs: start.elapsed().as_secs_f64(),
            metrics,
        };

        tracing::info!(
            name = %report.name,
            requests = report.metrics.requests,
            hit_ratio = report.hit_ratio,
            byte_hit_ratio = report.byte_hit_ratio,
            "simulation done"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use cachesim_common::error::Error;

    use super::*;
    use crate::{
        cache::CacheBuilder,
        policy::{
            fifo::{Fifo, FifoConfig},
            lru::LruConfig,
        },
        watermark::Watermark,
    };

    fn requests(keys: &[u64]) -> Vec<Result<Request<u64>>> {
        keys.iter()
            .enumerate()
            .map(|(t, &key)| Ok(Request::new(t as f64, key, 10, 3600)))
            .collect()
    }

    #[test_log::test]
    fn test_run() {
        let mut cache = CacheBuilder::new(100).with_eviction_config(LruConfig {}).build().unwrap();
        let mut metrics = Metrics::default().with_occupancy_trace();

        let report = Simulation::new("lru")
            .run(&mut cache, requests(&[1, 2, 1, 3, 1, 2]), &mut metrics)
            .unwrap();

        assert_eq!(report.name, "lru");
        assert_eq!(report.capacity, 100);
        assert_eq!(report.metrics.requests, 6);
        assert_eq!(report.metrics.hits, 3);
        assert_eq!(report.metrics.misses, 3);
        assert_eq!(report.metrics.passes, 0);
        assert_eq!(report.hit_ratio, 0.5);
        assert_eq!(report.byte_hit_ratio, 0.5);
        assert_eq!(report.final_occupancy, 0.3);
        assert_eq!(metrics.occupancy_trace(), &[0.1, 0.2, 0.2, 0.3, 0.3, 0.3]);
    }

    #[test_log::test]
    fn test_run_with_limit() {
        let mut engine = CacheEngine::<Fifo<u64>>::with_config(100, Watermark::default(), FifoConfig {}).unwrap();
        let source = (0..).map(|t| Ok(Request::new(t as f64, t % 4, 10, 3600)));

        let report = Simulation::new("cyclic")
            .with_limit(20)
            .run(&mut engine, source, &mut ())
            .unwrap();

        assert_eq!(report.metrics.requests, 20);
        assert_eq!(report.metrics.misses, 4);
        assert_eq!(report.metrics.hits, 16);
    }

    #[test_log::test]
    fn test_run_stops_on_error() {
        let mut cache = CacheBuilder::new(100).build().unwrap();
        let mut source = requests(&[1, 2]);
        source.push(Err(Error::trace_integrity("broken row")));
        source.extend(requests(&[3]));

        let mut metrics = Metrics::default();
        let res = Simulation::new("broken").run(&mut cache, source, &mut metrics);
        assert!(matches!(res, Err(Error::TraceIntegrity(_))));
        assert_eq!(metrics.requests, 2);

        let mut cache = CacheBuilder::new(100).build().unwrap();
        let source = vec![Ok(Request::new(5.0, 1u64, 10, 60)), Ok(Request::new(4.0, 2u64, 10, 60))];
        let res = Simulation::new("out of order").run(&mut cache, source, &mut ());
        assert!(matches!(res, Err(Error::OutOfOrder { .. })));
    }

    #[test]
    fn test_report_serialize() {
        let mut cache = CacheBuilder::new(100).build().unwrap();
        let report = Simulation::new("fifo")
            .run(&mut cache, requests(&[1, 1]), &mut ())
            .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["name"], "fifo");
        assert_eq!(json["requests"], 2);
        assert_eq!(json["hits"], 1);
        assert_eq!(json["hit_ratio"], 0.5);

        let text = report.to_string();
        assert!(text.starts_with("fifo (capacity: 100 B)"));
        assert!(text.contains("hits: 1"));
    }
}

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

use cachesim_common::outcome::{Outcome, Served};
use serde::Serialize;

/// Receives every served request of a simulation run.
pub trait MetricsSink<K> {
    /// Record a served request and the cache occupancy fraction right after it.
    fn record(&mut self, served: &Served<K>, occupancy: f64);
}

impl<K> MetricsSink<K> for () {
    fn record(&mut self, _: &Served<K>, _: f64) {}
}

impl<K, S> MetricsSink<K> for &mut S
where
    S: MetricsSink<K> + ?Sized,
{
    fn record(&mut self, served: &Served<K>, occupancy: f64) {
        (**self).record(served, occupancy)
    }
}

impl<K, A, B> MetricsSink<K> for (A, B)
where
    A: MetricsSink<K>,
    B: MetricsSink<K>,
{
    fn record(&mut self, served: &Served<K>, occupancy: f64) {
        self.0.record(served, occupancy);
        self.1.record(served, occupancy);
    }
}

/// Aggregated outcome counters.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Metrics {
    /// processed requests
    pub requests: usize,
    /// served from cache
    pub hits: usize,
    /// fetched and stored
    pub misses: usize,
    /// fetched and not stored
    pub passes: usize,

    /// bytes delivered for every request
    pub bytes_served: u64,
    /// bytes delivered from cache
    pub bytes_hit: u64,

    #[serde(skip)]
    occupancy: Option<Vec<f64>>,
}

impl Metrics {
    /// Also keep the occupancy fraction sampled after every request.
    pub fn with_occupancy_trace(mut self) -> Self {
        self.occupancy = Some(vec![]);
        self
    }

    /// Fraction of requests served from cache.
    pub fn hit_ratio(&self) -> f64 {
        ratio(self.hits as f64, self.requests as f64)
    }

    /// Fraction of bytes served from cache.
    pub fn byte_hit_ratio(&self) -> f64 {
        ratio(self.bytes_hit as f64, self.bytes_served as f64)
    }

    /// Occupancy fraction after each request. Empty unless enabled with [`Metrics::with_occupancy_trace`].
    pub fn occupancy_trace(&self) -> &[f64] {
        self.occupancy.as_deref().unwrap_or_default()
    }
}

fn ratio(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        part / total
    }
}

impl<K> MetricsSink<K> for Metrics {
    fn record(&mut self, served: &Served<K>, occupancy: f64) {
        let bytes = served.bytes() as u64;
        self.requests += 1;
        self.bytes_served += bytes;
        match served.outcome {
            Outcome::Hit { .. } => {
                self.hits += 1;
                self.bytes_hit += bytes;
            }
            Outcome::Miss => self.misses += 1,
            Outcome::Pass => self.passes += 1,
        }
        if let Some(trace) = self.occupancy.as_mut() {
            trace.push(occupancy);
        }
    }
}

/// Emits every served request as a `trace` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl<K> MetricsSink<K> for TracingSink
where
    K: Debug,
{
    fn record(&mut self, served: &Served<K>, occupancy: f64) {
        tracing::trace!(
            key = ?served.request.key(),
            issued_at = served.request.issued_at(),
            outcome = ?served.outcome,
            bytes = served.bytes(),
            occupancy,
            "served"
        );
    }
}

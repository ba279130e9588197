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
use rand::{
    distr::{weighted::WeightedIndex, Distribution},
    rngs::StdRng,
};

use crate::Timeline;

/// Metadata of an object of the population.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Object key.
    pub key: String,
    /// Object size in bytes.
    pub size: usize,
    /// Object max-age in seconds.
    pub max_age: i64,
}

impl Template {
    /// Create a new template.
    pub fn new(key: impl Into<String>, size: usize, max_age: i64) -> Self {
        Self {
            key: key.into(),
            size,
            max_age,
        }
    }

    /// A unit sized object that never expires.
    pub fn unit(key: impl Into<String>) -> Self {
        Self::new(key, 1, i64::MAX)
    }
}

/// Issues `count` requests drawn with replacement from a weighted population.
#[derive(Debug)]
pub struct PopulationSource {
    rng: StdRng,
    population: Vec<Template>,
    index: WeightedIndex<f64>,
    count: usize,
    timeline: Timeline,
    issued: usize,
}

impl PopulationSource {
    /// Start building a source drawing from `population` with the given relative `weights`.
    pub fn builder(population: Vec<Template>, weights: Vec<f64>, count: usize) -> PopulationSourceBuilder {
        PopulationSourceBuilder {
            population,
            weights,
            count,
            seed: None,
            start: 0.0,
            interval: 1.0,
        }
    }

    /// Start building a source drawing uniformly from `population`.
    pub fn uniform(population: Vec<Template>, count: usize) -> PopulationSourceBuilder {
        let weights = vec![1.0; population.len()];
        Self::builder(population, weights, count)
    }
}

impl Iterator for PopulationSource {
    type Item = Result<Request<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.issued == self.count {
            return None;
        }
        let template = &self.population[self.index.sample(&mut self.rng)];
        let request = Request::new(
            self.timeline.at(self.issued),
            template.key.clone(),
            template.size,
            template.max_age,
        );
        self.issued += 1;
        Some(Ok(request))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.issued;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PopulationSource {}

/// Builder of a [`PopulationSource`].
#[derive(Debug, Clone)]
pub struct PopulationSourceBuilder {
    population: Vec<Template>,
    weights: Vec<f64>,
    count: usize,
    seed: Option<u64>,
    start: Timestamp,
    interval: Timestamp,
}

impl PopulationSourceBuilder {
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

    /// Validate the population and build the source.
    pub fn build(self) -> Result<PopulationSource> {
        if self.population.is_empty() {
            return Err(Error::trace_integrity("population is empty"));
        }
        if self.population.len() != self.weights.len() {
            return Err(Error::trace_integrity(format!(
                "population of {} objects given {} weights",
                self.population.len(),
                self.weights.len()
            )));
        }
        if let Some((i, weight)) = self
            .weights
            .iter()
            .enumerate()
            .find(|(_, weight)| !(weight.is_finite() && **weight >= 0.0))
        {
            return Err(Error::trace_integrity(format!(
                "weight of {:?} must be finite and non-negative, given: {weight}",
                self.population[i].key
            )));
        }
        if self.weights.iter().all(|weight| *weight == 0.0) {
            return Err(Error::trace_integrity("all weights are zero"));
        }

        let index = WeightedIndex::new(&self.weights)
            .map_err(|e| Error::trace_integrity(format!("invalid weights: {e}")))?;

        Ok(PopulationSource {
            rng: crate::rng(self.seed),
            population: self.population,
            index,
            count: self.count,
            timeline: Timeline::new(self.start, self.interval)?,
            issued: 0,
        })
    }
}

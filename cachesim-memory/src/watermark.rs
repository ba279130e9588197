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

use cachesim_common::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Occupancy thresholds that drive eviction.
///
/// Eviction is triggered once occupancy exceeds `high × capacity` and relieves the cache down to `low × capacity`,
/// so one eviction batch amortizes over many subsequent inserts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Watermark {
    low: f64,
    high: f64,
}

impl Default for Watermark {
    fn default() -> Self {
        Self {
            low: Self::DEFAULT_LOW,
            high: Self::DEFAULT_HIGH,
        }
    }
}

impl Watermark {
    /// Default low watermark fraction.
    pub const DEFAULT_LOW: f64 = 0.90;
    /// Default high watermark fraction.
    pub const DEFAULT_HIGH: f64 = 0.95;

    /// Create a watermark pair.
    ///
    /// Must guarantee `0 < low <= high <= 1`.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        if !(low > 0.0 && low <= high && high <= 1.0) {
            return Err(Error::config(format!(
                "watermarks must satisfy 0 < low <= high <= 1, given: low = {low}, high = {high}"
            )));
        }
        Ok(Self { low, high })
    }

    /// Low watermark fraction.
    pub fn low(&self) -> f64 {
        self.low
    }

    /// High watermark fraction.
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Returns `true` if `occupancy` exceeds the high watermark of `capacity`.
    pub fn is_over_high(&self, occupancy: usize, capacity: usize) -> bool {
        occupancy as f64 > self.high * capacity as f64
    }

    /// Returns `true` if `occupancy` is at or below the low watermark of `capacity`.
    pub fn is_under_low(&self, occupancy: usize, capacity: usize) -> bool {
        occupancy as f64 <= self.low * capacity as f64
    }
}

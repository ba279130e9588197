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
    error::Result,
    request::{Request, Timestamp},
};

use crate::Timeline;

/// Issues the same object `count` times.
#[derive(Debug, Clone)]
pub struct ConstantSource {
    key: String,
    size: usize,
    max_age: i64,
    count: usize,
    timeline: Timeline,
    issued: usize,
}

impl ConstantSource {
    /// Issue `key` with the given metadata `count` times, one second apart starting at zero.
    pub fn new(key: impl Into<String>, size: usize, max_age: i64, count: usize) -> Self {
        Self {
            key: key.into(),
            size,
            max_age,
            count,
            timeline: Timeline::default(),
            issued: 0,
        }
    }

    /// Issue the `k`-th request at `start + k * interval`.
    pub fn with_timeline(mut self, start: Timestamp, interval: Timestamp) -> Result<Self> {
        self.timeline = Timeline::new(start, interval)?;
        Ok(self)
    }
}

impl Iterator for ConstantSource {
    type Item = Result<Request<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.issued == self.count {
            return None;
        }
        let request = Request::new(self.timeline.at(self.issued), self.key.clone(), self.size, self.max_age);
        self.issued += 1;
        Some(Ok(request))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.issued;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ConstantSource {}

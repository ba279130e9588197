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

//! Utilities for testing policies.

use cachesim_common::request::{Request, Stored};

use super::Context;

/// Max age used by [`stored`], long enough for any test trace.
pub const TEST_MAX_AGE: i64 = 3600;

/// Context of the request at `position`, issued at `position` seconds.
pub fn ctx(position: usize) -> Context {
    Context {
        now: position as f64,
        position,
    }
}

/// A stored entry of `key` with `size` bytes, stored at time zero.
pub fn stored<K>(key: K, size: usize) -> Stored<K> {
    Request::new(0.0, key, size, TEST_MAX_AGE).fetch().store(0.0)
}

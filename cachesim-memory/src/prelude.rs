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

#[cfg(any(test, feature = "test_utils"))]
pub use crate::policy::test_utils;
pub use crate::{
    cache::{
        BeladyCache, Cache, CacheBuilder, EvictionConfig, FifoCache, GlobalLfuCache, LfuCache, LruCache, NoopCache,
        ProtectedFifoCache,
    },
    engine::CacheEngine,
    metrics::{Metrics, MetricsSink, TracingSink},
    policy::{
        belady::BeladyConfig, fifo::FifoConfig, global_lfu::GlobalLfuConfig, lfu::LfuConfig, lru::LruConfig,
        noop::NoopConfig, protected_fifo::ProtectedFifoConfig, Context, Policy,
    },
    simulation::{Replay, Report, Simulation},
    watermark::Watermark,
};

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

//! Cache engine and eviction policies of cachesim.
//!
//! A [`CacheEngine`](crate::engine::CacheEngine) drives one [`Policy`](crate::policy::Policy) through the request
//! protocol: lookup, expiry check, fetch, admission, watermark relief and store. [`Cache`](crate::cache::Cache)
//! selects the policy at runtime, and [`Simulation`](crate::simulation::Simulation) replays a request trace through
//! either of them.

/// Runtime policy selection.
pub mod cache;
/// The request protocol.
pub mod engine;
/// Outcome counters and sinks.
pub mod metrics;
/// Eviction policies.
pub mod policy;
/// Common re-exports.
pub mod prelude;
/// Trace replay.
pub mod simulation;
/// Eviction thresholds.
pub mod watermark;

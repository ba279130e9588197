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

//! Shared components for cachesim.

/// Allow to enable debug assertions in release profile with feature "strict_assertion".
pub mod assert;
/// Traits for the key type of simulated objects.
pub mod code;
/// The error type shared by the whole simulator.
pub mod error;
/// Per-request outcomes.
pub mod outcome;
/// A FIFO queue that supports removal by token.
pub mod removable_queue;
/// Request phase types: issued, fetched and stored.
pub mod request;

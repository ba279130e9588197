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

//! cachesim replays request traces through cache eviction policies and reports how each policy would have served
//! them.
//!
//! ```
//! use cachesim::prelude::*;
//!
//! let mut cache = CacheBuilder::new(100).with_eviction_config(LruConfig {}).build()?;
//! let source = ConstantSource::new("a", 10, 3600, 10);
//! let report = Simulation::new("lru").run(&mut cache, source, &mut ())?;
//!
//! assert_eq!(report.metrics.misses, 1);
//! assert_eq!(report.metrics.hits, 9);
//! # Ok::<(), cachesim::prelude::Error>(())
//! ```

pub use cachesim_common as common;
pub use cachesim_memory as memory;
pub use cachesim_trace as trace;

/// Common re-exports.
pub mod prelude;

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

use std::marker::PhantomData;

use cachesim_common::{
    code::Key,
    error::{Error, Result},
    request::{Fetched, Stored},
};
use serde::{Deserialize, Serialize};

use super::{Context, Policy};
use crate::watermark::Watermark;

/// Noop policy config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoopConfig {}

/// A cache that does not cache. Every request passes through.
#[derive(Debug)]
pub struct Noop<K> {
    capacity: usize,
    watermark: Watermark,
    _marker: PhantomData<K>,
}

impl<K> Policy for Noop<K>
where
    K: Key,
{
    type Key = K;
    type Config = NoopConfig;

    fn new(capacity: usize, watermark: Watermark, _: Self::Config) -> Result<Self> {
        Ok(Self {
            capacity,
            watermark,
            _marker: PhantomData,
        })
    }

    fn lookup(&mut self, _: &K) -> Option<&Stored<K>> {
        None
    }

    fn admit(&self, _: &Fetched<K>) -> bool {
        false
    }

    fn store(&mut self, stored: Stored<K>, _: &Context) -> Result<()> {
        Err(Error::contract_violation(format!(
            "store of {:?} into a noop cache",
            stored.key()
        )))
    }

    fn evict(&mut self, _: &Context) -> Result<Stored<K>> {
        Err(Error::contract_violation("evict on a noop cache"))
    }

    fn remove(&mut self, _: &K) -> Option<Stored<K>> {
        None
    }

    fn occupancy(&self) -> usize {
        0
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn len(&self) -> usize {
        0
    }

    fn watermark(&self) -> Watermark {
        self.watermark
    }
}

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

//! A request walks through `Request -> Fetched -> Stored`. Each phase is its own type and the conversions are
//! one-way, so the metadata that is only known once the origin has answered (`size`, `max_age`) cannot be read
//! before the object is fetched.

use std::hash::{Hash, Hasher};

/// Simulation timestamp, in seconds.
pub type Timestamp = f64;

/// An issued request for a named object, before the origin has answered.
///
/// Only the key and the issue time are observable.
#[derive(Debug, Clone)]
pub struct Request<K> {
    issued_at: Timestamp,
    key: K,
    size: usize,
    max_age: i64,
}

impl<K> Request<K> {
    /// Create a new request.
    ///
    /// A non-positive `max_age` marks the object as non-cacheable.
    pub fn new(issued_at: Timestamp, key: K, size: usize, max_age: i64) -> Self {
        Self {
            issued_at,
            key,
            size,
            max_age,
        }
    }

    /// Time the request was issued.
    pub fn issued_at(&self) -> Timestamp {
        self.issued_at
    }

    /// Key of the requested object.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Simulate the origin retrieval. The object metadata is observable afterwards.
    pub fn fetch(self) -> Fetched<K> {
        Fetched {
            issued_at: self.issued_at,
            key: self.key,
            size: self.size,
            max_age: self.max_age,
        }
    }
}

/// A request whose object has been retrieved from the origin.
#[derive(Debug, Clone)]
pub struct Fetched<K> {
    issued_at: Timestamp,
    key: K,
    size: usize,
    max_age: i64,
}

impl<K> Fetched<K> {
    /// Time the request was issued.
    pub fn issued_at(&self) -> Timestamp {
        self.issued_at
    }

    /// Key of the object.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Object size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Time-to-live once stored, in seconds.
    pub fn max_age(&self) -> i64 {
        self.max_age
    }

    /// Returns `true` if the object may be stored at all.
    pub fn is_cacheable(&self) -> bool {
        self.max_age > 0
    }

    /// Stamp the object as stored at `now`.
    pub fn store(self, now: Timestamp) -> Stored<K> {
        Stored { fetched: self, stored_at: now }
    }
}

/// A fetched object that has been admitted into the cache.
#[derive(Debug, Clone)]
pub struct Stored<K> {
    fetched: Fetched<K>,
    stored_at: Timestamp,
}

impl<K> Stored<K> {
    /// Key of the object.
    pub fn key(&self) -> &K {
        self.fetched.key()
    }

    /// Object size in bytes.
    pub fn size(&self) -> usize {
        self.fetched.size()
    }

    /// Time-to-live once stored, in seconds.
    pub fn max_age(&self) -> i64 {
        self.fetched.max_age()
    }

    /// Time the object entered the cache.
    pub fn stored_at(&self) -> Timestamp {
        self.stored_at
    }

    /// Time after which the object is expired.
    pub fn expires_at(&self) -> Timestamp {
        self.stored_at + self.max_age() as Timestamp
    }

    /// Elapsed time since the object was stored.
    pub fn age(&self, now: Timestamp) -> Timestamp {
        now - self.stored_at
    }

    /// Returns `true` if the object is expired at `now`.
    ///
    /// The comparison is strict: an object requested exactly at `stored_at + max_age` is still valid.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.expires_at()
    }

    /// The fetched object this entry was created from.
    pub fn fetched(&self) -> &Fetched<K> {
        &self.fetched
    }
}

impl<K: Clone> Stored<K> {
    /// Serve the stored object for an access at `now`.
    ///
    /// Returns a copy whose issue time reflects the current access. The stored entry is untouched.
    pub fn reissue(&self, now: Timestamp) -> Fetched<K> {
        Fetched {
            issued_at: now,
            ..self.fetched.clone()
        }
    }
}

macro_rules! impl_key_identity {
    ($( $ty:ident ),*) => {
        $(
            impl<K: PartialEq> PartialEq for $ty<K> {
                fn eq(&self, other: &Self) -> bool {
                    self.key() == other.key()
                }
            }

            impl<K: Eq> Eq for $ty<K> {}

            impl<K: Hash> Hash for $ty<K> {
                fn hash<H: Hasher>(&self, state: &mut H) {
                    self.key().hash(state);
                }
            }
        )*
    };
}

impl_key_identity! { Request, Fetched, Stored }

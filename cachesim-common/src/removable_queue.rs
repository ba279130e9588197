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

use std::collections::BTreeMap;

/// Handle of an element pushed into a [`RemovableQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(u64);

/// A FIFO queue that supports random item removal.
///
/// Elements are ordered by a monotonic sequence, so a token stays valid until its element leaves the queue and a
/// removal leaves nothing behind.
#[derive(Debug)]
pub struct RemovableQueue<T> {
    items: BTreeMap<Token, T>,
    /// Token of the next pushed element.
    next: u64,
}

impl<T> Default for RemovableQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RemovableQueue<T> {
    /// Create an empty [`RemovableQueue`].
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
            next: 0,
        }
    }

    /// Push an element to the tail of the queue.
    ///
    /// Returns a token that can be used for randomly removal.
    pub fn push(&mut self, elem: T) -> Token {
        let token = Token(self.next);
        self.next += 1;
        self.items.insert(token, elem);
        token
    }

    /// Pop an element from the head of the queue.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_first().map(|(_, elem)| elem)
    }

    /// Randomly remove the element with the given `token` from the queue.
    ///
    /// Returns `None` if the element has already been popped or removed.
    pub fn remove(&mut self, token: Token) -> Option<T> {
        self.items.remove(&token)
    }

    /// Iterate the elements from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    /// Returns the element count.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there is no element in the queue.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

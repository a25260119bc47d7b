// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Caller-owned interning of geometry values.
//!
//! Consecutive frames of a capture repeat the same regions and transforms for
//! most nodes. An [`Interner`] hands out a shared [`Arc`] for every distinct
//! value it has seen, so identical values are stored once. The cache is owned
//! by whoever drives a parse (see
//! [`TraceBuilder`](crate::trace::TraceBuilder)) and is cleared at the start
//! of every top-level build.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use super::region::Region;
use super::transform::Transform;

/// Deduplicates values by equality.
#[derive(Debug)]
pub struct Interner<T> {
    values: HashMap<T, Arc<T>>,
    hits: u64,
}

impl<T> Default for Interner<T> {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
            hits: 0,
        }
    }
}

impl<T: Eq + Hash + Clone> Interner<T> {
    /// Creates an empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared instance equal to `value`, storing it on first use.
    pub fn intern(&mut self, value: T) -> Arc<T> {
        if let Some(shared) = self.values.get(&value) {
            self.hits += 1;
            return Arc::clone(shared);
        }
        let shared = Arc::new(value.clone());
        self.values.insert(value, Arc::clone(&shared));
        shared
    }

    /// Number of distinct values held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing has been interned since the last clear.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of lookups answered from the cache since the last clear.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Drops every cached value. Outstanding `Arc`s stay valid.
    pub fn clear(&mut self) {
        self.values.clear();
        self.hits = 0;
    }
}

/// Interners for the geometry values stored in frames.
#[derive(Debug, Default)]
pub struct GeometryCache {
    /// Visible regions reported by the compositor.
    pub regions: Interner<Region>,
    /// Node transforms.
    pub transforms: Interner<Transform>,
}

impl GeometryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every interner.
    pub fn clear(&mut self) {
        self.regions.clear();
        self.transforms.clear();
    }
}

// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node and display identity types.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a scene node.
///
/// Ids are unique within a frame and stable across frames for the same
/// physical element, so cross-frame comparisons use id and name, never
/// object identity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i32);

impl NodeId {
    /// Parent id of root nodes.
    pub const NO_PARENT: Self = Self(-1);

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Returns `true` for the root sentinel.
    #[inline]
    #[must_use]
    pub const fn is_no_parent(self) -> bool {
        self.0 == Self::NO_PARENT.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a physical or virtual display.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayId(pub u64);

impl fmt::Debug for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DisplayId({})", self.0)
    }
}

// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural errors raised while reconstructing frames and traces.

use thiserror::Error;

use crate::scene::NodeId;
use crate::time::TimeField;

/// Errors from frame construction, trace construction, and slicing.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Two records in one frame share an id.
    #[error("duplicate node id {0:?} in frame")]
    DuplicateNode(NodeId),

    /// A node references a parent that is not part of the frame.
    #[error("found orphan node {id:?} with parent {parent_id:?}")]
    Orphan {
        /// The orphaned node.
        id: NodeId,
        /// The parent id that could not be resolved.
        parent_id: NodeId,
    },

    /// A record lacks geometry the scene model cannot do without.
    #[error("node {id:?} is missing required geometry `{field}`")]
    MissingGeometry {
        /// The malformed node.
        id: NodeId,
        /// Name of the missing field.
        field: &'static str,
    },

    /// A node cannot be reached from any root, which only happens when
    /// parent links form a cycle.
    #[error("node {id:?} is part of a parent cycle")]
    ParentCycle {
        /// A node on the cycle.
        id: NodeId,
    },

    /// A trace entry lacks the clock the trace is keyed on.
    #[error("entry {index} has no {field:?} timestamp")]
    MissingTimestamp {
        /// Position of the entry.
        index: usize,
        /// The clock that was required.
        field: TimeField,
    },

    /// A trace entry is earlier than its predecessor.
    #[error("entry {index} is earlier than its predecessor")]
    OutOfOrder {
        /// Position of the offending entry.
        index: usize,
    },

    /// A slice bound lacks the clock the trace is keyed on.
    #[error("slice bound has no {0:?} timestamp")]
    UnkeyedBound(TimeField),

    /// `slice(from, to)` was called with `from > to`.
    #[error("invalid slice range: from {from} is after to {to}")]
    InvalidRange {
        /// Requested start, on the trace's clock.
        from: u64,
        /// Requested end, on the trace's clock.
        to: u64,
    },
}

/// Result alias for structural operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;

// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry, scene reconstruction, and trace model for compositor captures.
//!
//! `flicker_core` turns flat per-frame node records captured from a window
//! compositor into queryable scene trees, and arranges those trees into
//! timestamp-ordered traces that analysis code can slice and search.
//!
//! # Architecture
//!
//! ```text
//!   DecodedFrame (flat RawNode records + displays)
//!       │
//!       ▼
//!   TraceBuilder ──► FrameBuilder::build_with_cache() ──► Frame
//!       │                        │
//!       │                        └── GeometryCache (shared regions/transforms)
//!       ▼
//!   Trace<Frame> ──► slice() / entry_at() / first_with_sync_at_least()
//! ```
//!
//! **[`geometry`]**: Integer rectangles, banded regions with boolean
//! operations, and 2D affine transforms with exact quarter-turn rotations.
//!
//! **[`scene`]**: Frame construction: parent linking, orphan handling,
//! effective visibility with recorded reasons, and per-stack occlusion.
//!
//! **[`trace`]**: Ordered, immutable sequences of entries keyed on one
//! clock, with inclusive slicing and point lookup.
//!
//! **[`matcher`]**: Component names and the matchers used to find windows
//! and layers by package or class.
//!
//! **[`time`]**: Three-clock timestamps and duration formatting.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod error;
pub mod geometry;
pub mod matcher;
pub mod scene;
pub mod time;
pub mod trace;

pub use error::{Error, Result};

// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene model: per-frame reconstruction of the composited element tree.
//!
//! A [`Frame`] is built from a flat list of decoded [`RawNode`] records plus
//! the captured [`Display`]s. Each node becomes a [`SceneNode`] with:
//!
//! - an identity ([`NodeId`]) that is unique within the frame and stable
//!   across frames for the same element,
//! - topology resolved by id: a parent and z-ordered children,
//! - **raw properties** copied from the record: bounds, transform, buffer,
//!   alpha, opacity, paint effects, and the hidden-by-policy flag,
//! - **derived properties** computed once during construction: screen
//!   bounds, hidden-by-parent, visibility, occlusion sets, and the reasons
//!   behind an invisible verdict.
//!
//! Frames are immutable after construction and can be shared across threads.

mod build;
mod display;
mod frame;
mod id;
mod node;
mod traverse;

pub use display::Display;
pub use frame::{BuildConfig, Frame, FrameBuilder, build_frame};
pub use id::{DisplayId, NodeId};
pub use node::{Effects, InvisibilityReason, NodeFlags, NodeKind, RawNode, SceneNode};
pub use traverse::{Ancestors, Children};

// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry kernel: rectangles, regions, and affine transforms.
//!
//! Integer [`Rect`] and [`Region`] describe composed screen areas. Float
//! rectangles are plain [`kurbo::Rect`] values, re-exported as [`RectF`].
//! [`Transform`] maps node-local bounds to screen space.

mod intern;
mod rect;
mod region;
mod transform;

pub use intern::{GeometryCache, Interner};
pub use kurbo::Rect as RectF;
pub use rect::Rect;
pub use region::Region;
pub use transform::{Rotation, Transform, TransformKind};

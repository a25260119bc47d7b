// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer axis-aligned rectangles.

use core::fmt;

use serde::{Deserialize, Serialize};

/// An integer axis-aligned rectangle with half-open extents.
///
/// A point `(x, y)` is inside when `left <= x < right` and `top <= y < bottom`.
/// Rectangles with non-positive width or height are empty.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub left: i32,
    /// Top edge (inclusive).
    pub top: i32,
    /// Right edge (exclusive).
    pub right: i32,
    /// Bottom edge (exclusive).
    pub bottom: i32,
}

impl Rect {
    /// The canonical empty rectangle.
    pub const EMPTY: Self = Self::new(0, 0, 0, 0);

    /// Creates a rectangle from its edges.
    #[inline]
    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates a rectangle from an origin and a size.
    #[inline]
    #[must_use]
    pub const fn from_origin_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x.saturating_add(width), y.saturating_add(height))
    }

    /// Width, which is negative for inverted rectangles.
    #[inline]
    #[must_use]
    pub const fn width(self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    /// Height, which is negative for inverted rectangles.
    #[inline]
    #[must_use]
    pub const fn height(self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Returns `true` when the rectangle covers no points.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Covered area, zero for empty rectangles.
    #[must_use]
    pub fn area(self) -> i64 {
        if self.is_empty() {
            0
        } else {
            i64::from(self.width()) * i64::from(self.height())
        }
    }

    /// Returns `true` when the point lies inside the half-open extents.
    #[inline]
    #[must_use]
    pub const fn contains_point(self, x: i32, y: i32) -> bool {
        self.left <= x && x < self.right && self.top <= y && y < self.bottom
    }

    /// Returns `true` when `other` lies entirely inside `self`.
    ///
    /// An empty `other` is contained by every non-empty rectangle.
    #[must_use]
    pub fn contains_rect(self, other: Self) -> bool {
        if self.is_empty() {
            return false;
        }
        if other.is_empty() {
            return true;
        }
        self.left <= other.left
            && self.top <= other.top
            && self.right >= other.right
            && self.bottom >= other.bottom
    }

    /// Returns the overlap of two rectangles, or [`Rect::EMPTY`].
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        let r = Self::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        if r.is_empty() { Self::EMPTY } else { r }
    }

    /// Returns `true` when the rectangles share at least one point.
    #[must_use]
    pub fn intersects(self, other: Self) -> bool {
        !self.intersect(other).is_empty()
    }

    /// Smallest rectangle containing both; empty inputs are ignored.
    #[must_use]
    pub fn bounding_union(self, other: Self) -> Self {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => Self::EMPTY,
            (true, false) => other,
            (false, true) => self,
            (false, false) => Self::new(
                self.left.min(other.left),
                self.top.min(other.top),
                self.right.max(other.right),
                self.bottom.max(other.bottom),
            ),
        }
    }

    /// Converts a float rectangle by rounding every edge to the nearest integer.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "screen coordinates are rounded and saturate at the i32 range"
    )]
    pub fn from_kurbo(rect: kurbo::Rect) -> Self {
        let r = rect.abs();
        Self::new(
            r.x0.round() as i32,
            r.y0.round() as i32,
            r.x1.round() as i32,
            r.y1.round() as i32,
        )
    }

    /// Converts to a float rectangle.
    #[inline]
    #[must_use]
    pub fn to_kurbo(self) -> kurbo::Rect {
        kurbo::Rect::new(
            f64::from(self.left),
            f64::from(self.top),
            f64::from(self.right),
            f64::from(self.bottom),
        )
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect({}, {} - {}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) - ({}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_when_inverted_or_degenerate() {
        assert!(Rect::EMPTY.is_empty(), "zero rect is empty");
        assert!(Rect::new(10, 0, 5, 10).is_empty(), "inverted x is empty");
        assert!(Rect::new(0, 0, 10, 0).is_empty(), "zero height is empty");
        assert!(!Rect::new(0, 0, 1, 1).is_empty(), "1x1 is not empty");
    }

    #[test]
    fn point_containment_is_half_open() {
        let r = Rect::new(0, 0, 10, 10);
        assert!(r.contains_point(0, 0), "left/top edges are inside");
        assert!(!r.contains_point(10, 5), "right edge is outside");
        assert!(!r.contains_point(5, 10), "bottom edge is outside");
    }

    #[test]
    fn intersect_and_union() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 20, 20);
        assert_eq!(a.intersect(b), Rect::new(5, 5, 10, 10));
        assert_eq!(a.bounding_union(b), Rect::new(0, 0, 20, 20));
        assert_eq!(a.intersect(Rect::new(10, 0, 20, 10)), Rect::EMPTY);
        assert!(!a.intersects(Rect::new(10, 0, 20, 10)), "touching edges do not overlap");
    }

    #[test]
    fn contains_rect_rules() {
        let outer = Rect::new(0, 0, 100, 100);
        assert!(outer.contains_rect(Rect::new(10, 10, 100, 100)), "inner rect");
        assert!(!outer.contains_rect(Rect::new(10, 10, 101, 100)), "overhang");
        assert!(!Rect::EMPTY.contains_rect(Rect::EMPTY), "empty contains nothing");
    }

    #[test]
    fn kurbo_conversion_rounds() {
        let r = Rect::from_kurbo(kurbo::Rect::new(0.4, 0.6, 99.5, 100.2));
        assert_eq!(r, Rect::new(0, 1, 100, 100));
        assert_eq!(Rect::from_kurbo(r.to_kurbo()), r);
    }
}

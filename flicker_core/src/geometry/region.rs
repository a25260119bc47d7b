// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Regions as sets of disjoint rectangles.
//!
//! A [`Region`] is kept in a canonical banded form:
//!
//! - rectangles are grouped into horizontal *bands* sharing `top`/`bottom`,
//! - bands are sorted by `top` and never overlap,
//! - spans inside a band are sorted by `left`, disjoint, and never touch,
//! - vertically adjacent bands with identical spans are coalesced.
//!
//! Because the form is canonical, two regions that cover the same points
//! compare equal, which makes them usable as interning keys.

use core::fmt;

use super::rect::Rect;

/// Boolean set operation applied band by band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    Union,
    Intersect,
    Subtract,
    Xor,
}

impl Op {
    #[inline]
    fn keep(self, in_a: bool, in_b: bool) -> bool {
        match self {
            Self::Union => in_a || in_b,
            Self::Intersect => in_a && in_b,
            Self::Subtract => in_a && !in_b,
            Self::Xor => in_a != in_b,
        }
    }
}

/// An area made of disjoint integer rectangles.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    /// Creates an empty region.
    #[must_use]
    pub const fn new() -> Self {
        Self { rects: Vec::new() }
    }

    /// Creates a region covering a single rectangle.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        if rect.is_empty() {
            Self::new()
        } else {
            Self {
                rects: vec![rect],
            }
        }
    }

    /// Creates the union of a set of possibly overlapping rectangles.
    #[must_use]
    pub fn from_rects<I: IntoIterator<Item = Rect>>(rects: I) -> Self {
        let input: Vec<Rect> = rects.into_iter().filter(|r| !r.is_empty()).collect();
        Self {
            rects: combine(&input, &[], Op::Union),
        }
    }

    /// The disjoint rectangles making up this region, in band order.
    #[inline]
    #[must_use]
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Returns `true` when the region covers no points.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Returns `true` when the region is exactly one rectangle.
    #[inline]
    #[must_use]
    pub fn is_rect(&self) -> bool {
        self.rects.len() == 1
    }

    /// Bounding box of the region, [`Rect::EMPTY`] when empty.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.rects
            .iter()
            .fold(Rect::EMPTY, |acc, r| acc.bounding_union(*r))
    }

    /// Total covered area.
    #[must_use]
    pub fn area(&self) -> i64 {
        self.rects.iter().map(|r| r.area()).sum()
    }

    /// Returns `true` when some rectangle of the region contains the point.
    #[must_use]
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.rects.iter().any(|r| r.contains_point(x, y))
    }

    /// Returns `true` when every point of `rect` is covered by the region.
    ///
    /// An empty `rect` is always covered.
    #[must_use]
    pub fn covers_at_least(&self, rect: Rect) -> bool {
        rect.is_empty() || Self::from_rect(rect).subtract(self).is_empty()
    }

    /// Returns `true` when every point of `other` is covered by the region.
    #[must_use]
    pub fn covers_region(&self, other: &Self) -> bool {
        other.subtract(self).is_empty()
    }

    /// Points in either region.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            rects: combine(&self.rects, &other.rects, Op::Union),
        }
    }

    /// Points in both regions.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            rects: combine(&self.rects, &other.rects, Op::Intersect),
        }
    }

    /// Points in `self` but not in `other`.
    #[must_use]
    pub fn subtract(&self, other: &Self) -> Self {
        Self {
            rects: combine(&self.rects, &other.rects, Op::Subtract),
        }
    }

    /// Points in exactly one of the two regions.
    #[must_use]
    pub fn xor(&self, other: &Self) -> Self {
        Self {
            rects: combine(&self.rects, &other.rects, Op::Xor),
        }
    }

    /// Adds a rectangle to the region in place.
    pub fn add_rect(&mut self, rect: Rect) {
        if !rect.is_empty() {
            self.rects = combine(&self.rects, &[rect], Op::Union);
        }
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Self::from_rect(rect)
    }
}

impl FromIterator<Rect> for Region {
    fn from_iter<I: IntoIterator<Item = Rect>>(iter: I) -> Self {
        Self::from_rects(iter)
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rects.iter()).finish()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rects.is_empty() {
            return f.write_str("[empty]");
        }
        for (i, r) in self.rects.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{r}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Band sweep
// ---------------------------------------------------------------------------

/// Horizontal spans `[left, right)` of every rectangle fully spanning
/// `[y0, y1)`, sorted and merged.
fn spans_in_band(rects: &[Rect], y0: i32, y1: i32) -> Vec<(i32, i32)> {
    let mut spans: Vec<(i32, i32)> = rects
        .iter()
        .filter(|r| r.top <= y0 && r.bottom >= y1)
        .map(|r| (r.left, r.right))
        .collect();
    spans.sort_unstable();
    let mut merged: Vec<(i32, i32)> = Vec::with_capacity(spans.len());
    for (l, r) in spans {
        match merged.last_mut() {
            Some(last) if l <= last.1 => last.1 = last.1.max(r),
            _ => merged.push((l, r)),
        }
    }
    merged
}

fn covered(spans: &[(i32, i32)], x: i32) -> bool {
    spans.iter().any(|&(l, r)| l <= x && x < r)
}

/// Applies `op` to two sorted, merged span lists.
fn combine_spans(a: &[(i32, i32)], b: &[(i32, i32)], op: Op) -> Vec<(i32, i32)> {
    let mut xs: Vec<i32> = a.iter().chain(b).flat_map(|&(l, r)| [l, r]).collect();
    xs.sort_unstable();
    xs.dedup();
    let mut out: Vec<(i32, i32)> = Vec::new();
    for w in xs.windows(2) {
        let (x0, x1) = (w[0], w[1]);
        if !op.keep(covered(a, x0), covered(b, x0)) {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.1 == x0 => last.1 = x1,
            _ => out.push((x0, x1)),
        }
    }
    out
}

/// Combines two rectangle sets into canonical banded form.
fn combine(a: &[Rect], b: &[Rect], op: Op) -> Vec<Rect> {
    let mut ys: Vec<i32> = a.iter().chain(b).flat_map(|r| [r.top, r.bottom]).collect();
    ys.sort_unstable();
    ys.dedup();

    let mut out: Vec<Rect> = Vec::new();
    // Start index in `out`, bottom edge, and spans of the previous band.
    let mut prev: Option<(usize, i32, Vec<(i32, i32)>)> = None;

    for w in ys.windows(2) {
        let (y0, y1) = (w[0], w[1]);
        let spans = combine_spans(&spans_in_band(a, y0, y1), &spans_in_band(b, y0, y1), op);
        if spans.is_empty() {
            prev = None;
            continue;
        }
        if let Some((start, bottom, prev_spans)) = &mut prev {
            if *bottom == y0 && *prev_spans == spans {
                for r in &mut out[*start..] {
                    r.bottom = y1;
                }
                *bottom = y1;
                continue;
            }
        }
        let start = out.len();
        out.extend(spans.iter().map(|&(l, r)| Rect::new(l, y0, r, y1)));
        prev = Some((start, y1, spans));
    }
    out
}

// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 2-D affine transforms with cached rotation classification.
//!
//! A [`Transform`] is the 3×3 matrix
//!
//! ```text
//! | dsdx  dtdx  tx |
//! | dsdy  dtdy  ty |
//! |  0     0     1 |
//! ```
//!
//! so a point maps as `x' = dsdx·x + dtdx·y + tx`, `y' = dsdy·x + dtdy·y + ty`.
//!
//! On construction the linear part is classified. When it is a pure scale or
//! a rotation by a multiple of 90° (possibly with flips), near-zero and
//! near-unit entries are snapped to exact `0`/`±1` and the transform is
//! marked *simple*. Simple transforms map integer rectangles exactly.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::Mul;

use serde::{Deserialize, Serialize};

/// Tolerance used when snapping matrix entries to `0` or `±1`.
const SNAP_EPSILON: f64 = 1e-6;

/// Display or content orientation in quarter turns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rotation {
    /// No rotation.
    #[default]
    Rotation0,
    /// Rotated 90°.
    Rotation90,
    /// Rotated 180°.
    Rotation180,
    /// Rotated 270°.
    Rotation270,
}

impl Rotation {
    /// Quarter-turn count in `0..4`.
    #[inline]
    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        match self {
            Self::Rotation0 => 0,
            Self::Rotation90 => 1,
            Self::Rotation180 => 2,
            Self::Rotation270 => 3,
        }
    }

    /// Builds a rotation from a quarter-turn count (taken modulo 4).
    #[inline]
    #[must_use]
    pub const fn from_quarter_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Self::Rotation0,
            1 => Self::Rotation90,
            2 => Self::Rotation180,
            _ => Self::Rotation270,
        }
    }

    /// The rotation that undoes this one.
    #[inline]
    #[must_use]
    pub const fn inverse(self) -> Self {
        Self::from_quarter_turns(4 - self.quarter_turns())
    }

    /// Returns `true` for 90° and 270°, where width and height swap.
    #[inline]
    #[must_use]
    pub const fn is_sideways(self) -> bool {
        matches!(self, Self::Rotation90 | Self::Rotation270)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ROTATION_{}", u16::from(self.quarter_turns()) * 90)
    }
}

/// Classification bits computed once per transform.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TransformKind(u8);

impl TransformKind {
    /// Identity linear part and zero translation.
    pub const IDENTITY: Self = Self(0);
    /// Non-zero translation.
    pub const TRANSLATE: Self = Self(0x01);
    /// Non-unit scale on at least one axis.
    pub const SCALE: Self = Self(0x02);
    /// Rotation by 90° or 270°, or a flip.
    pub const ROTATE: Self = Self(0x04);
    /// Shear or arbitrary rotation; rectangles are mapped by bounding box.
    pub const INVALID_ROTATION: Self = Self(0x80);

    /// Returns `true` if every bit of `other` is set in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl fmt::Debug for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("IDENTITY");
        }
        let mut first = true;
        for (bit, name) in [
            (Self::TRANSLATE, "TRANSLATE"),
            (Self::SCALE, "SCALE"),
            (Self::ROTATE, "ROTATE"),
            (Self::INVALID_ROTATION, "INVALID_ROTATION"),
        ] {
            if self.contains(bit) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// A 2-D affine transform. See the [module docs](self) for the layout.
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(from = "[f64; 6]", into = "[f64; 6]")]
pub struct Transform {
    dsdx: f64,
    dtdx: f64,
    tx: f64,
    dsdy: f64,
    dtdy: f64,
    ty: f64,
    kind: TransformKind,
    rotation: Option<Rotation>,
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        dsdx: 1.0,
        dtdx: 0.0,
        tx: 0.0,
        dsdy: 0.0,
        dtdy: 1.0,
        ty: 0.0,
        kind: TransformKind::IDENTITY,
        rotation: Some(Rotation::Rotation0),
    };

    /// Creates a transform from its six matrix values in row order
    /// `[dsdx, dtdx, tx, dsdy, dtdy, ty]`, classifying it.
    #[must_use]
    pub fn new(values: [f64; 6]) -> Self {
        let [dsdx, dtdx, tx, dsdy, dtdy, ty] = values;
        classify(dsdx, dtdx, tx, dsdy, dtdy, ty)
    }

    /// Creates a pure translation.
    #[must_use]
    pub fn from_translation(tx: f64, ty: f64) -> Self {
        Self::new([1.0, 0.0, tx, 0.0, 1.0, ty])
    }

    /// Creates a pure scale about the origin.
    #[must_use]
    pub fn from_scale(sx: f64, sy: f64) -> Self {
        Self::new([sx, 0.0, 0.0, 0.0, sy, 0.0])
    }

    /// Closed-form rotation of a `width`×`height` space by `rotation`.
    ///
    /// The rotated space is translated back to the positive quadrant, so the
    /// rectangle `(0, 0, width, height)` maps to `(0, 0, height, width)` for
    /// 90° and 270°. All entries are exact integers.
    #[must_use]
    pub fn rotation(rotation: Rotation, width: i32, height: i32) -> Self {
        let (w, h) = (f64::from(width), f64::from(height));
        let values = match rotation {
            Rotation::Rotation0 => [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            Rotation::Rotation90 => [0.0, -1.0, h, 1.0, 0.0, 0.0],
            Rotation::Rotation180 => [-1.0, 0.0, w, 0.0, -1.0, h],
            Rotation::Rotation270 => [0.0, 1.0, 0.0, -1.0, 0.0, w],
        };
        Self::new(values)
    }

    /// The six matrix values in row order.
    #[inline]
    #[must_use]
    pub const fn values(&self) -> [f64; 6] {
        [self.dsdx, self.dtdx, self.tx, self.dsdy, self.dtdy, self.ty]
    }

    /// Translation component.
    #[inline]
    #[must_use]
    pub const fn translation(&self) -> (f64, f64) {
        (self.tx, self.ty)
    }

    /// Cached classification bits.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> TransformKind {
        self.kind
    }

    /// Returns `true` when the linear part is a scale or a multiple of 90°.
    #[inline]
    #[must_use]
    pub const fn is_simple_rotation(&self) -> bool {
        !self.kind.contains(TransformKind::INVALID_ROTATION)
    }

    /// Orientation when the linear part is a pure rotation (with any
    /// positive scale), `None` for flips and shears.
    #[inline]
    #[must_use]
    pub const fn orientation(&self) -> Option<Rotation> {
        self.rotation
    }

    /// Returns `true` when all entries are finite.
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.values().iter().all(|v| v.is_finite())
    }

    /// Maps a point.
    #[inline]
    #[must_use]
    pub fn apply_to_point(&self, p: kurbo::Point) -> kurbo::Point {
        kurbo::Point::new(
            self.dsdx * p.x + self.dtdx * p.y + self.tx,
            self.dsdy * p.x + self.dtdy * p.y + self.ty,
        )
    }

    /// Maps a rectangle to the bounding box of its transformed corners.
    ///
    /// Simple transforms map two opposite corners through the snapped
    /// matrix; the result is exact for integer inputs and unit scale.
    #[must_use]
    pub fn apply_to_rect(&self, rect: kurbo::Rect) -> kurbo::Rect {
        if self.is_simple_rotation() {
            let a = self.apply_to_point(kurbo::Point::new(rect.x0, rect.y0));
            let b = self.apply_to_point(kurbo::Point::new(rect.x1, rect.y1));
            kurbo::Rect::from_points(a, b)
        } else {
            self.to_affine().transform_rect_bbox(rect)
        }
    }

    /// Inverse transform, or `None` when the matrix is singular.
    ///
    /// Simple transforms invert their signed-permutation linear part
    /// directly, so integer rectangles survive a round trip unchanged.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        let (a, b, c, d) = (self.dsdx, self.dtdx, self.dsdy, self.dtdy);
        let (ia, ib, ic, id) = if self.is_simple_rotation() {
            if b == 0.0 && c == 0.0 {
                (1.0 / a, 0.0, 0.0, 1.0 / d)
            } else {
                (0.0, 1.0 / c, 1.0 / b, 0.0)
            }
        } else {
            let det = a * d - b * c;
            if det == 0.0 || !det.is_finite() {
                return None;
            }
            (d / det, -b / det, -c / det, a / det)
        };
        let itx = -(ia * self.tx + ib * self.ty);
        let ity = -(ic * self.tx + id * self.ty);
        let inv = Self::new([ia, ib, itx, ic, id, ity]);
        inv.is_finite().then_some(inv)
    }

    /// Converts to a [`kurbo::Affine`].
    #[inline]
    #[must_use]
    pub fn to_affine(&self) -> kurbo::Affine {
        kurbo::Affine::new([self.dsdx, self.dsdy, self.dtdx, self.dtdy, self.tx, self.ty])
    }
}

/// Snaps `v` to `0`, `1`, or `-1` when within [`SNAP_EPSILON`].
fn snap(v: f64) -> f64 {
    if v.abs() < SNAP_EPSILON {
        0.0
    } else if (v.abs() - 1.0).abs() < SNAP_EPSILON {
        v.signum()
    } else {
        v
    }
}

fn classify(dsdx: f64, dtdx: f64, tx: f64, dsdy: f64, dtdy: f64, ty: f64) -> Transform {
    let (a, b, c, d) = (snap(dsdx), snap(dtdx), snap(dsdy), snap(dtdy));
    let mut kind = TransformKind::IDENTITY;
    if tx != 0.0 || ty != 0.0 {
        kind = kind.with(TransformKind::TRANSLATE);
    }

    let axis_aligned = b == 0.0 && c == 0.0 && a != 0.0 && d != 0.0;
    let quarter_turn = a == 0.0 && d == 0.0 && b != 0.0 && c != 0.0;

    let rotation = if axis_aligned {
        if a.abs() != 1.0 || d.abs() != 1.0 {
            kind = kind.with(TransformKind::SCALE);
        }
        match (a > 0.0, d > 0.0) {
            (true, true) => Some(Rotation::Rotation0),
            (false, false) => {
                kind = kind.with(TransformKind::ROTATE);
                Some(Rotation::Rotation180)
            }
            _ => {
                kind = kind.with(TransformKind::ROTATE);
                None
            }
        }
    } else if quarter_turn {
        kind = kind.with(TransformKind::ROTATE);
        if b.abs() != 1.0 || c.abs() != 1.0 {
            kind = kind.with(TransformKind::SCALE);
        }
        match (b < 0.0, c > 0.0) {
            (true, true) => Some(Rotation::Rotation90),
            (false, false) => Some(Rotation::Rotation270),
            _ => None,
        }
    } else {
        kind = kind.with(TransformKind::INVALID_ROTATION);
        None
    };

    if kind.contains(TransformKind::INVALID_ROTATION) {
        Transform {
            dsdx,
            dtdx,
            tx,
            dsdy,
            dtdy,
            ty,
            kind,
            rotation,
        }
    } else {
        Transform {
            dsdx: a,
            dtdx: b,
            tx,
            dsdy: c,
            dtdy: d,
            ty,
            kind,
            rotation,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f64; 6]> for Transform {
    fn from(values: [f64; 6]) -> Self {
        Self::new(values)
    }
}

impl From<Transform> for [f64; 6] {
    fn from(t: Transform) -> Self {
        t.values()
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.values() == other.values()
    }
}

// Matrices containing NaN compare unequal to themselves, which is acceptable
// for interning keys: such transforms are simply never shared.
impl Eq for Transform {}

impl Hash for Transform {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for v in self.values() {
            // `+ 0.0` folds -0.0 into 0.0 so equal values hash equally.
            (v + 0.0).to_bits().hash(state);
        }
    }
}

impl Mul for Transform {
    type Output = Self;

    /// `self * rhs` applies `rhs` first, then `self`.
    fn mul(self, rhs: Self) -> Self {
        let (a, b, c, d) = (self.dsdx, self.dtdx, self.dsdy, self.dtdy);
        Self::new([
            a * rhs.dsdx + b * rhs.dsdy,
            a * rhs.dtdx + b * rhs.dtdy,
            a * rhs.tx + b * rhs.ty + self.tx,
            c * rhs.dsdx + d * rhs.dsdy,
            c * rhs.dtdx + d * rhs.dtdy,
            c * rhs.tx + d * rhs.ty + self.ty,
        ])
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transform([{}, {}, {}; {}, {}, {}] {:?})",
            self.dsdx, self.dtdx, self.tx, self.dsdy, self.dtdy, self.ty, self.kind
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ROTATIONS: [Rotation; 4] = [
        Rotation::Rotation0,
        Rotation::Rotation90,
        Rotation::Rotation180,
        Rotation::Rotation270,
    ];

    #[test]
    fn identity_is_simple() {
        assert!(Transform::IDENTITY.is_simple_rotation(), "identity is simple");
        assert_eq!(Transform::IDENTITY.orientation(), Some(Rotation::Rotation0));
        assert_eq!(Transform::new([1.0, 0.0, 0.0, 0.0, 1.0, 0.0]).kind(), TransformKind::IDENTITY);
    }

    #[test]
    fn closed_form_rotations_classify() {
        for rot in ROTATIONS {
            let t = Transform::rotation(rot, 1080, 2340);
            assert!(t.is_simple_rotation(), "{rot} is simple");
            assert_eq!(t.orientation(), Some(rot), "orientation of {rot}");
        }
    }

    #[test]
    fn near_zero_entries_snap() {
        let angle = core::f64::consts::FRAC_PI_2;
        let t = Transform::new([angle.cos(), -angle.sin(), 0.0, angle.sin(), angle.cos(), 0.0]);
        assert!(t.is_simple_rotation(), "float quarter turn snaps");
        assert_eq!(t.values()[0], 0.0);
        assert_eq!(t.orientation(), Some(Rotation::Rotation90));
    }

    #[test]
    fn shear_uses_bounding_box() {
        let t = Transform::new([1.0, 0.5, 0.0, 0.0, 1.0, 0.0]);
        assert!(!t.is_simple_rotation(), "shear is not simple");
        let r = t.apply_to_rect(kurbo::Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(r, kurbo::Rect::new(0.0, 0.0, 15.0, 10.0));
    }

    #[test]
    fn rotation_90_swaps_axes() {
        let t = Transform::rotation(Rotation::Rotation90, 100, 200);
        let r = t.apply_to_rect(kurbo::Rect::new(0.0, 0.0, 100.0, 200.0));
        assert_eq!(r, kurbo::Rect::new(0.0, 0.0, 200.0, 100.0));
    }

    #[test]
    fn multiply_applies_rhs_first() {
        let t = Transform::from_translation(10.0, 0.0) * Transform::from_scale(2.0, 2.0);
        let p = t.apply_to_point(kurbo::Point::new(1.0, 1.0));
        assert_eq!(p, kurbo::Point::new(12.0, 2.0));
    }

    #[test]
    fn singular_has_no_inverse() {
        let t = Transform::new([1.0, 2.0, 0.0, 2.0, 4.0, 0.0]);
        assert!(t.inverse().is_none(), "singular matrix");
    }

    #[test]
    fn serde_as_six_values() {
        let t = Transform::from_translation(3.0, 4.0);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "[1.0,0.0,3.0,0.0,1.0,4.0]");
        let back: Transform = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    proptest! {
        #[test]
        fn rotation_round_trip_is_exact(
            x in -500_i32..500, y in -500_i32..500,
            w in 1_i32..400, h in 1_i32..400,
            turns in 0_u8..4,
        ) {
            let rot = Rotation::from_quarter_turns(turns);
            let t = Transform::rotation(rot, 1080, 2340);
            let inv = t.inverse().unwrap();
            let rect = kurbo::Rect::new(
                f64::from(x), f64::from(y), f64::from(x + w), f64::from(y + h),
            );
            let back = inv.apply_to_rect(t.apply_to_rect(rect));
            prop_assert_eq!(back, rect);
        }
    }
}

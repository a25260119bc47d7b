// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Displays: independent top-level stacking spaces.

use serde::{Deserialize, Serialize};

use super::id::DisplayId;
use crate::geometry::{Rect, Rotation, Transform};

/// A display captured alongside a frame.
///
/// Nodes compose into the display whose `layer_stack` matches their own;
/// nodes on different stacks never occlude one another.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Display {
    /// Display identity.
    pub id: DisplayId,
    /// Display name.
    pub name: String,
    /// Layer stack rendered by this display.
    pub layer_stack: u32,
    /// Virtual displays (screen recordings, casts) are never primary.
    pub is_virtual: bool,
    /// Whether the display is powered on.
    pub is_on: bool,
    /// Logical area the layer stack is composed into.
    pub layer_stack_space: Rect,
    /// Logical-to-physical display transform.
    pub transform: Transform,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            id: DisplayId(0),
            name: String::new(),
            layer_stack: 0,
            is_virtual: false,
            is_on: true,
            layer_stack_space: Rect::EMPTY,
            transform: Transform::IDENTITY,
        }
    }
}

impl Display {
    /// Creates a physical, powered-on display of the given size.
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            id: DisplayId(id),
            name: name.into(),
            layer_stack_space: Rect::new(0, 0, width, height),
            ..Self::default()
        }
    }

    /// Sets the layer stack.
    #[must_use]
    pub fn with_layer_stack(mut self, stack: u32) -> Self {
        self.layer_stack = stack;
        self
    }

    /// Marks the display virtual.
    #[must_use]
    pub fn with_virtual(mut self, is_virtual: bool) -> Self {
        self.is_virtual = is_virtual;
        self
    }

    /// Rotates the display, using the closed-form transform for its size.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        let space = self.layer_stack_space;
        self.transform = Transform::rotation(rotation, space.width(), space.height());
        self
    }

    /// Current orientation; non-rotational transforms report 0°.
    #[must_use]
    pub fn rotation(&self) -> Rotation {
        self.transform.orientation().unwrap_or_default()
    }

    /// Returns `true` if the display can be the primary display of a frame.
    #[must_use]
    pub fn is_primary_candidate(&self) -> bool {
        !self.is_virtual && !self.layer_stack_space.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_round_trips_through_transform() {
        let d = Display::new(0, "Built-in", 1080, 2340).with_rotation(Rotation::Rotation270);
        assert_eq!(d.rotation(), Rotation::Rotation270);
        assert!(d.is_primary_candidate(), "physical display with area");
        assert!(!d.with_virtual(true).is_primary_candidate(), "virtual is never primary");
    }
}

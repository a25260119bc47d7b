// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw decoded node records and reconstructed scene nodes.

use core::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::id::NodeId;
use crate::geometry::{Rect, RectF, Region, Transform};

/// What kind of element a node represents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A compositor layer.
    #[default]
    Layer,
    /// A window.
    Window,
    /// An activity record wrapping an app's windows.
    Activity,
    /// A task container holding activities.
    Task,
    /// A display area or other window-manager grouping.
    DisplayArea,
    /// Anything else.
    Other,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Layer => "Layer",
            Self::Window => "Window",
            Self::Activity => "Activity",
            Self::Task => "Task",
            Self::DisplayArea => "DisplayArea",
            Self::Other => "Other",
        })
    }
}

/// Per-node policy flags.
///
/// Setting [`hidden`](Self::hidden) hides the node and its entire subtree;
/// no other visibility reasoning applies to a hidden node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeFlags {
    /// Whether the node (and its subtree) is hidden by policy.
    pub hidden: bool,
}

/// Paint effects that make a node draw without a buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Effects {
    /// The node fills its bounds with a solid color.
    pub color_fill: bool,
    /// Shadow radius in pixels.
    pub shadow_radius: f32,
    /// Background blur radius in pixels.
    pub background_blur: f32,
    /// Corner radius in pixels.
    pub corner_radius: f32,
}

impl Effects {
    /// Returns `true` if any effect paints pixels.
    #[inline]
    #[must_use]
    pub fn paints(&self) -> bool {
        self.color_fill || self.shadow_radius > 0.0 || self.background_blur > 0.0
    }
}

/// One decoded node record, as produced by the capture decoder.
///
/// Construct with [`RawNode::new`] and the `with_*` methods, or deserialize.
/// Only `id`, `name`, and `bounds` are required; a record without bounds is
/// rejected when the frame is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawNode {
    /// Node identity.
    pub id: NodeId,
    /// Parent identity, [`NodeId::NO_PARENT`] for roots.
    pub parent_id: NodeId,
    /// Node name as reported by the capture.
    pub name: String,
    /// Element kind.
    pub kind: NodeKind,
    /// Z-order among siblings; higher draws on top.
    pub z: i32,
    /// Layer stack (display) the node composes into; inherited from the
    /// parent when absent.
    pub layer_stack: Option<u32>,
    /// Local bounds.
    pub bounds: Option<RectF>,
    /// Local-to-screen transform.
    pub transform: Transform,
    /// Screen bounds computed by the compositor, overriding `transform · bounds`.
    pub screen_bounds: Option<RectF>,
    /// Whether an active buffer is attached.
    pub has_buffer: bool,
    /// Color alpha in `0.0..=1.0`.
    pub alpha: f32,
    /// Whether the content declares itself opaque.
    pub opaque: bool,
    /// Paint effects.
    pub effects: Effects,
    /// Policy flags.
    pub flags: NodeFlags,
    /// Visible region computed by the compositor, when captured.
    pub visible_region: Option<Vec<Rect>>,
}

impl Default for RawNode {
    fn default() -> Self {
        Self {
            id: NodeId(0),
            parent_id: NodeId::NO_PARENT,
            name: String::new(),
            kind: NodeKind::Layer,
            z: 0,
            layer_stack: None,
            bounds: None,
            transform: Transform::IDENTITY,
            screen_bounds: None,
            has_buffer: false,
            alpha: 1.0,
            opaque: false,
            effects: Effects::default(),
            flags: NodeFlags::default(),
            visible_region: None,
        }
    }
}

impl RawNode {
    /// Creates a root record with no geometry.
    #[must_use]
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id: NodeId(id),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the parent id.
    #[must_use]
    pub fn with_parent(mut self, parent: i32) -> Self {
        self.parent_id = NodeId(parent);
        self
    }

    /// Sets the element kind.
    #[must_use]
    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the sibling z-order.
    #[must_use]
    pub fn with_z(mut self, z: i32) -> Self {
        self.z = z;
        self
    }

    /// Sets the layer stack.
    #[must_use]
    pub fn with_layer_stack(mut self, stack: u32) -> Self {
        self.layer_stack = Some(stack);
        self
    }

    /// Sets local bounds.
    #[must_use]
    pub fn with_bounds(mut self, bounds: RectF) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Sets the local-to-screen transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Sets compositor-provided screen bounds.
    #[must_use]
    pub fn with_screen_bounds(mut self, bounds: RectF) -> Self {
        self.screen_bounds = Some(bounds);
        self
    }

    /// Marks whether a buffer is attached.
    #[must_use]
    pub fn with_buffer(mut self, has_buffer: bool) -> Self {
        self.has_buffer = has_buffer;
        self
    }

    /// Sets color alpha.
    #[must_use]
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Marks the content opaque.
    #[must_use]
    pub fn with_opaque(mut self, opaque: bool) -> Self {
        self.opaque = opaque;
        self
    }

    /// Sets paint effects.
    #[must_use]
    pub fn with_effects(mut self, effects: Effects) -> Self {
        self.effects = effects;
        self
    }

    /// Sets the hidden-by-policy flag.
    #[must_use]
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.flags.hidden = hidden;
        self
    }

    /// Sets the compositor-provided visible region.
    #[must_use]
    pub fn with_visible_region(mut self, region: &Region) -> Self {
        self.visible_region = Some(region.rects().to_vec());
        self
    }

    /// Shorthand for an opaque buffered layer at `bounds` with identity
    /// transform.
    #[must_use]
    pub fn opaque_surface(id: i32, name: impl Into<String>, bounds: Rect) -> Self {
        Self::new(id, name)
            .with_bounds(bounds.to_kurbo())
            .with_buffer(true)
            .with_opaque(true)
    }
}

/// Why a node is not visible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvisibilityReason {
    /// The node's own policy flag hides it.
    HiddenByPolicy,
    /// An ancestor's policy flag hides it.
    HiddenByParent {
        /// The nearest hidden ancestor.
        parent: NodeId,
        /// That ancestor's name.
        name: String,
    },
    /// No buffer and no paint effect.
    NoContent,
    /// Color alpha is zero.
    TransparentAlpha,
    /// Screen bounds have no area.
    EmptyBounds,
    /// The compositor reported an empty visible region.
    EmptyVisibleRegion,
    /// Higher opaque nodes cover the node entirely.
    Occluded {
        /// The covering nodes, as `(id, name)`.
        by: Vec<(NodeId, String)>,
    },
}

impl fmt::Display for InvisibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HiddenByPolicy => f.write_str("Flag is hidden"),
            Self::HiddenByParent { parent, name } => write!(f, "Hidden by parent {name} ({parent})"),
            Self::NoContent => f.write_str("Buffer is empty and has no color fill, shadow or blur"),
            Self::TransparentAlpha => f.write_str("Alpha is 0"),
            Self::EmptyBounds => f.write_str("Bounds is 0x0"),
            Self::EmptyVisibleRegion => f.write_str("Visible region is empty"),
            Self::Occluded { by } => {
                f.write_str("Occluded by: ")?;
                for (i, (id, name)) in by.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name} ({id})")?;
                }
                Ok(())
            }
        }
    }
}

/// A node of a reconstructed [`Frame`](super::Frame).
///
/// Raw properties come from the decoded record; the remaining fields are
/// derived during frame construction and never change afterwards.
#[derive(Clone, Debug)]
pub struct SceneNode {
    // -- Identity and topology --
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) z: i32,
    pub(crate) z_order_path: Vec<i32>,

    // -- Raw properties --
    pub(crate) layer_stack: u32,
    pub(crate) bounds: RectF,
    pub(crate) transform: Arc<Transform>,
    pub(crate) has_buffer: bool,
    pub(crate) alpha: f32,
    pub(crate) opaque: bool,
    pub(crate) effects: Effects,
    pub(crate) flags: NodeFlags,
    pub(crate) visible_region: Option<Arc<Region>>,

    // -- Derived --
    pub(crate) screen_bounds: RectF,
    pub(crate) hidden_by_parent: Option<(NodeId, String)>,
    pub(crate) occluded_by: Vec<NodeId>,
    pub(crate) partially_occluded_by: Vec<NodeId>,
    pub(crate) covered_by: Vec<NodeId>,
    pub(crate) reasons: Vec<InvisibilityReason>,
}

impl SceneNode {
    /// Node identity.
    #[inline]
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Parent identity, `None` for roots (including tolerated orphans).
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in ascending z-order.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Node name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Sibling z-order.
    #[inline]
    #[must_use]
    pub fn z(&self) -> i32 {
        self.z
    }

    /// Z-orders from the root down to this node; comparing paths
    /// lexicographically orders nodes bottom to top.
    #[inline]
    #[must_use]
    pub fn z_order_path(&self) -> &[i32] {
        &self.z_order_path
    }

    /// Resolved layer stack.
    #[inline]
    #[must_use]
    pub fn layer_stack(&self) -> u32 {
        self.layer_stack
    }

    /// Local bounds.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> RectF {
        self.bounds
    }

    /// Local-to-screen transform.
    #[inline]
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Screen-space bounds.
    #[inline]
    #[must_use]
    pub fn screen_bounds(&self) -> RectF {
        self.screen_bounds
    }

    /// Screen-space bounds rounded to integer pixels.
    #[inline]
    #[must_use]
    pub fn screen_rect(&self) -> Rect {
        Rect::from_kurbo(self.screen_bounds)
    }

    /// Whether a buffer is attached.
    #[inline]
    #[must_use]
    pub fn has_buffer(&self) -> bool {
        self.has_buffer
    }

    /// Color alpha.
    #[inline]
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Paint effects.
    #[inline]
    #[must_use]
    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    /// Policy flags.
    #[inline]
    #[must_use]
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Compositor-provided visible region, if captured.
    #[inline]
    #[must_use]
    pub fn visible_region(&self) -> Option<&Region> {
        self.visible_region.as_deref()
    }

    /// Returns `true` if the node's own flag hides it.
    #[inline]
    #[must_use]
    pub fn is_hidden_by_policy(&self) -> bool {
        self.flags.hidden
    }

    /// The nearest ancestor whose flag hides this node.
    #[inline]
    #[must_use]
    pub fn hidden_by_parent(&self) -> Option<NodeId> {
        self.hidden_by_parent.as_ref().map(|(id, _)| *id)
    }

    /// Returns `true` when the content is declared opaque at full alpha.
    #[inline]
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.opaque && self.alpha >= 1.0
    }

    /// Returns `true` if the node contributes pixels to the screen.
    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.reasons.is_empty()
    }

    /// Higher opaque nodes that together cover this node.
    #[inline]
    #[must_use]
    pub fn occluded_by(&self) -> &[NodeId] {
        &self.occluded_by
    }

    /// Higher opaque nodes overlapping this node.
    #[inline]
    #[must_use]
    pub fn partially_occluded_by(&self) -> &[NodeId] {
        &self.partially_occluded_by
    }

    /// Higher translucent visible nodes overlapping this node.
    #[inline]
    #[must_use]
    pub fn covered_by(&self) -> &[NodeId] {
        &self.covered_by
    }

    /// Reasons the node is invisible; empty when visible.
    #[inline]
    #[must_use]
    pub fn invisibility_reasons(&self) -> &[InvisibilityReason] {
        &self.reasons
    }

    /// Human-readable justification of the visibility state.
    #[must_use]
    pub fn visibility_reason(&self) -> String {
        use core::fmt::Write as _;

        if self.reasons.is_empty() {
            return String::from("Visible");
        }
        let mut out = String::new();
        for (i, reason) in self.reasons.iter().enumerate() {
            if i > 0 {
                out.push_str("; ");
            }
            let _ = write!(out, "{reason}");
        }
        out
    }

    /// Identifier stable across frames: kind, id, and name.
    #[must_use]
    pub fn stable_id(&self) -> String {
        format!("{} {} {}", self.kind, self.id, self.name)
    }

    /// Returns `true` for task containers.
    #[inline]
    #[must_use]
    pub fn is_task(&self) -> bool {
        self.kind == NodeKind::Task || self.name.starts_with("Task=")
    }
}

impl fmt::Display for SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let raw = RawNode::new(3, "app")
            .with_parent(1)
            .with_z(2)
            .with_alpha(0.5)
            .with_hidden(true);
        assert_eq!(raw.parent_id, NodeId(1));
        assert_eq!(raw.z, 2);
        assert!(raw.flags.hidden, "hidden flag");
        assert!(raw.bounds.is_none(), "no bounds until set");
    }

    #[test]
    fn deserialize_with_defaults() {
        let raw: RawNode = serde_json::from_str(
            r#"{"id": 5, "parent_id": 1, "name": "StatusBar",
                "bounds": {"x0": 0.0, "y0": 0.0, "x1": 10.0, "y1": 10.0}}"#,
        )
        .unwrap();
        assert_eq!(raw.id, NodeId(5));
        assert!((raw.alpha - 1.0).abs() < f32::EPSILON, "alpha defaults to 1");
        assert_eq!(raw.transform, Transform::IDENTITY);
    }

    #[test]
    fn reason_text() {
        let r = InvisibilityReason::Occluded {
            by: vec![(NodeId(2), String::from("Wallpaper"))],
        };
        assert_eq!(format!("{r}"), "Occluded by: Wallpaper (2)");
        assert!(Effects { shadow_radius: 2.0, ..Effects::default() }.paints(), "shadow paints");
    }
}

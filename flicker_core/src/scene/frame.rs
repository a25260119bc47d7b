// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reconstructed frames and their construction entry points.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::build;
use super::display::Display;
use super::id::NodeId;
use super::node::{RawNode, SceneNode};
use super::traverse::{Ancestors, Children};
use crate::error::Result;
use crate::geometry::{GeometryCache, Region};
use crate::matcher::ComponentMatcher;
use crate::time::Timestamp;

/// Options for frame construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Attach nodes whose parent is missing as extra roots instead of
    /// failing the build.
    pub tolerate_orphans: bool,
}

/// One reconstructed instant of the composited scene.
///
/// Nodes live in an arena stored in traversal order: every parent precedes
/// its children and siblings appear in ascending z-order, so iterating
/// [`nodes`](Self::nodes) walks the scene bottom to top. Parent and child
/// links are ids resolved through a per-frame index.
#[derive(Clone, Debug)]
pub struct Frame {
    pub(crate) timestamp: Timestamp,
    pub(crate) vsync_id: Option<u64>,
    pub(crate) nodes: Vec<SceneNode>,
    pub(crate) index: HashMap<NodeId, usize>,
    pub(crate) roots: Vec<NodeId>,
    pub(crate) displays: Vec<Display>,
}

/// Builds a frame with default options (orphans are fatal).
///
/// # Errors
///
/// Returns an [`Error`](crate::Error) for duplicate ids, orphans, missing
/// bounds, or parent cycles.
pub fn build_frame(nodes: Vec<RawNode>, displays: Vec<Display>, timestamp: Timestamp) -> Result<Frame> {
    FrameBuilder::new(timestamp)
        .nodes(nodes)
        .displays(displays)
        .build()
}

/// Staged builder for a [`Frame`].
#[derive(Clone, Debug)]
pub struct FrameBuilder {
    timestamp: Timestamp,
    vsync_id: Option<u64>,
    nodes: Vec<RawNode>,
    displays: Vec<Display>,
    config: BuildConfig,
}

impl FrameBuilder {
    /// Starts a frame at `timestamp`.
    #[must_use]
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            vsync_id: None,
            nodes: Vec::new(),
            displays: Vec::new(),
            config: BuildConfig::default(),
        }
    }

    /// Sets the synchronization counter of the frame.
    #[must_use]
    pub fn vsync_id(mut self, vsync_id: u64) -> Self {
        self.vsync_id = Some(vsync_id);
        self
    }

    /// Adds one node record.
    #[must_use]
    pub fn node(mut self, node: RawNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Adds node records.
    #[must_use]
    pub fn nodes<I: IntoIterator<Item = RawNode>>(mut self, nodes: I) -> Self {
        self.nodes.extend(nodes);
        self
    }

    /// Adds one display.
    #[must_use]
    pub fn display(mut self, display: Display) -> Self {
        self.displays.push(display);
        self
    }

    /// Adds displays.
    #[must_use]
    pub fn displays<I: IntoIterator<Item = Display>>(mut self, displays: I) -> Self {
        self.displays.extend(displays);
        self
    }

    /// Replaces the build options.
    #[must_use]
    pub fn config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Toggles orphan tolerance.
    #[must_use]
    pub fn tolerate_orphans(mut self, tolerate: bool) -> Self {
        self.config.tolerate_orphans = tolerate;
        self
    }

    /// Builds the frame with a private geometry cache.
    ///
    /// # Errors
    ///
    /// See [`build_frame`].
    pub fn build(self) -> Result<Frame> {
        self.build_with_cache(&mut GeometryCache::new())
    }

    /// Builds the frame, sharing geometry values through `cache`.
    ///
    /// # Errors
    ///
    /// See [`build_frame`].
    pub fn build_with_cache(self, cache: &mut GeometryCache) -> Result<Frame> {
        build::build(
            self.nodes,
            self.displays,
            self.timestamp,
            self.vsync_id,
            &self.config,
            cache,
        )
    }
}

impl Frame {
    /// Capture time of the frame.
    #[inline]
    #[must_use]
    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    /// Synchronization counter, if captured.
    #[inline]
    #[must_use]
    pub fn vsync_id(&self) -> Option<u64> {
        self.vsync_id
    }

    /// Number of nodes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the frame has no nodes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.index.get(&id).map(|&pos| &self.nodes[pos])
    }

    /// Returns `true` if a node with `id` exists.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<&SceneNode> {
        self.node(self.node(id)?.parent()?)
    }

    /// Children of a node, bottom to top. Empty for unknown ids.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let ids = self.node(id).map_or(&[][..], SceneNode::children);
        Children::new(self, ids)
    }

    /// Ancestors of a node, nearest first.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors::new(self, self.node(id).and_then(SceneNode::parent))
    }

    /// Returns `true` if `ancestor` lies on the parent chain of `id`.
    #[must_use]
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(id).any(|n| n.id() == ancestor)
    }

    /// Root nodes in ascending z-order.
    pub fn roots(&self) -> impl Iterator<Item = &SceneNode> + '_ {
        self.roots.iter().filter_map(|id| self.node(*id))
    }

    /// All nodes in traversal order (parents first, bottom to top).
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    /// All nodes breadth first from the roots.
    #[must_use]
    pub fn flattened(&self) -> Vec<&SceneNode> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut queue: VecDeque<&SceneNode> = self.roots().collect();
        while let Some(node) = queue.pop_front() {
            out.push(node);
            queue.extend(self.children(node.id()));
        }
        out
    }

    /// Visible nodes, bottom to top.
    pub fn visible_nodes(&self) -> impl Iterator<Item = &SceneNode> + '_ {
        self.nodes.iter().filter(|n| n.is_visible())
    }

    /// Nodes whose element name matches.
    pub fn find<'a>(&'a self, matcher: &'a ComponentMatcher) -> impl Iterator<Item = &'a SceneNode> + 'a {
        self.nodes.iter().filter(move |n| matcher.matches_element(n))
    }

    /// Captured displays.
    #[inline]
    #[must_use]
    pub fn displays(&self) -> &[Display] {
        &self.displays
    }

    /// The first physical display with a non-empty layer-stack space.
    #[must_use]
    pub fn primary_display(&self) -> Option<&Display> {
        self.displays.iter().find(|d| d.is_primary_candidate())
    }

    /// Union of the screen areas of visible nodes matching `matcher`.
    ///
    /// Nodes with a compositor-provided visible region contribute that
    /// region; others contribute their rounded screen bounds.
    #[must_use]
    pub fn visible_region(&self, matcher: &ComponentMatcher) -> Region {
        let mut region = Region::new();
        for node in self.find(matcher).filter(|n| n.is_visible()) {
            match node.visible_region() {
                Some(captured) => region = region.union(captured),
                None => region.add_rect(node.screen_rect()),
            }
        }
        region
    }
}

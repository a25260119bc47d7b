// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::frame::Frame;
use super::id::NodeId;
use super::node::SceneNode;

/// An iterator over the direct children of a node, bottom to top.
///
/// Created by [`Frame::children`].
#[derive(Debug)]
pub struct Children<'a> {
    frame: &'a Frame,
    ids: core::slice::Iter<'a, NodeId>,
}

impl<'a> Children<'a> {
    pub(crate) fn new(frame: &'a Frame, ids: &'a [NodeId]) -> Self {
        Self {
            frame,
            ids: ids.iter(),
        }
    }
}

impl<'a> Iterator for Children<'a> {
    type Item = &'a SceneNode;

    fn next(&mut self) -> Option<&'a SceneNode> {
        let id = self.ids.next()?;
        self.frame.node(*id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

/// An iterator from a node's parent up to its root.
///
/// Created by [`Frame::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    frame: &'a Frame,
    next: Option<NodeId>,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(frame: &'a Frame, start: Option<NodeId>) -> Self {
        Self { frame, next: start }
    }
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a SceneNode;

    fn next(&mut self) -> Option<&'a SceneNode> {
        let node = self.frame.node(self.next?)?;
        self.next = node.parent();
        Some(node)
    }
}

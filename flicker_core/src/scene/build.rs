// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame construction.
//!
//! Building a frame runs four passes over the decoded records:
//!
//! 1. **Index**: reject records without bounds and duplicate ids, then map
//!    each id to its record slot.
//! 2. **Link**: resolve `parent_id` into child lists. A missing parent is an
//!    orphan: fatal unless tolerated, in which case the node becomes a root.
//!    Siblings are ordered by `(z, id)`.
//! 3. **Top-down**: walk parents before children, resolving the layer stack,
//!    `hidden_by_parent` as `parent.hidden || parent.hidden_by_parent`, screen
//!    bounds, and every visibility reason that does not depend on other nodes.
//! 4. **Occlusion**: walk the same order backwards (top-most first) per layer
//!    stack, accumulating the screen areas of visible opaque nodes. A node
//!    whose screen rect is covered by what is already above it is occluded.
//!
//! Nodes never reached from a root in pass 3 sit on a parent cycle.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{trace, warn};

use super::display::Display;
use super::frame::{BuildConfig, Frame};
use super::id::NodeId;
use super::node::{InvisibilityReason, RawNode, SceneNode};
use crate::error::{Error, Result};
use crate::geometry::{GeometryCache, Rect, Region};
use crate::time::Timestamp;

/// Visible nodes already composed above the current one on a layer stack.
#[derive(Default)]
struct StackCover {
    /// `(position, rect, simple transform)` of visible opaque nodes.
    opaque: Vec<(usize, Rect, bool)>,
    /// `(position, rect)` of visible translucent nodes.
    translucent: Vec<(usize, Rect)>,
    /// Union of opaque rects whose transforms keep them axis aligned.
    opaque_area: Region,
}

pub(crate) fn build(
    mut raw: Vec<RawNode>,
    displays: Vec<Display>,
    timestamp: Timestamp,
    vsync_id: Option<u64>,
    config: &BuildConfig,
    cache: &mut GeometryCache,
) -> Result<Frame> {
    let n = raw.len();

    // -- Index --
    let mut slot_of: HashMap<NodeId, usize> = HashMap::with_capacity(n);
    for (slot, r) in raw.iter().enumerate() {
        if r.bounds.is_none() {
            return Err(Error::MissingGeometry {
                id: r.id,
                field: "bounds",
            });
        }
        if slot_of.insert(r.id, slot).is_some() {
            return Err(Error::DuplicateNode(r.id));
        }
    }

    // -- Link --
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut parent_slot: Vec<Option<usize>> = vec![None; n];
    let mut roots: Vec<usize> = Vec::new();
    for (slot, r) in raw.iter().enumerate() {
        if r.parent_id.is_no_parent() {
            roots.push(slot);
            continue;
        }
        match slot_of.get(&r.parent_id) {
            Some(&p) => {
                children[p].push(slot);
                parent_slot[slot] = Some(p);
            }
            None if config.tolerate_orphans => {
                warn!(id = r.id.get(), parent_id = r.parent_id.get(), "tolerating orphan node as root");
                roots.push(slot);
            }
            None => {
                return Err(Error::Orphan {
                    id: r.id,
                    parent_id: r.parent_id,
                });
            }
        }
    }
    let sort_key = |slot: &usize| (raw[*slot].z, raw[*slot].id);
    roots.sort_by_key(sort_key);
    for list in &mut children {
        list.sort_by_key(sort_key);
    }

    let mut order: Vec<usize> = Vec::with_capacity(n);
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(slot) = stack.pop() {
        order.push(slot);
        stack.extend(children[slot].iter().rev());
    }
    if order.len() != n {
        let mut reached = vec![false; n];
        for &slot in &order {
            reached[slot] = true;
        }
        let stray = reached.iter().position(|r| !r).unwrap_or(0);
        return Err(Error::ParentCycle { id: raw[stray].id });
    }

    // -- Top-down --
    let ids: Vec<NodeId> = raw.iter().map(|r| r.id).collect();
    let mut pos_of_slot: Vec<usize> = vec![0; n];
    let mut nodes: Vec<SceneNode> = Vec::with_capacity(n);
    for (pos, &slot) in order.iter().enumerate() {
        pos_of_slot[slot] = pos;
        let parent = parent_slot[slot].map(|p| &nodes[pos_of_slot[p]]);
        let r = &mut raw[slot];
        let node = make_node(r, parent, &children[slot], &ids, cache);
        nodes.push(node);
    }

    // -- Occlusion --
    let mut covers: BTreeMap<u32, StackCover> = BTreeMap::new();
    for pos in (0..n).rev() {
        if !nodes[pos].reasons.is_empty() {
            continue;
        }
        let rect = nodes[pos].screen_rect();
        let simple = nodes[pos].transform.is_simple_rotation();
        let cover = covers.entry(nodes[pos].layer_stack).or_default();

        let mut occluded_by: Vec<usize> = cover
            .opaque
            .iter()
            .filter(|(_, r, s)| *s && simple && r.contains_rect(rect))
            .map(|(p, _, _)| *p)
            .collect();
        if occluded_by.is_empty() && cover.opaque_area.covers_at_least(rect) {
            occluded_by = cover
                .opaque
                .iter()
                .filter(|(_, r, s)| *s && r.intersects(rect))
                .map(|(p, _, _)| *p)
                .collect();
        }
        let partially: Vec<usize> = cover
            .opaque
            .iter()
            .filter(|(p, r, _)| r.intersects(rect) && !occluded_by.contains(p))
            .map(|(p, _, _)| *p)
            .collect();
        let covered: Vec<usize> = cover
            .translucent
            .iter()
            .filter(|(_, r)| r.intersects(rect))
            .map(|(p, _)| *p)
            .collect();

        if occluded_by.is_empty() {
            if nodes[pos].is_opaque() {
                cover.opaque.push((pos, rect, simple));
                if simple {
                    cover.opaque_area.add_rect(rect);
                }
            } else {
                cover.translucent.push((pos, rect));
            }
        }

        let by: Vec<(NodeId, String)> = occluded_by
            .iter()
            .map(|&p| (nodes[p].id, nodes[p].name.clone()))
            .collect();
        let node = &mut nodes[pos];
        node.partially_occluded_by = partially.iter().map(|&p| ids[order[p]]).collect();
        node.covered_by = covered.iter().map(|&p| ids[order[p]]).collect();
        if !by.is_empty() {
            node.occluded_by = by.iter().map(|(id, _)| *id).collect();
            node.reasons.push(InvisibilityReason::Occluded { by });
        }
    }

    let index: HashMap<NodeId, usize> = nodes.iter().enumerate().map(|(pos, node)| (node.id, pos)).collect();
    let root_ids: Vec<NodeId> = roots.iter().map(|&slot| ids[slot]).collect();
    trace!(
        nodes = n,
        roots = root_ids.len(),
        visible = nodes.iter().filter(|node| node.is_visible()).count(),
        "built frame"
    );

    Ok(Frame {
        timestamp,
        vsync_id,
        nodes,
        index,
        roots: root_ids,
        displays,
    })
}

/// Converts one record into a scene node, resolving everything that only
/// depends on the node itself and its already-built parent.
fn make_node(
    r: &mut RawNode,
    parent: Option<&SceneNode>,
    child_slots: &[usize],
    ids: &[NodeId],
    cache: &mut GeometryCache,
) -> SceneNode {
    let bounds = r.bounds.unwrap_or(kurbo::Rect::ZERO);
    let transform = cache.transforms.intern(r.transform);
    let screen_bounds = r
        .screen_bounds
        .unwrap_or_else(|| transform.apply_to_rect(bounds));
    let visible_region: Option<Arc<Region>> = r
        .visible_region
        .take()
        .map(|rects| cache.regions.intern(Region::from_rects(rects)));

    let layer_stack = r
        .layer_stack
        .or(parent.map(|p| p.layer_stack))
        .unwrap_or(0);
    let hidden_by_parent = parent.and_then(|p| {
        if p.flags.hidden {
            Some((p.id, p.name.clone()))
        } else {
            p.hidden_by_parent.clone()
        }
    });
    let mut z_order_path = parent.map(|p| p.z_order_path.clone()).unwrap_or_default();
    z_order_path.push(r.z);

    let mut reasons = Vec::new();
    if r.flags.hidden {
        reasons.push(InvisibilityReason::HiddenByPolicy);
    } else if let Some((parent, name)) = &hidden_by_parent {
        reasons.push(InvisibilityReason::HiddenByParent {
            parent: *parent,
            name: name.clone(),
        });
    } else {
        if !r.has_buffer && !r.effects.paints() {
            reasons.push(InvisibilityReason::NoContent);
        }
        if r.alpha <= 0.0 {
            reasons.push(InvisibilityReason::TransparentAlpha);
        }
        if Rect::from_kurbo(screen_bounds).is_empty() {
            reasons.push(InvisibilityReason::EmptyBounds);
        }
        if visible_region.as_ref().is_some_and(|region| region.is_empty()) {
            reasons.push(InvisibilityReason::EmptyVisibleRegion);
        }
    }

    SceneNode {
        id: r.id,
        parent: parent.map(|p| p.id),
        children: child_slots.iter().map(|&c| ids[c]).collect(),
        name: core::mem::take(&mut r.name),
        kind: r.kind,
        z: r.z,
        z_order_path,
        layer_stack,
        bounds,
        transform,
        has_buffer: r.has_buffer,
        alpha: r.alpha,
        opaque: r.opaque,
        effects: r.effects,
        flags: r.flags,
        visible_region,
        screen_bounds,
        hidden_by_parent,
        occluded_by: Vec::new(),
        partially_occluded_by: Vec::new(),
        covered_by: Vec::new(),
        reasons,
    }
}

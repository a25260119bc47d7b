// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Indented text dumps of reconstructed frames.

use std::io::{self, Write};

use flicker_core::scene::{Frame, SceneNode};
use flicker_core::trace::Trace;

/// Writes `frame` as a tree, one node per line, children indented under
/// their parent in bottom-to-top order.
///
/// Visible nodes are marked `+`; hidden ones are marked `-` and carry the
/// reason they are not visible.
pub fn write_frame(frame: &Frame, writer: &mut dyn Write) -> io::Result<()> {
    writeln!(
        writer,
        "frame at {} vsync={} nodes={}",
        frame.timestamp(),
        frame.vsync_id().map_or_else(|| String::from("?"), |v| v.to_string()),
        frame.len(),
    )?;
    for display in frame.displays() {
        writeln!(writer, "  display {display:?}")?;
    }
    let mut stack: Vec<(&SceneNode, usize)> = frame.roots().map(|n| (n, 1)).collect();
    stack.reverse();
    while let Some((node, depth)) = stack.pop() {
        write_node(node, depth, writer)?;
        let mut children: Vec<_> = frame.children(node.id()).map(|c| (c, depth + 1)).collect();
        children.reverse();
        stack.extend(children);
    }
    Ok(())
}

/// Writes every frame of `trace` separated by blank lines.
pub fn write_trace(trace: &Trace<Frame>, writer: &mut dyn Write) -> io::Result<()> {
    for (i, frame) in trace.iter().enumerate() {
        if i > 0 {
            writeln!(writer)?;
        }
        write_frame(frame, writer)?;
    }
    Ok(())
}

fn write_node(node: &SceneNode, depth: usize, writer: &mut dyn Write) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    if node.is_visible() {
        writeln!(writer, "{indent}+ {node} {} {}", node.kind(), node.screen_rect())
    } else {
        writeln!(
            writer,
            "{indent}- {node} {} {} ({})",
            node.kind(),
            node.screen_rect(),
            node.visibility_reason(),
        )
    }
}

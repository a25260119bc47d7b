// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use serde::{Deserialize, Serialize};

use super::Trace;
use crate::error::Result;
use crate::geometry::GeometryCache;
use crate::scene::{BuildConfig, Display, Frame, FrameBuilder, RawNode};
use crate::time::{TimeField, Timestamp};

/// One frame as read from a capture, before scene construction.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodedFrame {
    /// Capture time.
    pub timestamp: Timestamp,
    /// Synchronization counter of the frame, if recorded.
    pub vsync_id: Option<u64>,
    /// Flat node records.
    pub nodes: Vec<RawNode>,
    /// Displays present in the frame.
    pub displays: Vec<Display>,
}

/// Builds a [`Trace`] of frames, interning geometry across all of them.
///
/// The cache lives only as long as one [`build`](Self::build) call, so
/// values from earlier captures are never retained.
#[derive(Debug, Default)]
pub struct TraceBuilder {
    config: BuildConfig,
    key: TimeField,
    cache: GeometryCache,
}

impl TraceBuilder {
    /// A builder with default settings, keyed on elapsed time.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scene construction options.
    #[must_use]
    pub fn config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the clock the trace is ordered by.
    #[must_use]
    pub fn key(mut self, key: TimeField) -> Self {
        self.key = key;
        self
    }

    /// The geometry cache used by the last build.
    #[must_use]
    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }

    /// Builds every frame and assembles them into a trace.
    ///
    /// # Errors
    ///
    /// The first scene construction error, or a trace ordering error.
    pub fn build<I>(&mut self, frames: I) -> Result<Trace<Frame>>
    where
        I: IntoIterator<Item = DecodedFrame>,
    {
        self.cache.clear();
        let mut built = Vec::new();
        for (index, decoded) in frames.into_iter().enumerate() {
            let mut builder = FrameBuilder::new(decoded.timestamp)
                .nodes(decoded.nodes)
                .displays(decoded.displays)
                .config(self.config);
            if let Some(vsync) = decoded.vsync_id {
                builder = builder.vsync_id(vsync);
            }
            let frame = builder.build_with_cache(&mut self.cache).inspect_err(|err| {
                tracing::debug!(index, %err, "frame construction failed");
            })?;
            built.push(frame);
        }
        tracing::debug!(
            frames = built.len(),
            shared_regions = self.cache.regions.len(),
            shared_transforms = self.cache.transforms.len(),
            "trace built"
        );
        Trace::new(built, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::geometry::Rect;
    use crate::scene::NodeId;

    fn frame(t: u64, vsync: u64) -> DecodedFrame {
        DecodedFrame {
            timestamp: Timestamp::from_elapsed(t),
            vsync_id: Some(vsync),
            nodes: vec![RawNode::opaque_surface(1, "Root", Rect::new(0, 0, 100, 100))],
            displays: Vec::new(),
        }
    }

    #[test]
    fn builds_frames_in_order() {
        let mut builder = TraceBuilder::new();
        let trace = builder.build([frame(10, 1), frame(20, 3), frame(30, 5)]).unwrap();
        assert_eq!(trace.len(), 3);
        assert_eq!(trace.first_with_sync_at_least(2).map(Frame::vsync_id), Some(Some(3)));
        assert!(trace.first_with_sync_at_least(6).is_none(), "no frame reaches 6");
        let (found, node) = trace.find_node(NodeId(1)).unwrap();
        assert_eq!(found.vsync_id(), Some(1));
        assert_eq!(node.name(), "Root");
    }

    #[test]
    fn shares_transforms_across_frames() {
        let mut builder = TraceBuilder::new();
        let trace = builder.build([frame(10, 1), frame(20, 2)]).unwrap();
        let a = trace.get(0).unwrap().node(NodeId(1)).unwrap();
        let b = trace.get(1).unwrap().node(NodeId(1)).unwrap();
        assert!(core::ptr::eq(a.transform(), b.transform()), "identity transform is interned");
    }

    #[test]
    fn reports_out_of_order_frames() {
        let err = TraceBuilder::new().build([frame(20, 1), frame(10, 2)]).unwrap_err();
        assert_eq!(err, Error::OutOfOrder { index: 1 });
    }

    #[test]
    fn decodes_from_json() {
        let json = r#"{
            "timestamp": { "elapsed_nanos": 5 },
            "vsync_id": 9,
            "nodes": [{ "id": 1, "name": "Root", "bounds": [0, 0, 10, 10], "has_buffer": true }]
        }"#;
        let decoded: DecodedFrame = serde_json::from_str(json).unwrap();
        assert_eq!(decoded.timestamp.elapsed(), Some(5));
        assert_eq!(decoded.nodes.len(), 1);
        assert!(decoded.displays.is_empty(), "displays default to empty");
    }
}

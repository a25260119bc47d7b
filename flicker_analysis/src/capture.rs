// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Everything recorded for one capture session, as decoded records.

use flicker_core::scene::Frame;
use flicker_core::trace::{DecodedFrame, Trace, TraceBuilder};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extract::{Commit, Marker, ScenarioExtractor, ScenarioInstance, Transition};

/// Decoded frames plus the auxiliary streams used for extraction.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Capture {
    /// Compositor frames in capture order.
    pub frames: Vec<DecodedFrame>,
    /// Interaction markers.
    pub markers: Vec<Marker>,
    /// Transition log.
    pub transitions: Vec<Transition>,
    /// Low-level commit log.
    pub commits: Vec<Commit>,
}

impl Capture {
    /// Reconstructs the frame trace, keeping the auxiliary streams.
    ///
    /// # Errors
    ///
    /// The first structural error raised while building frames.
    pub fn build(self, builder: &mut TraceBuilder) -> flicker_core::Result<BuiltCapture> {
        Ok(BuiltCapture {
            trace: builder.build(self.frames)?,
            markers: self.markers,
            transitions: self.transitions,
            commits: self.commits,
        })
    }
}

/// A capture whose frames have been reconstructed.
#[derive(Clone, Debug)]
pub struct BuiltCapture {
    /// Reconstructed frames.
    pub trace: Trace<Frame>,
    /// Interaction markers.
    pub markers: Vec<Marker>,
    /// Transition log.
    pub transitions: Vec<Transition>,
    /// Low-level commit log.
    pub commits: Vec<Commit>,
}

impl BuiltCapture {
    /// Runs `extractor` over this capture.
    #[must_use]
    pub fn extract(&self, extractor: &ScenarioExtractor) -> Vec<Result<ScenarioInstance>> {
        extractor.extract(&self.trace, &self.markers, &self.transitions, &self.commits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ExtractorConfig, ScenarioType};

    #[test]
    fn loads_and_extracts_from_json() {
        let json = r#"{
            "frames": [
                { "timestamp": { "elapsed_nanos": 100 }, "vsync_id": 1,
                  "nodes": [{ "id": 1, "name": "Root", "bounds": [0, 0, 10, 10], "has_buffer": true }] },
                { "timestamp": { "elapsed_nanos": 200 }, "vsync_id": 2,
                  "nodes": [{ "id": 1, "name": "Root", "bounds": [0, 0, 10, 10], "has_buffer": true }] }
            ],
            "markers": [
                { "tag": "ROTATE", "start": { "elapsed_nanos": 150 }, "end": { "elapsed_nanos": 200 } }
            ]
        }"#;
        let capture: Capture = serde_json::from_str(json).unwrap();
        let built = capture.build(&mut TraceBuilder::new()).unwrap();
        assert_eq!(built.trace.len(), 2);

        let mut config = ExtractorConfig::new(ScenarioType::Rotation, "ROTATE");
        config.matcher.associated_transition_required = false;
        let results = built.extract(&ScenarioExtractor::new(config));
        let scenario = results[0].as_ref().unwrap();
        assert_eq!(scenario.trace.len(), 2, "initial entry plus frame at 200");
    }
}

// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use flicker_core::geometry::Rotation;
use flicker_core::scene::Frame;
use flicker_core::time::Timestamp;
use flicker_core::trace::Trace;
use serde::{Deserialize, Serialize};

use super::marker::Marker;
use super::transition::Transition;

/// Kind of interaction a scenario represents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioType {
    /// Checks that apply to any trace.
    #[default]
    Common,
    /// An app starts.
    AppLaunch,
    /// An app closes to the launcher.
    AppClose,
    /// The display rotates.
    Rotation,
    /// The input method appears.
    ImeAppear,
    /// The input method disappears.
    ImeDisappear,
    /// An app enters picture-in-picture.
    PipEnter,
    /// An app leaves picture-in-picture.
    PipExit,
}

impl fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Common => "Common",
            Self::AppLaunch => "AppLaunch",
            Self::AppClose => "AppClose",
            Self::Rotation => "Rotation",
            Self::ImeAppear => "ImeAppear",
            Self::ImeDisappear => "ImeDisappear",
            Self::PipEnter => "PipEnter",
            Self::PipExit => "PipExit",
        })
    }
}

/// One extracted, time-bounded interaction.
///
/// The sliced trace shares frames with the trace it was cut from.
#[derive(Clone, Debug)]
pub struct ScenarioInstance {
    /// Interaction kind.
    pub kind: ScenarioType,
    /// First instant of the scenario.
    pub start: Timestamp,
    /// Last instant of the scenario.
    pub end: Timestamp,
    /// Primary display orientation at the start.
    pub start_rotation: Rotation,
    /// Primary display orientation at the end.
    pub end_rotation: Rotation,
    /// Marker the scenario was extracted for; `None` for whole-trace mode.
    pub marker: Option<Marker>,
    /// Transition correlated with the marker, if any.
    pub transition: Option<Transition>,
    /// Frames in `[start, end]`.
    pub trace: Trace<Frame>,
}

impl ScenarioInstance {
    /// Identifier combining kind and starting orientation, e.g.
    /// `AppLaunch_ROTATION_0`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}_{}", self.kind, self.start_rotation)
    }
}

impl fmt::Display for ScenarioInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{} - {}] {} frames",
            self.key(),
            self.start,
            self.end,
            self.trace.len()
        )?;
        if let Some(t) = &self.transition {
            write!(f, " via {t}")?;
        }
        Ok(())
    }
}

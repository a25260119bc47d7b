// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use flicker_core::scene::{Display, Frame};
use flicker_core::time::Timestamp;
use flicker_core::trace::{SliceOptions, Trace};
use serde::{Deserialize, Serialize};

use super::marker::{Marker, group_by_tag};
use super::matcher::{MatcherConfig, TransitionMatcher};
use super::scenario::{ScenarioInstance, ScenarioType};
use super::transition::{Commit, Transition};
use crate::error::Result;

/// Settings for [`ScenarioExtractor`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Kind assigned to every extracted scenario.
    pub scenario_type: ScenarioType,
    /// Marker tag to extract.
    pub tag: String,
    /// Keep the last frame before the scenario start in the slice.
    pub include_initial_entry: bool,
    /// Transition correlation settings.
    pub matcher: MatcherConfig,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            scenario_type: ScenarioType::default(),
            tag: String::new(),
            include_initial_entry: true,
            matcher: MatcherConfig::default(),
        }
    }
}

impl ExtractorConfig {
    /// A config extracting `tag` as `scenario_type`.
    #[must_use]
    pub fn new(scenario_type: ScenarioType, tag: impl Into<String>) -> Self {
        Self {
            scenario_type,
            tag: tag.into(),
            ..Self::default()
        }
    }
}

/// Carves scenarios out of a trace using markers and the transition log.
#[derive(Clone, Debug)]
pub struct ScenarioExtractor {
    config: ExtractorConfig,
    matcher: TransitionMatcher,
}

impl ScenarioExtractor {
    /// An extractor whose matcher has no caller filters.
    #[must_use]
    pub fn new(config: ExtractorConfig) -> Self {
        let matcher = TransitionMatcher::new(config.matcher);
        Self { config, matcher }
    }

    /// Replaces the transition matcher, adopting its settings.
    #[must_use]
    pub fn with_matcher(mut self, matcher: TransitionMatcher) -> Self {
        self.config.matcher = *matcher.config();
        self.matcher = matcher;
        self
    }

    /// Extraction settings.
    #[must_use]
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extracts one scenario per retained marker.
    ///
    /// Markers with another tag or flagged canceled are skipped. Each
    /// marker's result is independent: a failure for one does not affect
    /// the others.
    pub fn extract(
        &self,
        trace: &Trace<Frame>,
        markers: &[Marker],
        transitions: &[Transition],
        commits: &[Commit],
    ) -> Vec<Result<ScenarioInstance>> {
        let groups = group_by_tag(markers);
        let Some(retained) = groups.get(self.config.tag.as_str()) else {
            return Vec::new();
        };
        retained
            .iter()
            .map(|marker| {
                self.extract_one(trace, marker, transitions, commits)
                    .inspect_err(|err| {
                        tracing::warn!(tag = %marker.tag, start = %marker.start, %err, "scenario extraction failed");
                    })
            })
            .collect()
    }

    fn extract_one(
        &self,
        trace: &Trace<Frame>,
        marker: &Marker,
        transitions: &[Transition],
        commits: &[Commit],
    ) -> Result<ScenarioInstance> {
        let transition = self.matcher.find(marker, transitions, trace)?;
        let start = start_boundary(trace, marker, transition, commits);
        let end = end_boundary(trace, marker, transition, commits);
        tracing::debug!(
            tag = %marker.tag,
            transition = transition.map(|t| t.id),
            %start,
            %end,
            "scenario boundaries resolved"
        );
        let options = SliceOptions {
            include_initial_entry: self.config.include_initial_entry,
        };
        let sliced = trace.slice(&start, &end, options)?;
        Ok(ScenarioInstance {
            kind: self.config.scenario_type,
            start,
            end,
            start_rotation: rotation_at(trace, &start),
            end_rotation: rotation_at(trace, &end),
            marker: Some(marker.clone()),
            transition: transition.cloned(),
            trace: sliced,
        })
    }

    /// One scenario spanning the whole trace, for captures without markers.
    #[must_use]
    pub fn extract_whole_trace(&self, trace: &Trace<Frame>) -> ScenarioInstance {
        let rotation = |frame: Option<&Frame>| {
            frame
                .and_then(Frame::primary_display)
                .map(Display::rotation)
                .unwrap_or_default()
        };
        ScenarioInstance {
            kind: self.config.scenario_type,
            start: trace.first().map_or(Timestamp::EMPTY, |f| *f.timestamp()),
            end: trace.last().map_or(Timestamp::EMPTY, |f| *f.timestamp()),
            start_rotation: rotation(trace.first()),
            end_rotation: rotation(trace.last()),
            marker: None,
            transition: None,
            trace: trace.clone(),
        }
    }
}

/// The first frame in which the commit covering `transaction` is visible.
fn applied_frame<'t>(trace: &'t Trace<Frame>, commits: &[Commit], transaction: u64) -> Option<&'t Frame> {
    let commit = commits.iter().find(|c| c.covers(transaction))?;
    trace.first_with_sync_at_least(commit.applied_sync_counter)
}

/// The earlier of the marker start and the frame where the transition's
/// start transaction landed.
fn start_boundary(
    trace: &Trace<Frame>,
    marker: &Marker,
    transition: Option<&Transition>,
    commits: &[Commit],
) -> Timestamp {
    transition
        .and_then(|t| t.start_transaction_id)
        .and_then(|id| applied_frame(trace, commits, id))
        .map_or(marker.start, |f| marker.start.min_per_field(*f.timestamp()))
}

/// The later of the marker end and the frame where the transition's finish
/// transaction landed. Markers are emitted before the finish is visible on
/// screen, so the commit log is the better witness. When the commit is
/// unknown, the first frame at or after the transition's finish time
/// stands in.
fn end_boundary(
    trace: &Trace<Frame>,
    marker: &Marker,
    transition: Option<&Transition>,
    commits: &[Commit],
) -> Timestamp {
    let Some(transition) = transition else {
        return marker.end;
    };
    transition
        .finish_transaction_id
        .and_then(|id| applied_frame(trace, commits, id))
        .or_else(|| {
            transition
                .finish_time
                .and_then(|finish| trace.first_at_or_after(&finish))
        })
        .map_or(marker.end, |f| marker.end.max_per_field(*f.timestamp()))
}

fn rotation_at(trace: &Trace<Frame>, at: &Timestamp) -> flicker_core::geometry::Rotation {
    trace
        .entry_at(at)
        .and_then(Frame::primary_display)
        .map(Display::rotation)
        .unwrap_or_default()
}

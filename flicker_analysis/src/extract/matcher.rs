// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::time::Duration;

use flicker_core::scene::{Frame, NodeId};
use flicker_core::time::TimeField;
use flicker_core::trace::Trace;
use serde::{Deserialize, Serialize};

use super::filter::{FilterContext, TransitionFilter};
use super::marker::Marker;
use super::transition::Transition;
use crate::error::{ExtractionError, Result};

/// Settings for [`TransitionMatcher`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// How long before the marker start a transition may be sent and still
    /// count as in range, absorbing dispatch latency.
    #[serde(rename = "tolerance_before_start_ms", with = "millis")]
    pub tolerance_before_start: Duration,
    /// Fail unless exactly one transition matches.
    pub associated_transition_required: bool,
    /// Clock used to compare send times with marker bounds.
    pub time_field: TimeField,
}

impl MatcherConfig {
    /// Default tolerance before the marker start.
    pub const DEFAULT_TOLERANCE: Duration = Duration::from_millis(50);
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            tolerance_before_start: Self::DEFAULT_TOLERANCE,
            associated_transition_required: true,
            time_field: TimeField::Elapsed,
        }
    }
}

mod millis {
    use core::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// Stages of the matching pipeline, in application order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Main,
    InRange,
    Exclusion,
    Trampoline,
    Final,
}

const STAGES: [Stage; 5] = [
    Stage::Main,
    Stage::InRange,
    Stage::Exclusion,
    Stage::Trampoline,
    Stage::Final,
];

/// Correlates a marker with at most one transition from the transition log.
///
/// Only transitions that played to completion on their own are considered;
/// aborted, unfinished, and merged-away ones are dropped up front. The rest
/// pass through a fixed pipeline: the caller's main filter, the in-range
/// filter, the caller's exclusion filter, trampoline merging, and the
/// caller's final filter.
#[derive(Clone, Debug, Default)]
pub struct TransitionMatcher {
    config: MatcherConfig,
    main: Option<TransitionFilter>,
    exclusion: Option<TransitionFilter>,
    final_filter: Option<TransitionFilter>,
}

impl TransitionMatcher {
    /// A matcher with no caller filters.
    #[must_use]
    pub fn new(config: MatcherConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Sets the filter applied before the range check.
    #[must_use]
    pub fn with_main_filter(mut self, filter: TransitionFilter) -> Self {
        self.main = Some(filter);
        self
    }

    /// Sets the filter applied after the range check.
    #[must_use]
    pub fn with_exclusion_filter(mut self, filter: TransitionFilter) -> Self {
        self.exclusion = Some(filter);
        self
    }

    /// Sets the filter applied after trampoline merging.
    #[must_use]
    pub fn with_final_filter(mut self, filter: TransitionFilter) -> Self {
        self.final_filter = Some(filter);
        self
    }

    /// Matching settings.
    #[must_use]
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Finds the transition associated with `marker`.
    ///
    /// When a transition is not required, no match yields `None` and
    /// several matches yield the earliest sent.
    ///
    /// # Errors
    ///
    /// When a transition is required: [`ExtractionError::NoCompleteTransition`],
    /// [`ExtractionError::NoTransitionLeft`] naming the stage that emptied
    /// the list, or [`ExtractionError::AmbiguousCorrelation`]. In any mode,
    /// [`ExtractionError::AmbiguousTrampoline`], and
    /// [`ExtractionError::AmbiguousCorrelation`] when more than two
    /// candidates reach trampoline merging.
    pub fn find<'t>(
        &self,
        marker: &Marker,
        transitions: &'t [Transition],
        trace: &Trace<Frame>,
    ) -> Result<Option<&'t Transition>> {
        let required = self.config.associated_transition_required;
        let mut candidates: Vec<&Transition> =
            transitions.iter().filter(|t| !t.is_incomplete() && !t.was_merged()).collect();
        tracing::debug!(
            tag = %marker.tag,
            total = transitions.len(),
            complete = candidates.len(),
            "matching transitions"
        );
        if required && candidates.is_empty() {
            return Err(ExtractionError::NoCompleteTransition {
                tag: marker.tag.clone(),
            });
        }

        let ctx = FilterContext { marker, trace };
        for (position, stage) in STAGES.iter().enumerate() {
            candidates = match stage {
                Stage::Main => apply(self.main.as_ref(), candidates, &ctx),
                Stage::InRange => self.in_range(candidates, marker),
                Stage::Exclusion => apply(self.exclusion.as_ref(), candidates, &ctx),
                Stage::Trampoline => merge_trampoline(candidates, marker, trace)?,
                Stage::Final => apply(self.final_filter.as_ref(), candidates, &ctx),
            };
            tracing::debug!(?stage, remaining = candidates.len(), "transition filter applied");
            if required && candidates.is_empty() {
                return Err(ExtractionError::NoTransitionLeft {
                    tag: marker.tag.clone(),
                    stage: position + 1,
                    stages: STAGES.len(),
                });
            }
        }

        match candidates.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(*only)),
            several if required => Err(ExtractionError::AmbiguousCorrelation {
                tag: marker.tag.clone(),
                count: several.len(),
                ids: several.iter().map(|t| t.id).collect(),
            }),
            several => {
                let field = self.config.time_field;
                let earliest = several
                    .iter()
                    .copied()
                    .min_by_key(|t| t.send_time.and_then(|s| s.get(field)).unwrap_or(u64::MAX));
                tracing::debug!(
                    count = several.len(),
                    chosen = earliest.map(|t| t.id),
                    "several transitions matched; using the earliest sent"
                );
                Ok(earliest)
            }
        }
    }

    /// Keeps transitions sent within the marker, or at most the tolerance
    /// before its start.
    fn in_range<'t>(&self, mut candidates: Vec<&'t Transition>, marker: &Marker) -> Vec<&'t Transition> {
        let field = self.config.time_field;
        let (Some(start), Some(end)) = (marker.start.get(field), marker.end.get(field)) else {
            tracing::debug!(tag = %marker.tag, ?field, "marker lacks the matching clock");
            return Vec::new();
        };
        let tolerance = u64::try_from(self.config.tolerance_before_start.as_nanos()).unwrap_or(u64::MAX);
        let lower = start.saturating_sub(tolerance);
        candidates.retain(|t| {
            t.send_time
                .and_then(|s| s.get(field))
                .is_some_and(|sent| lower <= sent && sent <= end)
        });
        candidates
    }
}

fn apply<'t>(
    filter: Option<&TransitionFilter>,
    mut candidates: Vec<&'t Transition>,
    ctx: &FilterContext<'_>,
) -> Vec<&'t Transition> {
    if let Some(filter) = filter {
        candidates.retain(|t| filter.keeps(t, ctx));
    }
    candidates
}

/// Collapses a launch that bounces through an intermediate activity into
/// its first transition.
///
/// A trampoline is a pair; more than two candidates cannot be resolved.
fn merge_trampoline<'t>(
    candidates: Vec<&'t Transition>,
    marker: &Marker,
    trace: &Trace<Frame>,
) -> Result<Vec<&'t Transition>> {
    match candidates.as_slice() {
        &[first, second] if is_trampoline(first, second, trace)? => {
            tracing::debug!(kept = first.id, dropped = second.id, "merged trampoline transitions");
            Ok(vec![first])
        }
        several if several.len() > 2 => Err(ExtractionError::AmbiguousCorrelation {
            tag: marker.tag.clone(),
            count: several.len(),
            ids: several.iter().map(|t| t.id).collect(),
        }),
        _ => Ok(candidates),
    }
}

fn single_opened(transition: &Transition) -> Result<Option<NodeId>> {
    let mut opened = transition.opened().map(|c| c.node_id);
    match (opened.next(), opened.count()) {
        (None, _) => Ok(None),
        (Some(id), 0) => Ok(Some(id)),
        (Some(_), rest) => Err(ExtractionError::AmbiguousTrampoline {
            transition: transition.id,
            count: rest + 1,
        }),
    }
}

/// The first transition opens or raises a task container; the second
/// closes something inside that container and opens its real target there.
fn is_trampoline(first: &Transition, second: &Transition, trace: &Trace<Frame>) -> Result<bool> {
    let Some(container) = single_opened(first)? else {
        return Ok(false);
    };
    if !trace.find_node(container).is_some_and(|(_, node)| node.is_task()) {
        return Ok(false);
    }
    let closed: Vec<NodeId> = second.closed().map(|c| c.node_id).collect();
    if closed.is_empty() {
        return Ok(false);
    }
    let Some(target) = single_opened(second)? else {
        return Ok(false);
    };
    let inside = |id: NodeId| trace.iter().any(|f| f.is_descendant_of(id, container));
    Ok(inside(target) && closed.into_iter().any(inside))
}

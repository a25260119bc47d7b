// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while correlating markers with transitions.

use thiserror::Error;

/// Why a scenario could not be extracted for one marker.
///
/// Each marker is extracted independently, so one of these never affects
/// the other markers of the same batch.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// The transition log holds no transition that played to completion.
    #[error("no successfully finished transitions for marker `{tag}`")]
    NoCompleteTransition {
        /// Tag of the marker being matched.
        tag: String,
    },

    /// A filter stage removed every remaining candidate.
    #[error(
        "required an associated transition for marker `{tag}` but none left after {stage}/{stages} filters"
    )]
    NoTransitionLeft {
        /// Tag of the marker being matched.
        tag: String,
        /// One-based position of the filter that emptied the list.
        stage: usize,
        /// Total number of filters in the pipeline.
        stages: usize,
    },

    /// More than one transition survived every filter.
    #[error("expected exactly one transition for marker `{tag}`, got {count}: {ids:?}")]
    AmbiguousCorrelation {
        /// Tag of the marker being matched.
        tag: String,
        /// Number of surviving transitions.
        count: usize,
        /// Ids of the surviving transitions.
        ids: Vec<i32>,
    },

    /// A trampoline candidate opens more than one element.
    #[error("transition {transition} opens {count} elements; cannot resolve trampoline")]
    AmbiguousTrampoline {
        /// The transition with several candidates.
        transition: i32,
        /// Number of opened or raised elements.
        count: usize,
    },

    /// Slicing or trace lookup failed.
    #[error(transparent)]
    Core(#[from] flicker_core::Error),
}

/// Result alias for extraction.
pub type Result<T, E = ExtractionError> = core::result::Result<T, E>;

// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scenario extraction: from a long trace, markers, and the transition log
//! to time-bounded [`ScenarioInstance`]s.
//!
//! ```text
//!   Marker (tag, start, end) ──► TransitionMatcher::find() ──► Option<&Transition>
//!                                        │
//!            complete-only ─► main ─► in-range ─► exclusion ─► trampoline ─► final
//!                                        │
//!   Commit log ──► boundaries ──► Trace::slice() ──► ScenarioInstance
//! ```

mod extractor;
mod filter;
mod marker;
mod matcher;
mod scenario;
mod transition;

pub use extractor::{ExtractorConfig, ScenarioExtractor};
pub use filter::{FilterContext, TransitionFilter};
pub use marker::{Marker, group_by_tag};
pub use matcher::{MatcherConfig, TransitionMatcher};
pub use scenario::{ScenarioInstance, ScenarioType};
pub use transition::{Commit, TransitMode, Transition, TransitionChange, TransitionType};

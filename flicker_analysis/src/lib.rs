// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sequential trace assertions and scenario extraction.
//!
//! `flicker_analysis` works on traces reconstructed by [`flicker_core`]:
//!
//! ```text
//!   Capture ──► BuiltCapture { Trace<Frame>, markers, transitions, commits }
//!                      │
//!                      ▼
//!   ScenarioExtractor::extract() ──► Vec<Result<ScenarioInstance>>
//!                                              │
//!                                              ▼
//!   AssertionsChecker<Frame>::run(scenario.trace) ──► Result<(), AssertionFailure>
//! ```
//!
//! **[`assertions`]**: The ordered assertion machine, frame predicates,
//! whole-trace checks, and the [`CheckSink`](assertions::CheckSink)
//! observer trait.
//!
//! **[`extract`]**: Markers, the transition and commit logs, the
//! transition matcher pipeline, and scenario boundaries.
//!
//! **[`capture`]**: A serializable bundle of every stream of one capture.

pub mod assertions;
pub mod capture;
pub mod error;
pub mod extract;

pub use error::{ExtractionError, Result};

// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The sequential assertion machine and the checks it runs.
//!
//! [`AssertionsChecker`] walks a trace with a cursor into an ordered list of
//! named predicates. A run either passes or yields one [`AssertionFailure`]
//! that names the assertion and entry responsible. Progress is reported to
//! an optional [`CheckSink`].

mod checker;
mod failure;
pub mod predicates;
mod sink;
pub mod trace_checks;

pub use checker::{AssertionsChecker, Predicate};
pub use failure::{AssertionFailure, FailureKind};
pub use sink::{AdvanceEvent, CheckSink, NullSink, RunBeginEvent, RunEndEvent, StepEvent};

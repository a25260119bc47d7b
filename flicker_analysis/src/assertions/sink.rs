// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observation hooks for assertion runs.
//!
//! [`CheckSink`] has one method per event the assertion machine emits while
//! it walks a trace. All methods default to no-ops, so implementing only the
//! events you care about is fine. Diagnostics crates record, print, or export
//! these events; the machine itself never depends on what a sink does.

use flicker_core::time::Timestamp;

use super::failure::FailureKind;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted once before the first entry is evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunBeginEvent {
    /// Number of assertion blocks.
    pub assertions: usize,
    /// Number of entries in the trace.
    pub entries: usize,
    /// Whether leading failures are ignored until the first pass.
    pub skip_until_first_match: bool,
}

/// Emitted after every predicate evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepEvent<'a> {
    /// Position of the assertion at the cursor.
    pub assertion_index: usize,
    /// Name of the assertion at the cursor.
    pub name: &'a str,
    /// Position of the entry.
    pub entry_index: usize,
    /// Time of the entry.
    pub timestamp: Timestamp,
    /// Whether the predicate held.
    pub passed: bool,
}

/// Emitted when the cursor moves to a later assertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdvanceEvent {
    /// Cursor before the move.
    pub from: usize,
    /// Cursor after the move; equal to the assertion count when exhausted.
    pub to: usize,
    /// Entry being evaluated when the cursor moved.
    pub entry_index: usize,
    /// `true` when an optional assertion that never held was skipped,
    /// `false` for a transition away from a satisfied assertion.
    pub skipped_optional: bool,
}

/// Emitted when the run completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunEndEvent {
    /// Number of predicate evaluations performed.
    pub steps: usize,
    /// Cursor when the run stopped.
    pub cursor: usize,
    /// `None` when the trace was accepted.
    pub failure: Option<FailureKind>,
}

// ---------------------------------------------------------------------------
// CheckSink trait
// ---------------------------------------------------------------------------

/// Receives assertion machine events.
pub trait CheckSink {
    /// Called before the first step.
    fn on_run_begin(&mut self, _e: &RunBeginEvent) {}

    /// Called after each predicate evaluation.
    fn on_step(&mut self, _e: &StepEvent<'_>) {}

    /// Called when the cursor advances.
    fn on_advance(&mut self, _e: &AdvanceEvent) {}

    /// Called when a leading entry is skipped before the first pass.
    fn on_entry_skipped(&mut self, _entry_index: usize, _timestamp: Timestamp) {}

    /// Called once the run is decided.
    fn on_run_end(&mut self, _e: &RunEndEvent) {}
}

/// A sink that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl CheckSink for NullSink {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingSink {
        steps: usize,
    }

    impl CheckSink for CountingSink {
        fn on_step(&mut self, _e: &StepEvent<'_>) {
            self.steps += 1;
        }
    }

    #[test]
    fn default_methods_are_no_ops() {
        let mut sink = CountingSink::default();
        sink.on_run_begin(&RunBeginEvent {
            assertions: 1,
            entries: 1,
            skip_until_first_match: false,
        });
        sink.on_step(&StepEvent {
            assertion_index: 0,
            name: "A",
            entry_index: 0,
            timestamp: Timestamp::EMPTY,
            passed: true,
        });
        sink.on_entry_skipped(0, Timestamp::EMPTY);
        assert_eq!(sink.steps, 1, "only the overridden hook counts");
    }
}

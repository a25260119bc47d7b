// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use flicker_core::time::Timestamp;
use thiserror::Error;

/// Which rule of the assertion machine rejected the trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A required assertion failed on an entry it was responsible for.
    Violated,
    /// The last assertion stopped holding and entries remain.
    NoAssertionsLeft,
    /// The trace ended while a required assertion was still active and
    /// later required assertions were never exercised.
    NeverTransitioned,
    /// Skip-until-first-match consumed every entry without a pass.
    NeverPassed,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Violated => "assertion failed",
            Self::NoAssertionsLeft => "no assertions left",
            Self::NeverTransitioned => "assertion never transitioned",
            Self::NeverPassed => "assertion never passed",
        })
    }
}

/// The negative outcome of an assertion run.
///
/// Carries enough context to find the offending entry without re-running
/// the capture: the named assertion, the entry position and time, the
/// predicate's reason, and the assertions that did and did not fire.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}: `{assertion}` at entry {entry_index} ({timestamp}): {reason}")]
pub struct AssertionFailure {
    /// Which rule failed.
    pub kind: FailureKind,
    /// Name of the assertion the failure is attributed to.
    pub assertion: String,
    /// Zero-based position of the entry.
    pub entry_index: usize,
    /// Time of the entry.
    pub timestamp: Timestamp,
    /// Human-readable explanation.
    pub reason: String,
    /// Assertions before the cursor when the run stopped.
    pub passed: Vec<String>,
    /// Assertions after the cursor when the run stopped.
    pub untested: Vec<String>,
    /// One line per evaluated step, `i/n:[name]\tEntry: j/m`.
    pub log: Vec<String>,
}

impl AssertionFailure {
    /// Formats the failure with the passed and untested lists, one per line.
    #[must_use]
    pub fn report(&self) -> String {
        use core::fmt::Write;

        let mut out = self.to_string();
        for name in &self.passed {
            let _ = write!(out, "\n    Passed: {name}");
        }
        for name in &self.untested {
            let _ = write!(out, "\n    Untested: {name}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_assertion_and_entry() {
        let failure = AssertionFailure {
            kind: FailureKind::Violated,
            assertion: "A".into(),
            entry_index: 3,
            timestamp: Timestamp::from_elapsed(1_000_000),
            reason: "value was 0".into(),
            passed: vec!["X".into()],
            untested: vec!["B".into()],
            log: Vec::new(),
        };
        let text = failure.to_string();
        assert!(text.starts_with("assertion failed: `A` at entry 3"), "got: {text}");
        assert!(text.ends_with("value was 0"), "got: {text}");
        let report = failure.report();
        assert!(report.contains("Passed: X"), "got: {report}");
        assert!(report.contains("Untested: B"), "got: {report}");
    }
}

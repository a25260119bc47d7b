// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable assertion run output.
//!
//! [`PrettyPrintSink`] implements [`CheckSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Entry times
//! are printed in milliseconds on a chosen [`TimeField`].

use std::io::Write;

use flicker_analysis::assertions::{AdvanceEvent, CheckSink, RunBeginEvent, RunEndEvent, StepEvent};
use flicker_core::time::{TimeField, Timestamp};

/// Writes human-readable check lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    clock: TimeField,
    steps: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("clock", &self.clock)
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(clock: TimeField) -> Self {
        Self::with_writer(Box::new(std::io::stderr()), clock)
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, clock: TimeField) -> Self {
        Self::with_writer(writer, clock)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    ///
    /// Passing steps are suppressed until [`with_steps`](Self::with_steps)
    /// turns them on; failing steps are always printed.
    #[must_use]
    pub fn with_writer(writer: W, clock: TimeField) -> Self {
        Self {
            writer,
            clock,
            steps: false,
        }
    }

    /// Prints every predicate evaluation, not only the failing ones.
    #[must_use]
    pub fn with_steps(mut self, steps: bool) -> Self {
        self.steps = steps;
        self
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn ms(&self, t: Timestamp) -> String {
        t.get(self.clock)
            .map_or_else(|| String::from("?"), |ns| format!("{:.3}ms", ns as f64 / 1e6))
    }
}

impl<W: Write> CheckSink for PrettyPrintSink<W> {
    fn on_run_begin(&mut self, e: &RunBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[run:begin] assertions={} entries={} skip_until_first_match={}",
            e.assertions, e.entries, e.skip_until_first_match,
        );
    }

    fn on_step(&mut self, e: &StepEvent<'_>) {
        if e.passed && !self.steps {
            return;
        }
        let verdict = if e.passed { "ok" } else { "FAIL" };
        let _ = writeln!(
            self.writer,
            "[step] entry={} at {} #{} `{}` {verdict}",
            e.entry_index,
            self.ms(e.timestamp),
            e.assertion_index,
            e.name,
        );
    }

    fn on_advance(&mut self, e: &AdvanceEvent) {
        let how = if e.skipped_optional { "skip" } else { "next" };
        let _ = writeln!(
            self.writer,
            "[advance] {how} {} -> {} at entry={}",
            e.from, e.to, e.entry_index,
        );
    }

    fn on_entry_skipped(&mut self, entry_index: usize, timestamp: Timestamp) {
        if !self.steps {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[skipped] entry={entry_index} at {}",
            self.ms(timestamp),
        );
    }

    fn on_run_end(&mut self, e: &RunEndEvent) {
        let outcome = e
            .failure
            .map_or_else(|| String::from("ok"), |kind| kind.to_string());
        let _ = writeln!(
            self.writer,
            "[run:end] steps={} cursor={} outcome={outcome}",
            e.steps, e.cursor,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flicker_analysis::assertions::FailureKind;

    #[test]
    fn passing_steps_are_quiet_by_default() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), TimeField::Elapsed);
        let step = |passed| StepEvent {
            assertion_index: 0,
            name: "app is visible",
            entry_index: 3,
            timestamp: Timestamp::from_elapsed(2_500_000),
            passed,
        };
        sink.on_step(&step(true));
        sink.on_step(&step(false));
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(output.lines().count(), 1, "got: {output}");
        assert!(output.contains("FAIL"), "got: {output}");
        assert!(output.contains("2.500ms"), "got: {output}");
    }

    #[test]
    fn run_end_names_the_failure() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), TimeField::Elapsed).with_steps(true);
        sink.on_run_end(&RunEndEvent {
            steps: 4,
            cursor: 1,
            failure: Some(FailureKind::NeverTransitioned),
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("[run:end] steps=4"), "got: {output}");
        assert!(output.contains(&FailureKind::NeverTransitioned.to_string()), "got: {output}");
    }

    #[test]
    fn missing_clock_prints_placeholder() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), TimeField::Unix).with_steps(true);
        sink.on_entry_skipped(0, Timestamp::from_elapsed(1));
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("at ?"), "got: {output}");
    }
}

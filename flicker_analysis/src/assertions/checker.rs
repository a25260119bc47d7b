// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use flicker_core::trace::TraceEntry;

use super::failure::{AssertionFailure, FailureKind};
use super::sink::{AdvanceEvent, CheckSink, NullSink, RunBeginEvent, RunEndEvent, StepEvent};

/// A check over one trace entry: `Ok(())` when it holds, otherwise a
/// human-readable reason.
pub type Predicate<T> = Box<dyn Fn(&T) -> Result<(), String> + Send + Sync>;

struct NamedPredicate<T> {
    name: String,
    optional: bool,
    check: Predicate<T>,
}

/// One position in the assertion list: one or more predicates that must all
/// hold on the same entry.
struct AssertionBlock<T> {
    name: String,
    parts: Vec<NamedPredicate<T>>,
}

impl<T> AssertionBlock<T> {
    fn new(part: NamedPredicate<T>) -> Self {
        Self {
            name: part.name.clone(),
            parts: vec![part],
        }
    }

    fn push(&mut self, part: NamedPredicate<T>) {
        self.name.push_str(" and ");
        self.name.push_str(&part.name);
        self.parts.push(part);
    }

    /// A block is optional only if every part is.
    fn is_optional(&self) -> bool {
        self.parts.iter().all(|p| p.optional)
    }

    fn evaluate(&self, entry: &T) -> Result<(), String> {
        for part in &self.parts {
            if let Err(reason) = (part.check)(entry) {
                return Err(if self.parts.len() > 1 {
                    format!("{}: {reason}", part.name)
                } else {
                    reason
                });
            }
        }
        Ok(())
    }
}

/// Checks an ordered list of named predicates against a sequence of entries.
///
/// Starting at the first assertion and the first entry, the active assertion
/// must hold on every entry until it stops holding, at which point the next
/// assertion takes over on that same entry. Each required assertion must
/// hold for at least one entry, and every required assertion except the
/// last one must eventually hand over to its successor.
///
/// ```
/// # use flicker_analysis::assertions::AssertionsChecker;
/// # use flicker_core::time::Timestamp;
/// # use flicker_core::trace::TraceEntry;
/// struct Sample(Timestamp, u32);
/// impl TraceEntry for Sample {
///     fn timestamp(&self) -> &Timestamp { &self.0 }
/// }
///
/// let mut checker = AssertionsChecker::new();
/// checker
///     .add("is 42", |s: &Sample| if s.1 == 42 { Ok(()) } else { Err(format!("was {}", s.1)) })
///     .add("is 0", |s: &Sample| if s.1 == 0 { Ok(()) } else { Err(format!("was {}", s.1)) });
/// let samples: Vec<_> = [42, 0, 0]
///     .into_iter()
///     .enumerate()
///     .map(|(i, v)| Sample(Timestamp::from_elapsed(i as u64 + 1), v))
///     .collect();
/// assert!(checker.run(&samples).is_ok());
/// ```
pub struct AssertionsChecker<T> {
    blocks: Vec<AssertionBlock<T>>,
    skip_until_first_match: bool,
}

impl<T> Default for AssertionsChecker<T> {
    fn default() -> Self {
        Self {
            blocks: Vec::new(),
            skip_until_first_match: false,
        }
    }
}

impl<T> fmt::Debug for AssertionsChecker<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssertionsChecker")
            .field("assertions", &self.names().collect::<Vec<_>>())
            .field("skip_until_first_match", &self.skip_until_first_match)
            .finish()
    }
}

impl<T> AssertionsChecker<T> {
    /// Creates an empty checker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push_block(&mut self, name: String, optional: bool, check: Predicate<T>) -> &mut Self {
        self.blocks.push(AssertionBlock::new(NamedPredicate {
            name,
            optional,
            check,
        }));
        self
    }

    /// Adds a required assertion in a new position.
    pub fn add<F>(&mut self, name: impl Into<String>, predicate: F) -> &mut Self
    where
        F: Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    {
        self.push_block(name.into(), false, Box::new(predicate))
    }

    /// Adds an optional assertion in a new position. An optional assertion
    /// that never holds is skipped.
    pub fn add_optional<F>(&mut self, name: impl Into<String>, predicate: F) -> &mut Self
    where
        F: Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    {
        self.push_block(name.into(), true, Box::new(predicate))
    }

    /// Adds a predicate to the last position, so that it must hold on the
    /// same entries as the predicates already there. Starts a new position
    /// when the checker is empty.
    pub fn append<F>(&mut self, name: impl Into<String>, predicate: F) -> &mut Self
    where
        F: Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    {
        let part = NamedPredicate {
            name: name.into(),
            optional: false,
            check: Box::new(predicate),
        };
        match self.blocks.last_mut() {
            Some(block) => block.push(part),
            None => self.blocks.push(AssertionBlock::new(part)),
        }
        self
    }

    /// Ignores failures on leading entries until the first assertion passes.
    pub fn skip_until_first_match(&mut self) -> &mut Self {
        self.skip_until_first_match = true;
        self
    }

    /// Number of positions in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if no assertion was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Names of each position, compound positions joined with `and`.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.blocks.iter().map(|b| b.name.as_str())
    }
}

impl<T: TraceEntry> AssertionsChecker<T> {
    /// Runs the assertions over `entries`.
    ///
    /// An empty checker or an empty sequence passes.
    ///
    /// # Errors
    ///
    /// An [`AssertionFailure`] naming the assertion and entry that broke
    /// the ordering contract.
    pub fn run<'a, I>(&self, entries: I) -> Result<(), AssertionFailure>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        self.run_with_sink(entries, &mut NullSink)
    }

    /// Like [`run`](Self::run), reporting every step to `sink`.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub fn run_with_sink<'a, I>(
        &self,
        entries: I,
        sink: &mut dyn CheckSink,
    ) -> Result<(), AssertionFailure>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let entries: Vec<&T> = entries.into_iter().collect();
        sink.on_run_begin(&RunBeginEvent {
            assertions: self.blocks.len(),
            entries: entries.len(),
            skip_until_first_match: self.skip_until_first_match,
        });
        let mut run = Run::new(self, &entries);
        let result = run.execute(sink);
        sink.on_run_end(&RunEndEvent {
            steps: run.steps,
            cursor: run.cursor,
            failure: result.as_ref().err().map(|f| f.kind),
        });
        result
    }
}

/// Mutable state of one run.
struct Run<'c, 'e, T> {
    checker: &'c AssertionsChecker<T>,
    entries: &'e [&'e T],
    satisfied: Vec<bool>,
    any_passed: bool,
    cursor: usize,
    entry: usize,
    last_reason: String,
    steps: usize,
    log: Vec<String>,
}

impl<'c, 'e, T: TraceEntry> Run<'c, 'e, T> {
    fn new(checker: &'c AssertionsChecker<T>, entries: &'e [&'e T]) -> Self {
        Self {
            checker,
            entries,
            satisfied: vec![false; checker.blocks.len()],
            any_passed: false,
            cursor: 0,
            entry: 0,
            last_reason: String::new(),
            steps: 0,
            log: Vec::new(),
        }
    }

    fn execute(&mut self, sink: &mut dyn CheckSink) -> Result<(), AssertionFailure> {
        let checker = self.checker;
        let blocks = &checker.blocks;
        if blocks.is_empty() || self.entries.is_empty() {
            return Ok(());
        }
        let (n, m) = (blocks.len(), self.entries.len());

        while self.entry < m {
            if self.cursor == n {
                let reason = format!(
                    "{} entries remain after the last assertion stopped holding: {}",
                    m - self.entry,
                    self.last_reason
                );
                return Err(self.failure(FailureKind::NoAssertionsLeft, n - 1, self.entry, reason));
            }
            let block = &blocks[self.cursor];
            let current = self.entries[self.entry];
            self.log.push(format!(
                "{}/{n}:[{}]\tEntry: {}/{m}",
                self.cursor + 1,
                block.name,
                self.entry + 1
            ));
            self.steps += 1;
            let outcome = block.evaluate(current);
            sink.on_step(&StepEvent {
                assertion_index: self.cursor,
                name: &block.name,
                entry_index: self.entry,
                timestamp: *current.timestamp(),
                passed: outcome.is_ok(),
            });

            let reason = match outcome {
                Ok(()) => {
                    self.satisfied[self.cursor] = true;
                    self.any_passed = true;
                    self.entry += 1;
                    continue;
                }
                Err(reason) => reason,
            };

            let was_satisfied = self.satisfied[self.cursor];
            if was_satisfied || block.is_optional() {
                tracing::trace!(
                    from = self.cursor,
                    entry = self.entry,
                    optional_skip = !was_satisfied,
                    "assertion cursor advanced"
                );
                sink.on_advance(&AdvanceEvent {
                    from: self.cursor,
                    to: self.cursor + 1,
                    entry_index: self.entry,
                    skipped_optional: !was_satisfied,
                });
                self.cursor += 1;
                self.last_reason = reason;
                continue;
            }
            if checker.skip_until_first_match && !self.any_passed {
                sink.on_entry_skipped(self.entry, *current.timestamp());
                self.entry += 1;
                continue;
            }
            return Err(self.failure(FailureKind::Violated, self.cursor, self.entry, reason));
        }

        if checker.skip_until_first_match && !self.any_passed {
            let reason = format!("no entry satisfied `{}`", blocks[0].name);
            return Err(self.failure(FailureKind::NeverPassed, 0, m - 1, reason));
        }

        if blocks[self.cursor + 1..].iter().any(|b| !b.is_optional()) {
            let reason = format!(
                "trace ended while `{}` still held; later required assertions were never exercised",
                blocks[self.cursor].name
            );
            return Err(self.failure(FailureKind::NeverTransitioned, self.cursor, m - 1, reason));
        }
        Ok(())
    }

    fn failure(
        &mut self,
        kind: FailureKind,
        assertion: usize,
        entry: usize,
        reason: String,
    ) -> AssertionFailure {
        let names: Vec<String> = self.checker.names().map(String::from).collect();
        let split = assertion.min(names.len());
        AssertionFailure {
            kind,
            assertion: names.get(assertion).cloned().unwrap_or_default(),
            entry_index: entry,
            timestamp: *self.entries[entry].timestamp(),
            reason,
            passed: names[..split].to_vec(),
            untested: names.get(split + 1..).map(<[String]>::to_vec).unwrap_or_default(),
            log: core::mem::take(&mut self.log),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertions::sink::CheckSink;
    use flicker_core::time::Timestamp;

    struct Sample {
        ts: Timestamp,
        value: u32,
    }

    impl TraceEntry for Sample {
        fn timestamp(&self) -> &Timestamp {
            &self.ts
        }
    }

    fn samples(values: &[u32]) -> Vec<Sample> {
        values
            .iter()
            .zip(1_u64..)
            .map(|(&value, t)| Sample {
                ts: Timestamp::from_elapsed(t * 1_000),
                value,
            })
            .collect()
    }

    fn equals(expected: u32) -> impl Fn(&Sample) -> Result<(), String> + Send + Sync + 'static {
        move |s: &Sample| {
            if s.value == expected {
                Ok(())
            } else {
                Err(format!("expected {expected}, was {}", s.value))
            }
        }
    }

    fn a_then_b() -> AssertionsChecker<Sample> {
        let mut checker = AssertionsChecker::new();
        checker.add("A", equals(42)).add("B", equals(0));
        checker
    }

    #[test]
    fn ordered_transition_passes() {
        assert!(a_then_b().run(&samples(&[42, 0, 0, 0, 0])).is_ok());
    }

    #[test]
    fn first_entry_violation_fails_immediately() {
        let failure = a_then_b().run(&samples(&[0, 0, 0, 0, 0])).unwrap_err();
        assert_eq!(failure.kind, FailureKind::Violated);
        assert_eq!(failure.assertion, "A");
        assert_eq!(failure.entry_index, 0);
        assert_eq!(failure.timestamp, Timestamp::from_elapsed(1_000));
        assert_eq!(failure.untested, vec![String::from("B")]);
    }

    #[test]
    fn stuck_on_first_assertion_fails() {
        let failure = a_then_b().run(&samples(&[42; 5])).unwrap_err();
        assert_eq!(failure.kind, FailureKind::NeverTransitioned);
        assert_eq!(failure.assertion, "A");
        assert_eq!(failure.entry_index, 4);
    }

    #[test]
    fn optional_that_never_holds_is_skipped() {
        let mut checker = AssertionsChecker::new();
        checker
            .add_optional("X", equals(1))
            .add("A", equals(42))
            .add("B", equals(0));
        assert!(checker.run(&samples(&[42, 0, 0, 0, 0])).is_ok());
    }

    #[test]
    fn trailing_optional_need_not_transition() {
        let mut checker = AssertionsChecker::new();
        checker.add("A", equals(42)).add_optional("X", equals(1));
        assert!(checker.run(&samples(&[42, 42])).is_ok());
    }

    #[test]
    fn running_out_of_assertions_fails() {
        let failure = a_then_b().run(&samples(&[42, 0, 7])).unwrap_err();
        assert_eq!(failure.kind, FailureKind::NoAssertionsLeft);
        assert_eq!(failure.assertion, "B");
        assert_eq!(failure.entry_index, 2);
        assert_eq!(failure.passed, vec![String::from("A")]);
    }

    #[test]
    fn transition_to_failing_required_assertion_fails() {
        let failure = a_then_b().run(&samples(&[42, 7])).unwrap_err();
        assert_eq!(failure.kind, FailureKind::Violated);
        assert_eq!(failure.assertion, "B");
        assert_eq!(failure.entry_index, 1);
    }

    #[test]
    fn empty_inputs_pass() {
        assert!(a_then_b().run(&samples(&[])).is_ok(), "empty trace");
        assert!(AssertionsChecker::<Sample>::new().run(&samples(&[1])).is_ok(), "no assertions");
    }

    #[test]
    fn skip_until_first_match_ignores_leading_entries() {
        let mut checker = a_then_b();
        checker.skip_until_first_match();
        assert!(checker.run(&samples(&[7, 7, 42, 0])).is_ok());
    }

    #[test]
    fn skip_until_first_match_without_pass_fails() {
        let mut checker = a_then_b();
        checker.skip_until_first_match();
        let failure = checker.run(&samples(&[7, 7, 7])).unwrap_err();
        assert_eq!(failure.kind, FailureKind::NeverPassed);
        assert_eq!(failure.assertion, "A");
    }

    #[test]
    fn skip_stops_after_first_pass() {
        let mut checker = a_then_b();
        checker.skip_until_first_match();
        let failure = checker.run(&samples(&[7, 42, 7])).unwrap_err();
        assert_eq!(failure.kind, FailureKind::Violated);
        assert_eq!(failure.assertion, "B");
    }

    #[test]
    fn appended_predicates_must_hold_together() {
        let mut checker = AssertionsChecker::new();
        checker
            .add("even", |s: &Sample| {
                if s.value % 2 == 0 { Ok(()) } else { Err("odd".into()) }
            })
            .append("small", |s: &Sample| {
                if s.value < 10 { Ok(()) } else { Err("large".into()) }
            });
        assert_eq!(checker.len(), 1);
        assert_eq!(checker.names().next(), Some("even and small"));
        let failure = checker.run(&samples(&[2, 4, 12])).unwrap_err();
        assert_eq!(failure.kind, FailureKind::NoAssertionsLeft);
        assert!(failure.reason.contains("small: large"), "got: {}", failure.reason);
    }

    #[test]
    fn step_log_records_positions() {
        let failure = a_then_b().run(&samples(&[42, 0, 7])).unwrap_err();
        assert_eq!(failure.log[0], "1/2:[A]\tEntry: 1/3");
        assert_eq!(failure.log[1], "1/2:[A]\tEntry: 2/3");
        assert_eq!(failure.log[2], "2/2:[B]\tEntry: 2/3");
        assert_eq!(failure.log[3], "2/2:[B]\tEntry: 3/3");
        assert_eq!(failure.log.len(), 4);
    }

    #[derive(Default)]
    struct Counts {
        steps: usize,
        advances: usize,
        skipped: usize,
        end: Option<RunEndEvent>,
    }

    impl CheckSink for Counts {
        fn on_step(&mut self, _e: &StepEvent<'_>) {
            self.steps += 1;
        }

        fn on_advance(&mut self, _e: &AdvanceEvent) {
            self.advances += 1;
        }

        fn on_entry_skipped(&mut self, _entry_index: usize, _timestamp: Timestamp) {
            self.skipped += 1;
        }

        fn on_run_end(&mut self, e: &RunEndEvent) {
            self.end = Some(*e);
        }
    }

    #[test]
    fn sink_observes_run() {
        let mut checker = a_then_b();
        checker.skip_until_first_match();
        let mut sink = Counts::default();
        checker
            .run_with_sink(&samples(&[7, 42, 0, 0]), &mut sink)
            .unwrap();
        assert_eq!(sink.skipped, 1);
        assert_eq!(sink.advances, 1);
        assert_eq!(sink.steps, 5);
        let end = sink.end.unwrap();
        assert_eq!(end.cursor, 1);
        assert!(end.failure.is_none(), "run passed");
    }
}

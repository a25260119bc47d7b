// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary recording of assertion runs.
//!
//! [`RecorderSink`] implements [`CheckSink`] and encodes events into a
//! `Vec<u8>` as little-endian records. [`decode`] reads them back as an
//! iterator of [`RecordedEvent`].
//!
//! Timestamps keep all three clocks, with zero standing for an absent clock.
//! Assertion names are stored as a length-prefixed UTF-8 string. An unknown
//! record tag or failure kind ends decoding.

use flicker_analysis::assertions::{
    AdvanceEvent, CheckSink, FailureKind, RunBeginEvent, RunEndEvent, StepEvent,
};
use flicker_core::time::{TimeField, Timestamp};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_RUN_BEGIN: u8 = 1;
const TAG_STEP: u8 = 2;
const TAG_ADVANCE: u8 = 3;
const TAG_ENTRY_SKIPPED: u8 = 4;
const TAG_RUN_END: u8 = 5;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`CheckSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_usize(&mut self, v: usize) {
        self.write_u64(u64::try_from(v).unwrap_or(u64::MAX));
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_timestamp(&mut self, t: Timestamp) {
        for field in [TimeField::Elapsed, TimeField::SystemUptime, TimeField::Unix] {
            self.write_u64(t.get(field).unwrap_or(0));
        }
    }

    fn write_str(&mut self, s: &str) {
        let bytes = s.as_bytes();
        let len = u32::try_from(bytes.len()).unwrap_or(u32::MAX);
        self.write_u32(len);
        self.buf.extend_from_slice(&bytes[..len as usize]);
    }

    fn write_failure(&mut self, kind: Option<FailureKind>) {
        self.write_u8(match kind {
            None => 0,
            Some(FailureKind::Violated) => 1,
            Some(FailureKind::NoAssertionsLeft) => 2,
            Some(FailureKind::NeverTransitioned) => 3,
            Some(FailureKind::NeverPassed) => 4,
        });
    }
}

impl CheckSink for RecorderSink {
    fn on_run_begin(&mut self, e: &RunBeginEvent) {
        self.write_u8(TAG_RUN_BEGIN);
        self.write_usize(e.assertions);
        self.write_usize(e.entries);
        self.write_bool(e.skip_until_first_match);
    }

    fn on_step(&mut self, e: &StepEvent<'_>) {
        self.write_u8(TAG_STEP);
        self.write_usize(e.assertion_index);
        self.write_str(e.name);
        self.write_usize(e.entry_index);
        self.write_timestamp(e.timestamp);
        self.write_bool(e.passed);
    }

    fn on_advance(&mut self, e: &AdvanceEvent) {
        self.write_u8(TAG_ADVANCE);
        self.write_usize(e.from);
        self.write_usize(e.to);
        self.write_usize(e.entry_index);
        self.write_bool(e.skipped_optional);
    }

    fn on_entry_skipped(&mut self, entry_index: usize, timestamp: Timestamp) {
        self.write_u8(TAG_ENTRY_SKIPPED);
        self.write_usize(entry_index);
        self.write_timestamp(timestamp);
    }

    fn on_run_end(&mut self, e: &RunEndEvent) {
        self.write_u8(TAG_RUN_END);
        self.write_usize(e.steps);
        self.write_usize(e.cursor);
        self.write_failure(e.failure);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A predicate evaluation, with an owned assertion name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedStep {
    /// Position of the assertion at the cursor.
    pub assertion_index: usize,
    /// Name of the assertion at the cursor.
    pub name: String,
    /// Position of the entry.
    pub entry_index: usize,
    /// Time of the entry.
    pub timestamp: Timestamp,
    /// Whether the predicate held.
    pub passed: bool,
}

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`RunBeginEvent`].
    RunBegin(RunBeginEvent),
    /// A [`StepEvent`].
    Step(RecordedStep),
    /// An [`AdvanceEvent`].
    Advance(AdvanceEvent),
    /// A leading entry skipped before the first pass.
    EntrySkipped {
        /// Position of the entry.
        entry_index: usize,
        /// Time of the entry.
        timestamp: Timestamp,
    },
    /// A [`RunEndEvent`].
    RunEnd(RunEndEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take(&mut self, n: usize) -> Option<&[u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.take(4)?.try_into().ok()?))
    }

    fn read_u64(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.take(8)?.try_into().ok()?))
    }

    fn read_usize(&mut self) -> Option<usize> {
        usize::try_from(self.read_u64()?).ok()
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_timestamp(&mut self) -> Option<Timestamp> {
        let elapsed = self.read_u64()?;
        let system_uptime = self.read_u64()?;
        let unix = self.read_u64()?;
        Some(Timestamp::new(elapsed, system_uptime, unix))
    }

    fn read_string(&mut self) -> Option<String> {
        let len = usize::try_from(self.read_u32()?).ok()?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).ok()
    }

    fn read_failure(&mut self) -> Option<Option<FailureKind>> {
        Some(match self.read_u8()? {
            0 => None,
            1 => Some(FailureKind::Violated),
            2 => Some(FailureKind::NoAssertionsLeft),
            3 => Some(FailureKind::NeverTransitioned),
            4 => Some(FailureKind::NeverPassed),
            _ => return None,
        })
    }

    fn decode_run_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::RunBegin(RunBeginEvent {
            assertions: self.read_usize()?,
            entries: self.read_usize()?,
            skip_until_first_match: self.read_bool()?,
        }))
    }

    fn decode_step(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Step(RecordedStep {
            assertion_index: self.read_usize()?,
            name: self.read_string()?,
            entry_index: self.read_usize()?,
            timestamp: self.read_timestamp()?,
            passed: self.read_bool()?,
        }))
    }

    fn decode_advance(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Advance(AdvanceEvent {
            from: self.read_usize()?,
            to: self.read_usize()?,
            entry_index: self.read_usize()?,
            skipped_optional: self.read_bool()?,
        }))
    }

    fn decode_entry_skipped(&mut self) -> Option<RecordedEvent> {
        let entry_index = self.read_usize()?;
        let timestamp = self.read_timestamp()?;
        Some(RecordedEvent::EntrySkipped {
            entry_index,
            timestamp,
        })
    }

    fn decode_run_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::RunEnd(RunEndEvent {
            steps: self.read_usize()?,
            cursor: self.read_usize()?,
            failure: self.read_failure()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_RUN_BEGIN => self.decode_run_begin(),
            TAG_STEP => self.decode_step(),
            TAG_ADVANCE => self.decode_advance(),
            TAG_ENTRY_SKIPPED => self.decode_entry_skipped(),
            TAG_RUN_END => self.decode_run_end(),
            _ => None, // unknown tag, stop
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use flicker_analysis::assertions::AssertionsChecker;
    use flicker_core::trace::TraceEntry;

    struct Sample {
        value: u32,
        timestamp: Timestamp,
    }

    impl TraceEntry for Sample {
        fn timestamp(&self) -> &Timestamp {
            &self.timestamp
        }
    }

    fn samples(values: &[u32]) -> Vec<Sample> {
        values
            .iter()
            .zip(1_u64..)
            .map(|(&value, i)| Sample {
                value,
                timestamp: Timestamp::new(i * 10, i, 0),
            })
            .collect()
    }

    fn record(values: &[u32]) -> Vec<RecordedEvent> {
        let mut checker = AssertionsChecker::<Sample>::new();
        checker
            .add("is 42", |s: &Sample| {
                if s.value == 42 { Ok(()) } else { Err(format!("{} != 42", s.value)) }
            })
            .add("is 0", |s: &Sample| {
                if s.value == 0 { Ok(()) } else { Err(format!("{} != 0", s.value)) }
            });
        let mut rec = RecorderSink::new();
        let entries = samples(values);
        let _ = checker.run_with_sink(&entries, &mut rec);
        decode(rec.as_bytes()).collect()
    }

    #[test]
    fn records_a_passing_run() {
        let events = record(&[42, 0]);
        assert!(
            matches!(events.first(), Some(RecordedEvent::RunBegin(b)) if b.assertions == 2 && b.entries == 2),
            "got {events:?}"
        );
        assert!(
            events.iter().any(|e| matches!(e, RecordedEvent::Advance(a) if a.from == 0 && a.to == 1)),
            "cursor moved past the first block: {events:?}"
        );
        match events.last() {
            Some(RecordedEvent::RunEnd(end)) => {
                assert_eq!(end.failure, None, "run accepted");
                assert_eq!(end.cursor, 1, "stopped on the second block");
            }
            other => panic!("expected RunEnd, got {other:?}"),
        }
    }

    #[test]
    fn step_keeps_name_and_clocks() {
        let events = record(&[42]);
        let step = events
            .iter()
            .find_map(|e| match e {
                RecordedEvent::Step(s) => Some(s),
                _ => None,
            })
            .unwrap();
        assert_eq!(step.name, "is 42", "name survives the round trip");
        assert_eq!(step.timestamp.elapsed(), Some(10), "elapsed clock kept");
        assert_eq!(step.timestamp.system_uptime(), Some(1), "uptime clock kept");
        assert_eq!(step.timestamp.unix(), None, "absent clock stays absent");
        assert!(step.passed, "42 satisfies the first block");
    }

    #[test]
    fn records_failure_kind() {
        let events = record(&[7]);
        match events.last() {
            Some(RecordedEvent::RunEnd(end)) => {
                assert_eq!(end.failure, Some(FailureKind::Violated), "first entry violates");
            }
            other => panic!("expected RunEnd, got {other:?}"),
        }
    }

    #[test]
    fn truncated_buffer_stops_cleanly() {
        let mut rec = RecorderSink::new();
        rec.on_entry_skipped(3, Timestamp::from_elapsed(5));
        rec.on_entry_skipped(4, Timestamp::from_elapsed(6));
        let bytes = rec.into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert_eq!(events.len(), 1, "partial trailing record is dropped");
    }

    #[test]
    fn unknown_failure_kind_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_entry_skipped(3, Timestamp::from_elapsed(5));
        rec.on_run_end(&RunEndEvent {
            steps: 2,
            cursor: 1,
            failure: Some(FailureKind::NeverPassed),
        });
        rec.on_entry_skipped(4, Timestamp::from_elapsed(6));
        let mut bytes = rec.into_bytes();
        let failure_at = 1 + 8 + 24 + 1 + 8 + 8;
        assert_eq!(bytes[failure_at], 4, "failure byte of the run end record");
        let events: Vec<_> = decode(&bytes).collect();
        assert_eq!(events.len(), 3, "intact buffer decodes fully");
        assert!(
            matches!(events[1], RecordedEvent::RunEnd(RunEndEvent { failure: Some(FailureKind::NeverPassed), .. })),
            "got {events:?}"
        );

        bytes[failure_at] = 9;
        let events: Vec<_> = decode(&bytes).collect();
        assert_eq!(events.len(), 1, "corrupt run end and everything after it dropped");
        assert!(matches!(events[0], RecordedEvent::EntrySkipped { entry_index: 3, .. }), "got {events:?}");
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty(), "no bytes, no events");
    }
}

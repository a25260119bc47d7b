// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered, timestamp-indexed sequences of frames or events.
//!
//! A [`Trace`] is keyed on one [`TimeField`]: every entry must carry that
//! clock and entries must be non-decreasing on it (ties are allowed).
//! Entries are held behind [`Arc`] so that [`slice`](Trace::slice) produces
//! an independent trace without copying frames.

mod builder;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::scene::{Frame, NodeId, SceneNode};
use crate::time::{TimeField, Timestamp};

pub use builder::{DecodedFrame, TraceBuilder};

/// Anything that can be placed in a [`Trace`].
pub trait TraceEntry {
    /// Capture time of the entry.
    fn timestamp(&self) -> &Timestamp;
}

impl TraceEntry for Frame {
    fn timestamp(&self) -> &Timestamp {
        Self::timestamp(self)
    }
}

/// Options for [`Trace::slice`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceOptions {
    /// Also keep the last entry strictly before `from`, so state-diffing
    /// checks have a starting point.
    pub include_initial_entry: bool,
}

impl SliceOptions {
    /// Options that keep the initial entry.
    pub const WITH_INITIAL: Self = Self {
        include_initial_entry: true,
    };
}

/// An immutable, ordered sequence of entries.
#[derive(Debug)]
pub struct Trace<T> {
    entries: Vec<Arc<T>>,
    key: TimeField,
}

impl<T> Clone for Trace<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            key: self.key,
        }
    }
}

impl<T> Trace<T> {
    /// An empty trace keyed on `key`.
    #[must_use]
    pub fn empty(key: TimeField) -> Self {
        Self {
            entries: Vec::new(),
            key,
        }
    }

    /// The clock entries are ordered by.
    #[inline]
    #[must_use]
    pub fn key(&self) -> TimeField {
        self.key
    }

    /// Number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the trace has no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shared entries in order.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[Arc<T>] {
        &self.entries
    }

    /// Entries in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &T> + DoubleEndedIterator + '_ {
        self.entries.iter().map(|e| &**e)
    }

    /// Entry at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|e| &**e)
    }

    /// First entry.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// Last entry.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.entries.last().map(|e| &**e)
    }
}

impl<T: TraceEntry> Trace<T> {
    /// Creates a trace, checking that every entry carries `key` and that
    /// entries are non-decreasing on it.
    ///
    /// # Errors
    ///
    /// [`Error::MissingTimestamp`] or [`Error::OutOfOrder`].
    pub fn new(entries: Vec<T>, key: TimeField) -> Result<Self> {
        Self::from_shared(entries.into_iter().map(Arc::new).collect(), key)
    }

    /// Like [`new`](Self::new), for entries that are already shared.
    ///
    /// # Errors
    ///
    /// [`Error::MissingTimestamp`] or [`Error::OutOfOrder`].
    pub fn from_shared(entries: Vec<Arc<T>>, key: TimeField) -> Result<Self> {
        let mut prev = 0_u64;
        for (index, entry) in entries.iter().enumerate() {
            let t = entry
                .timestamp()
                .get(key)
                .ok_or(Error::MissingTimestamp { index, field: key })?;
            if index > 0 && t < prev {
                return Err(Error::OutOfOrder { index });
            }
            prev = t;
        }
        Ok(Self { entries, key })
    }

    fn key_of(&self, entry: &T) -> u64 {
        // Presence is checked at construction.
        entry.timestamp().get(self.key).unwrap_or_default()
    }

    fn bound(&self, ts: &Timestamp) -> Result<u64> {
        ts.get(self.key).ok_or(Error::UnkeyedBound(self.key))
    }

    /// Entries with timestamps in `[from, to]`, as a new trace.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRange`] when `from > to`, [`Error::UnkeyedBound`] when
    /// a bound lacks the trace's clock.
    pub fn slice(&self, from: &Timestamp, to: &Timestamp, options: SliceOptions) -> Result<Self> {
        let (from, to) = (self.bound(from)?, self.bound(to)?);
        if from > to {
            return Err(Error::InvalidRange { from, to });
        }
        let start = self.entries.partition_point(|e| self.key_of(e) < from);
        let end = self.entries.partition_point(|e| self.key_of(e) <= to);
        let begin = if options.include_initial_entry {
            start.saturating_sub(1)
        } else {
            start
        };
        Ok(Self {
            entries: self.entries[begin..end].to_vec(),
            key: self.key,
        })
    }

    /// The last entry at or before `ts`, or the first entry when `ts`
    /// precedes the whole trace.
    #[must_use]
    pub fn entry_at(&self, ts: &Timestamp) -> Option<&T> {
        let t = ts.get(self.key)?;
        let idx = self.entries.partition_point(|e| self.key_of(e) <= t);
        self.get(idx.saturating_sub(1))
    }

    /// The first entry at or after `ts`.
    #[must_use]
    pub fn first_at_or_after(&self, ts: &Timestamp) -> Option<&T> {
        let t = ts.get(self.key)?;
        self.get(self.entries.partition_point(|e| self.key_of(e) < t))
    }
}

impl Trace<Frame> {
    /// The first frame whose synchronization counter is at least `counter`.
    /// Frames without a counter are skipped.
    #[must_use]
    pub fn first_with_sync_at_least(&self, counter: u64) -> Option<&Frame> {
        self.iter()
            .find(|f| f.vsync_id().is_some_and(|v| v >= counter))
    }

    /// The first frame containing node `id`, together with the node.
    #[must_use]
    pub fn find_node(&self, id: NodeId) -> Option<(&Frame, &SceneNode)> {
        self.iter().find_map(|f| f.node(id).map(|n| (f, n)))
    }
}

impl<'a, T> IntoIterator for &'a Trace<T> {
    type Item = &'a Arc<T>;
    type IntoIter = core::slice::Iter<'a, Arc<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Event(Timestamp);

    impl TraceEntry for Event {
        fn timestamp(&self) -> &Timestamp {
            &self.0
        }
    }

    fn trace(times: &[u64]) -> Trace<Event> {
        Trace::new(
            times.iter().map(|&t| Event(Timestamp::from_elapsed(t))).collect(),
            TimeField::Elapsed,
        )
        .unwrap()
    }

    fn times(t: &Trace<Event>) -> Vec<u64> {
        t.iter().filter_map(|e| e.0.elapsed()).collect()
    }

    #[test]
    fn rejects_unordered_and_unkeyed() {
        let err = Trace::new(
            vec![Event(Timestamp::from_elapsed(5)), Event(Timestamp::from_elapsed(4))],
            TimeField::Elapsed,
        )
        .unwrap_err();
        assert_eq!(err, Error::OutOfOrder { index: 1 });
        let err = Trace::new(vec![Event(Timestamp::from_unix(5))], TimeField::Elapsed).unwrap_err();
        assert!(matches!(err, Error::MissingTimestamp { index: 0, .. }), "got {err:?}");
    }

    #[test]
    fn zero_reading_has_no_key() {
        let err = Trace::new(
            vec![Event(Timestamp::from_elapsed(0)), Event(Timestamp::from_elapsed(100))],
            TimeField::Elapsed,
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::MissingTimestamp { index: 0, field: TimeField::Elapsed },
            "a zero clock is not a capture time"
        );
    }

    #[test]
    fn ties_are_allowed() {
        assert_eq!(trace(&[1, 1, 2]).len(), 3);
    }

    #[test]
    fn slice_is_inclusive() {
        let t = trace(&[10, 20, 30, 40]);
        let s = t
            .slice(&Timestamp::from_elapsed(20), &Timestamp::from_elapsed(30), SliceOptions::default())
            .unwrap();
        assert_eq!(times(&s), vec![20, 30]);
        assert!(Arc::ptr_eq(&s.entries()[0], &t.entries()[1]), "slice shares entries");
    }

    #[test]
    fn slice_with_initial_entry() {
        let t = trace(&[10, 20, 30, 40]);
        let s = t
            .slice(&Timestamp::from_elapsed(25), &Timestamp::from_elapsed(35), SliceOptions::WITH_INITIAL)
            .unwrap();
        assert_eq!(times(&s), vec![20, 30]);
        let s = t
            .slice(&Timestamp::from_elapsed(1), &Timestamp::from_elapsed(5), SliceOptions::WITH_INITIAL)
            .unwrap();
        assert!(s.is_empty(), "nothing before the first entry");
    }

    #[test]
    fn slice_rejects_inverted_range() {
        let err = trace(&[1])
            .slice(&Timestamp::from_elapsed(9), &Timestamp::from_elapsed(3), SliceOptions::default())
            .unwrap_err();
        assert_eq!(err, Error::InvalidRange { from: 9, to: 3 });
        let err = trace(&[1])
            .slice(&Timestamp::from_unix(1), &Timestamp::from_unix(3), SliceOptions::default())
            .unwrap_err();
        assert_eq!(err, Error::UnkeyedBound(TimeField::Elapsed));
    }

    #[test]
    fn entry_lookup() {
        let t = trace(&[10, 20, 30]);
        let at = |v| t.entry_at(&Timestamp::from_elapsed(v)).and_then(|e| e.0.elapsed());
        assert_eq!(at(5), Some(10), "before start falls back to first");
        assert_eq!(at(20), Some(20));
        assert_eq!(at(29), Some(20));
        assert_eq!(at(99), Some(30));
        let after = |v| t.first_at_or_after(&Timestamp::from_elapsed(v)).and_then(|e| e.0.elapsed());
        assert_eq!(after(11), Some(20));
        assert_eq!(after(31), None);
    }
}

// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Checks that look at a whole trace at once rather than entry by entry.

use std::collections::{BTreeMap, BTreeSet};

use flicker_core::matcher::ComponentMatcher;
use flicker_core::scene::Frame;
use flicker_core::trace::Trace;

use super::failure::{AssertionFailure, FailureKind};

/// Name reported by [`visible_nodes_shown_more_than_one_consecutive_entry`].
pub const CONSECUTIVE_VISIBLE_CHECK: &str = "visible_nodes_shown_more_than_one_consecutive_entry";

/// Elements that legitimately flash for a single frame: splash screens and
/// starting-window snapshots.
#[must_use]
pub fn default_ignored() -> Vec<ComponentMatcher> {
    vec![ComponentMatcher::SPLASH_SCREEN, ComponentMatcher::SNAPSHOT]
}

/// Fails when any node, identified by name, is visible for exactly one
/// frame in a row.
///
/// A one-frame appearance is the signature of a flicker. Nodes matching any
/// of `ignore` are not considered.
///
/// # Errors
///
/// An [`AssertionFailure`] at the first frame of the earliest-ending
/// single-frame run.
pub fn visible_nodes_shown_more_than_one_consecutive_entry(
    trace: &Trace<Frame>,
    ignore: &[ComponentMatcher],
) -> Result<(), AssertionFailure> {
    // name -> (first entry of the current run, run length)
    let mut runs: BTreeMap<&str, (usize, usize)> = BTreeMap::new();

    for (index, frame) in trace.iter().enumerate() {
        let visible: BTreeSet<&str> = frame
            .visible_nodes()
            .filter(|n| !ignore.iter().any(|m| m.matches_element(n)))
            .map(|n| n.name())
            .collect();

        if let Some((name, start)) = runs
            .iter()
            .find(|(name, (_, len))| !visible.contains(*name) && *len <= 1)
            .map(|(name, (start, _))| (*name, *start))
        {
            return Err(single_frame_failure(trace, name, start));
        }
        runs.retain(|name, _| visible.contains(name));
        for name in visible {
            runs.entry(name).or_insert((index, 0)).1 += 1;
        }
    }

    match runs.iter().find(|(_, (_, len))| *len <= 1) {
        Some((name, (start, _))) => Err(single_frame_failure(trace, name, *start)),
        None => Ok(()),
    }
}

fn single_frame_failure(trace: &Trace<Frame>, name: &str, entry: usize) -> AssertionFailure {
    AssertionFailure {
        kind: FailureKind::Violated,
        assertion: CONSECUTIVE_VISIBLE_CHECK.into(),
        entry_index: entry,
        timestamp: trace.get(entry).map(|f| *f.timestamp()).unwrap_or_default(),
        reason: format!("No two consecutive visible entries shown for {name}"),
        passed: Vec::new(),
        untested: Vec::new(),
        log: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flicker_core::geometry::Rect;
    use flicker_core::scene::{FrameBuilder, RawNode};
    use flicker_core::time::{TimeField, Timestamp};

    /// One frame per entry; each entry lists the names visible in it.
    fn trace(frames: &[&[&str]]) -> Trace<Frame> {
        let built = frames
            .iter()
            .zip(1_u64..)
            .map(|(names, t)| {
                let nodes = names.iter().zip(1_i32..).map(|(name, id)| {
                    RawNode::opaque_surface(id, *name, Rect::new(0, id * 10, 10, id * 10 + 10))
                });
                FrameBuilder::new(Timestamp::from_elapsed(t)).nodes(nodes).build().unwrap()
            })
            .collect();
        Trace::new(built, TimeField::Elapsed).unwrap()
    }

    #[test]
    fn stable_nodes_pass() {
        let t = trace(&[&["A"], &["A", "B"], &["A", "B"]]);
        assert!(visible_nodes_shown_more_than_one_consecutive_entry(&t, &[]).is_ok());
    }

    #[test]
    fn single_frame_flash_fails() {
        let t = trace(&[&["A"], &["A", "B"], &["A"], &["A"]]);
        let failure = visible_nodes_shown_more_than_one_consecutive_entry(&t, &[]).unwrap_err();
        assert_eq!(failure.entry_index, 1);
        assert!(failure.reason.ends_with("for B"), "got: {}", failure.reason);
        assert_eq!(failure.timestamp, Timestamp::from_elapsed(2));
    }

    #[test]
    fn single_frame_at_end_fails() {
        let t = trace(&[&["A"], &["A"], &["A", "B"]]);
        let failure = visible_nodes_shown_more_than_one_consecutive_entry(&t, &[]).unwrap_err();
        assert_eq!(failure.entry_index, 2);
    }

    #[test]
    fn ignored_nodes_may_flash() {
        let t = trace(&[&["A"], &["A", "Splash Screen com.example#1"], &["A"]]);
        assert!(
            visible_nodes_shown_more_than_one_consecutive_entry(&t, &default_ignored()).is_ok(),
            "splash screen is ignored"
        );
        assert!(visible_nodes_shown_more_than_one_consecutive_entry(&t, &[]).is_err());
    }
}

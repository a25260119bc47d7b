// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use flicker_core::scene::NodeId;
use flicker_core::time::Timestamp;
use flicker_core::trace::TraceEntry;
use serde::{Deserialize, Serialize};

/// Overall kind of a logged transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionType {
    /// Not reported.
    #[default]
    Undefined,
    /// A window or task opens.
    Open,
    /// A window or task closes.
    Close,
    /// An existing element moves to the front.
    ToFront,
    /// An element moves to the back.
    ToBack,
    /// An activity is relaunched.
    Relaunch,
    /// Bounds or configuration change.
    Change,
    /// The keyguard is dismissed.
    KeyguardGoingAway,
    /// The keyguard is covered by an activity.
    KeyguardOcclude,
    /// A covering activity leaves the keyguard.
    KeyguardUnocclude,
    /// Picture-in-picture entry.
    Pip,
    /// The device wakes.
    Wake,
    /// The device sleeps.
    Sleep,
}

/// What a transition does to one element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitMode {
    /// The element appears.
    Open,
    /// The element disappears.
    Close,
    /// The element is raised.
    ToFront,
    /// The element is lowered.
    ToBack,
    /// The element changes in place.
    Change,
}

impl TransitMode {
    /// Open or to-front.
    #[inline]
    #[must_use]
    pub fn is_opening(self) -> bool {
        matches!(self, Self::Open | Self::ToFront)
    }

    /// Close or to-back.
    #[inline]
    #[must_use]
    pub fn is_closing(self) -> bool {
        matches!(self, Self::Close | Self::ToBack)
    }
}

/// One element affected by a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionChange {
    /// What happens to the element.
    pub mode: TransitMode,
    /// Compositor node of the element.
    pub node_id: NodeId,
    /// Window id of the element, when known.
    #[serde(default)]
    pub window_id: Option<i32>,
}

impl TransitionChange {
    /// A change without a window id.
    #[must_use]
    pub fn new(mode: TransitMode, node_id: i32) -> Self {
        Self {
            mode,
            node_id: NodeId(node_id),
            window_id: None,
        }
    }
}

/// One record of the transition log.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transition {
    /// Log-wide id.
    pub id: i32,
    /// Overall kind.
    pub kind: TransitionType,
    /// When the transition was requested.
    pub create_time: Option<Timestamp>,
    /// When it was dispatched to the animation player.
    pub send_time: Option<Timestamp>,
    /// When it finished playing.
    pub finish_time: Option<Timestamp>,
    /// When it was aborted.
    pub abort_time: Option<Timestamp>,
    /// Commit id of the transaction that starts the transition.
    pub start_transaction_id: Option<u64>,
    /// Commit id of the transaction that finishes the transition.
    pub finish_transaction_id: Option<u64>,
    /// Elements affected.
    pub changes: Vec<TransitionChange>,
    /// Id of the transition this one was merged into. A merged transition
    /// never played on its own.
    pub merged_into: Option<i32>,
}

impl Transition {
    /// Creates an empty record with the given id.
    #[must_use]
    pub fn new(id: i32, kind: TransitionType) -> Self {
        Self {
            id,
            kind,
            ..Self::default()
        }
    }

    /// Sets the send time.
    #[must_use]
    pub fn with_send_time(mut self, t: Timestamp) -> Self {
        self.send_time = Some(t);
        self
    }

    /// Sets the create time.
    #[must_use]
    pub fn with_create_time(mut self, t: Timestamp) -> Self {
        self.create_time = Some(t);
        self
    }

    /// Sets the finish time.
    #[must_use]
    pub fn with_finish_time(mut self, t: Timestamp) -> Self {
        self.finish_time = Some(t);
        self
    }

    /// Sets the abort time.
    #[must_use]
    pub fn with_abort_time(mut self, t: Timestamp) -> Self {
        self.abort_time = Some(t);
        self
    }

    /// Sets the start and finish transaction ids.
    #[must_use]
    pub fn with_transactions(mut self, start: u64, finish: u64) -> Self {
        self.start_transaction_id = Some(start);
        self.finish_transaction_id = Some(finish);
        self
    }

    /// Records the transition this one was merged into.
    #[must_use]
    pub fn with_merged_into(mut self, target: i32) -> Self {
        self.merged_into = Some(target);
        self
    }

    /// Adds an affected element.
    #[must_use]
    pub fn with_change(mut self, mode: TransitMode, node_id: i32) -> Self {
        self.changes.push(TransitionChange::new(mode, node_id));
        self
    }

    /// The transition played to completion.
    #[must_use]
    pub fn played(&self) -> bool {
        self.finish_time.is_some()
    }

    /// The transition was aborted.
    #[must_use]
    pub fn aborted(&self) -> bool {
        self.abort_time.is_some()
    }

    /// Not played, or aborted.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        !self.played() || self.aborted()
    }

    /// Folded into another transition.
    #[must_use]
    pub fn was_merged(&self) -> bool {
        self.merged_into.is_some()
    }

    /// Elements opened or raised.
    pub fn opened(&self) -> impl Iterator<Item = &TransitionChange> + '_ {
        self.changes.iter().filter(|c| c.mode.is_opening())
    }

    /// Elements closed or lowered.
    pub fn closed(&self) -> impl Iterator<Item = &TransitionChange> + '_ {
        self.changes.iter().filter(|c| c.mode.is_closing())
    }
}

impl TraceEntry for Transition {
    /// The earliest recorded lifecycle time.
    fn timestamp(&self) -> &Timestamp {
        self.create_time
            .as_ref()
            .or(self.send_time.as_ref())
            .or(self.finish_time.as_ref())
            .or(self.abort_time.as_ref())
            .unwrap_or(&Timestamp::MIN)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transition#{}({:?}", self.id, self.kind)?;
        if let Some(t) = &self.send_time {
            write!(f, ", sent {t}")?;
        }
        if self.aborted() {
            f.write_str(", aborted")?;
        } else if !self.played() {
            f.write_str(", unfinished")?;
        }
        write!(f, ", {} changes)", self.changes.len())
    }
}

/// One entry of the low-level commit log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Transaction id.
    pub id: u64,
    /// Synchronization counter of the frame the transaction landed in.
    pub applied_sync_counter: u64,
    /// Ids of transactions merged into this one.
    #[serde(default)]
    pub merged_ids: Vec<u64>,
}

impl Commit {
    /// A commit without merged transactions.
    #[must_use]
    pub fn new(id: u64, applied_sync_counter: u64) -> Self {
        Self {
            id,
            applied_sync_counter,
            merged_ids: Vec::new(),
        }
    }

    /// Returns `true` if `id` is this commit or was merged into it.
    #[must_use]
    pub fn covers(&self, id: u64) -> bool {
        self.id == id || self.merged_ids.contains(&id)
    }
}

// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::collections::BTreeMap;

use flicker_core::time::Timestamp;
use flicker_core::trace::TraceEntry;
use serde::{Deserialize, Serialize};

/// A semantic start/end tag around one user interaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// Interaction type, e.g. `APP_LAUNCH_FROM_ICON`.
    pub tag: String,
    /// When the interaction began.
    pub start: Timestamp,
    /// When the interaction was declared finished.
    pub end: Timestamp,
    /// The interaction was abandoned; canceled markers are never extracted.
    #[serde(default)]
    pub canceled: bool,
}

impl Marker {
    /// Creates a completed marker.
    #[must_use]
    pub fn new(tag: impl Into<String>, start: Timestamp, end: Timestamp) -> Self {
        Self {
            tag: tag.into(),
            start,
            end,
            canceled: false,
        }
    }

    /// Marks the marker as canceled.
    #[must_use]
    pub fn with_canceled(mut self, canceled: bool) -> Self {
        self.canceled = canceled;
        self
    }
}

impl TraceEntry for Marker {
    fn timestamp(&self) -> &Timestamp {
        &self.start
    }
}

/// Groups non-canceled markers by tag, keeping stream order within a tag.
#[must_use]
pub fn group_by_tag(markers: &[Marker]) -> BTreeMap<&str, Vec<&Marker>> {
    let mut groups: BTreeMap<&str, Vec<&Marker>> = BTreeMap::new();
    for marker in markers.iter().filter(|m| !m.canceled) {
        groups.entry(marker.tag.as_str()).or_default().push(marker);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouping_drops_canceled() {
        let markers = [
            Marker::new("LAUNCH", Timestamp::from_elapsed(1), Timestamp::from_elapsed(2)),
            Marker::new("ROTATE", Timestamp::from_elapsed(3), Timestamp::from_elapsed(4)),
            Marker::new("LAUNCH", Timestamp::from_elapsed(5), Timestamp::from_elapsed(6))
                .with_canceled(true),
            Marker::new("LAUNCH", Timestamp::from_elapsed(7), Timestamp::from_elapsed(8)),
        ];
        let groups = group_by_tag(&markers);
        assert_eq!(groups.len(), 2, "one group per tag");
        let launches = &groups["LAUNCH"];
        assert_eq!(launches.len(), 2, "canceled marker is dropped");
        assert_eq!(launches[1].start, Timestamp::from_elapsed(7), "stream order kept");
    }

    #[test]
    fn decodes_without_canceled_field() {
        let json = r#"{"tag":"LAUNCH","start":{"elapsed_nanos":1},"end":{"elapsed_nanos":9}}"#;
        let marker: Marker = serde_json::from_str(json).unwrap();
        assert!(!marker.canceled);
        assert_eq!(marker.end.elapsed(), Some(9));
    }
}

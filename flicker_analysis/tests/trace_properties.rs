// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end behavior across scene construction, tracing, assertions, and
//! extraction.

use flicker_analysis::assertions::{AssertionsChecker, FailureKind, predicates, trace_checks};
use flicker_analysis::extract::{
    ExtractorConfig, Marker, ScenarioExtractor, ScenarioType, TransitMode, Transition,
    TransitionType,
};
use flicker_analysis::ExtractionError;
use flicker_core::geometry::Rect;
use flicker_core::matcher::{ComponentMatcher, ComponentName};
use flicker_core::scene::{Frame, FrameBuilder, NodeId, RawNode, build_frame};
use flicker_core::time::Timestamp;
use flicker_core::trace::{DecodedFrame, Trace, TraceBuilder};

const MS: u64 = 1_000_000;
/// Elapsed clock at the first frame; a zero reading is an absent clock.
const BOOT: u64 = 1_000 * MS;

fn ts(ms: u64) -> Timestamp {
    Timestamp::from_elapsed(BOOT + ms * MS)
}

fn app() -> ComponentMatcher {
    ComponentMatcher::name(ComponentName::new("com.example", "com.example.Main"))
}

/// A launcher-only frame, or the app drawn over the launcher.
fn decoded(ms: u64, vsync: u64, app_shown: bool) -> DecodedFrame {
    let mut nodes = vec![
        RawNode::new(1, "Display 0").with_bounds(Rect::new(0, 0, 100, 200).to_kurbo()),
        RawNode::opaque_surface(2, "com.android.launcher3/.Launcher#2", Rect::new(0, 0, 100, 200))
            .with_parent(1),
    ];
    if app_shown {
        nodes.push(
            RawNode::opaque_surface(3, "com.example/com.example.Main#3", Rect::new(0, 0, 100, 200))
                .with_parent(1)
                .with_z(1),
        );
    }
    DecodedFrame {
        timestamp: ts(ms),
        vsync_id: Some(vsync),
        nodes,
        displays: Vec::new(),
    }
}

fn launch_trace() -> Trace<Frame> {
    let frames = (0..10_u64).map(|i| decoded(i * 100, i, i >= 4));
    TraceBuilder::new().build(frames).unwrap()
}

#[test]
fn orphan_detection() {
    let err = build_frame(
        vec![
            RawNode::new(1, "a").with_bounds(Rect::new(0, 0, 1, 1).to_kurbo()),
            RawNode::new(2, "b").with_parent(99).with_bounds(Rect::new(0, 0, 1, 1).to_kurbo()),
        ],
        Vec::new(),
        ts(1),
    )
    .unwrap_err();
    assert_eq!(
        err,
        flicker_core::Error::Orphan {
            id: NodeId(2),
            parent_id: NodeId(99)
        },
        "unknown parent is fatal by default"
    );

    let frame = build_frame(
        vec![
            RawNode::new(1, "a").with_bounds(Rect::new(0, 0, 1, 1).to_kurbo()),
            RawNode::new(2, "b").with_parent(1).with_bounds(Rect::new(0, 0, 1, 1).to_kurbo()),
        ],
        Vec::new(),
        ts(1),
    )
    .unwrap();
    let children: Vec<_> = frame.children(NodeId(1)).map(|n| n.id()).collect();
    assert_eq!(children, vec![NodeId(2)], "child linked under its parent");
}

#[test]
fn identical_opaque_nodes_occlude_lower() {
    let frame = FrameBuilder::new(ts(1))
        .node(RawNode::opaque_surface(1, "low", Rect::new(0, 0, 50, 50)).with_z(0))
        .node(RawNode::opaque_surface(2, "high", Rect::new(0, 0, 50, 50)).with_z(1))
        .build()
        .unwrap();
    let low = frame.node(NodeId(1)).unwrap();
    let high = frame.node(NodeId(2)).unwrap();
    assert!(!low.is_visible() && low.occluded_by() == [NodeId(2)], "lower node is occluded by the upper one");
    assert!(high.is_visible(), "upper node stays visible");
}

#[test]
fn launch_assertions_over_a_built_trace() {
    let trace = launch_trace();
    let mut checker = AssertionsChecker::<Frame>::new();
    checker
        .add("app is invisible", predicates::is_invisible(app()))
        .add("app is visible", predicates::is_visible(app()));
    assert!(checker.run(trace.iter()).is_ok(), "invisible then visible");

    let mut reversed = AssertionsChecker::<Frame>::new();
    reversed
        .add("app is visible", predicates::is_visible(app()))
        .add("app is invisible", predicates::is_invisible(app()));
    let failure = reversed.run(trace.iter()).unwrap_err();
    assert_eq!(failure.kind, FailureKind::Violated, "fails on the spot");
    assert_eq!(failure.assertion, "app is visible", "names the failing block");
    assert_eq!(failure.entry_index, 0, "first frame");

    assert!(
        trace_checks::visible_nodes_shown_more_than_one_consecutive_entry(
            &trace,
            &trace_checks::default_ignored()
        )
        .is_ok(),
        "no node flashes for a single frame"
    );
}

#[test]
fn extraction_then_assertions() {
    let trace = launch_trace();
    let markers = [Marker::new("LAUNCH", ts(250), ts(450))];
    let transitions = [Transition::new(7, TransitionType::Open)
        .with_send_time(ts(300))
        .with_finish_time(ts(480))
        .with_change(TransitMode::Open, 3)];
    let extractor = ScenarioExtractor::new(ExtractorConfig::new(ScenarioType::AppLaunch, "LAUNCH"));
    let results = extractor.extract(&trace, &markers, &transitions, &[]);
    assert_eq!(results.len(), 1, "one marker, one result");
    let scenario = results[0].as_ref().unwrap();
    assert_eq!(scenario.transition.as_ref().map(|t| t.id), Some(7), "the in-window transition");
    assert_eq!(scenario.end, ts(500), "first frame at or after the finish");

    let mut checker = AssertionsChecker::<Frame>::new();
    checker
        .add("app is invisible", predicates::is_invisible(app()))
        .add("app is visible", predicates::is_visible(app()));
    assert!(checker.run(scenario.trace.iter()).is_ok(), "slice starts before and ends after the launch");
}

#[test]
fn extraction_refuses_to_guess() {
    let trace = launch_trace();
    let markers = [Marker::new("LAUNCH", ts(250), ts(450))];
    let outside = |id, sent| {
        Transition::new(id, TransitionType::Open)
            .with_send_time(ts(sent))
            .with_finish_time(ts(sent + 100))
            .with_change(TransitMode::Open, 3)
    };
    let transitions = [outside(1, 50), outside(2, 700)];
    let extractor = ScenarioExtractor::new(ExtractorConfig::new(ScenarioType::AppLaunch, "LAUNCH"));
    let results = extractor.extract(&trace, &markers, &transitions, &[]);
    assert!(
        matches!(results[0], Err(ExtractionError::NoTransitionLeft { .. })),
        "got {:?}",
        results[0]
    );
}

#[test]
fn one_frame_flash_is_detected() {
    let frames = (0..6_u64).map(|i| decoded(i * 100, i, i == 3));
    let trace = TraceBuilder::new().build(frames).unwrap();
    let failure = trace_checks::visible_nodes_shown_more_than_one_consecutive_entry(&trace, &[])
        .unwrap_err();
    assert_eq!(failure.entry_index, 3, "the flashing frame");
    assert_eq!(failure.timestamp, ts(300), "reported at the flash");
}

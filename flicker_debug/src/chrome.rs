// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporters.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and [`export_scenarios`] lays extracted scenarios out on a timeline. Both
//! write [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use flicker_analysis::extract::ScenarioInstance;
use flicker_core::time::{TimeField, Timestamp};

use crate::recorder::{RecordedEvent, decode};

/// Exports a recorded assertion run as Chrome Trace Event Format JSON.
///
/// Each assertion block gets its own track (`tid`); steps are instants on
/// the track of the block being evaluated, and the run itself is a
/// begin/end pair spanning the first to the last step. Timestamps are
/// converted to microseconds on `clock`.
pub fn export(bytes: &[u8], clock: TimeField, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut last_ts = 0.0;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::RunBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": "AssertionRun",
                    "cat": "Check",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "assertions": e.assertions,
                        "entries": e.entries,
                        "skip_until_first_match": e.skip_until_first_match,
                    }
                }));
            }
            RecordedEvent::Step(s) => {
                last_ts = us(s.timestamp, clock);
                let cat = if s.passed { "Pass" } else { "Fail" };
                events.push(json!({
                    "ph": "i",
                    "name": s.name,
                    "cat": cat,
                    "ts": last_ts,
                    "pid": 0,
                    "tid": s.assertion_index + 1,
                    "s": "t",
                    "args": {
                        "entry_index": s.entry_index,
                        "passed": s.passed,
                    }
                }));
            }
            RecordedEvent::Advance(e) => {
                let name = if e.skipped_optional { "SkipOptional" } else { "Advance" };
                events.push(json!({
                    "ph": "i",
                    "name": name,
                    "cat": "Check",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "from": e.from,
                        "to": e.to,
                        "entry_index": e.entry_index,
                    }
                }));
            }
            RecordedEvent::EntrySkipped {
                entry_index,
                timestamp,
            } => {
                last_ts = us(timestamp, clock);
                events.push(json!({
                    "ph": "i",
                    "name": "EntrySkipped",
                    "cat": "Check",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "entry_index": entry_index,
                    }
                }));
            }
            RecordedEvent::RunEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": "AssertionRun",
                    "cat": "Check",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "steps": e.steps,
                        "cursor": e.cursor,
                        "failure": e.failure.map(|kind| kind.to_string()),
                    }
                }));
            }
        }
    }
    fix_run_begin(&mut events);

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

/// Moves each run-begin to the time of the step that follows it.
fn fix_run_begin(events: &mut [Value]) {
    for i in 0..events.len() {
        if events[i]["ph"] != "B" {
            continue;
        }
        let next = events[i + 1..]
            .iter()
            .find(|e| e["cat"] == "Pass" || e["cat"] == "Fail" || e["name"] == "EntrySkipped")
            .map(|e| e["ts"].clone());
        if let Some(ts) = next {
            events[i]["ts"] = ts;
        }
    }
}

/// Exports extracted scenarios as complete (`X`) events, one track per
/// scenario type, with the associated transition's lifecycle as instants.
pub fn export_scenarios(
    scenarios: &[ScenarioInstance],
    clock: TimeField,
    writer: &mut dyn Write,
) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for (index, scenario) in scenarios.iter().enumerate() {
        let start = us(scenario.start, clock);
        let end = us(scenario.end, clock);
        let tid = index + 1;
        events.push(json!({
            "ph": "X",
            "name": scenario.key(),
            "cat": "Scenario",
            "ts": start,
            "dur": (end - start).max(0.0),
            "pid": 0,
            "tid": tid,
            "args": {
                "frames": scenario.trace.len(),
                "tag": scenario.marker.as_ref().map(|m| m.tag.clone()),
                "start_rotation": format!("{:?}", scenario.start_rotation),
                "end_rotation": format!("{:?}", scenario.end_rotation),
            }
        }));

        let Some(transition) = &scenario.transition else {
            continue;
        };
        let lifecycle = [
            ("create", transition.create_time),
            ("send", transition.send_time),
            ("finish", transition.finish_time),
            ("abort", transition.abort_time),
        ];
        for (phase, at) in lifecycle {
            let Some(at) = at else { continue };
            events.push(json!({
                "ph": "i",
                "name": format!("Transition#{} {phase}", transition.id),
                "cat": "Transition",
                "ts": us(at, clock),
                "pid": 0,
                "tid": tid,
                "s": "t",
                "args": {
                    "kind": format!("{:?}", transition.kind),
                    "changes": transition.changes.len(),
                }
            }));
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn us(t: Timestamp, clock: TimeField) -> f64 {
    t.get(clock).map_or(0.0, |ns| ns as f64 / 1000.0)
}

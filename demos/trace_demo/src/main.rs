// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! App-launch capture run through extraction, assertions, and diagnostics.
//!
//! Without arguments, synthesizes a launch: a launcher on screen, an app
//! window appearing halfway, a `LAUNCH` marker and the matching transition.
//! The capture is reconstructed, the launch scenario is extracted, and an
//! invisible-then-visible assertion runs over it while events go to both a
//! [`PrettyPrintSink`](flicker_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](flicker_debug::recorder::RecorderSink).
//!
//! ```text
//! trace_demo [capture.json] [--config extractor.json] [--chrome out.json] [--dump]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use flicker_analysis::assertions::{
    AdvanceEvent, AssertionsChecker, CheckSink, RunBeginEvent, RunEndEvent, StepEvent, predicates,
    trace_checks,
};
use flicker_analysis::capture::Capture;
use flicker_analysis::extract::{
    Commit, ExtractorConfig, Marker, ScenarioExtractor, ScenarioType, TransitMode, Transition,
    TransitionType,
};
use flicker_core::geometry::Rect;
use flicker_core::matcher::{ComponentMatcher, ComponentName};
use flicker_core::scene::{Display, Frame, RawNode};
use flicker_core::time::Timestamp;
use flicker_core::trace::{DecodedFrame, TraceBuilder};

use flicker_debug::pretty::PrettyPrintSink;
use flicker_debug::recorder::RecorderSink;

const FRAME_COUNT: u64 = 30;
/// 16.6ms refresh interval in nanoseconds (≈60 Hz).
const REFRESH_INTERVAL_NS: u64 = 16_666_667;
/// Capture starts 1s after boot.
const START_NS: u64 = 1_000_000_000;
const APP_FIRST_FRAME: u64 = 12;
const APP_PACKAGE: &str = "com.example.demo";
const APP_CLASS: &str = "com.example.demo.MainActivity";
const LAUNCH_TAG: &str = "LAUNCH";

type DemoResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Debug, Default)]
struct Args {
    capture: Option<PathBuf>,
    config: Option<PathBuf>,
    chrome: Option<PathBuf>,
    dump: bool,
}

fn parse_args() -> DemoResult<Args> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = Some(it.next().ok_or("--config needs a path")?.into()),
            "--chrome" => args.chrome = Some(it.next().ok_or("--chrome needs a path")?.into()),
            "--dump" => args.dump = true,
            flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}").into()),
            path => args.capture = Some(path.into()),
        }
    }
    Ok(args)
}

fn main() -> DemoResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
        None => ExtractorConfig::new(ScenarioType::AppLaunch, LAUNCH_TAG),
    };
    let capture: Capture = match &args.capture {
        Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
        None => synthetic_launch(),
    };
    tracing::info!(
        frames = capture.frames.len(),
        markers = capture.markers.len(),
        transitions = capture.transitions.len(),
        "capture loaded"
    );

    // -- reconstruct ---------------------------------------------------------
    let mut builder = TraceBuilder::new();
    let built = capture.build(&mut builder)?;
    let clock = built.trace.key();

    // -- extract -------------------------------------------------------------
    let extractor = ScenarioExtractor::new(config);
    let mut scenarios = Vec::new();
    for result in built.extract(&extractor) {
        match result {
            Ok(scenario) => {
                println!("extracted {scenario}");
                scenarios.push(scenario);
            }
            Err(err) => println!("extraction failed: {err}"),
        }
    }
    if scenarios.is_empty() {
        println!("no scenario extracted; checking the whole trace");
        scenarios.push(extractor.extract_whole_trace(&built.trace));
    }

    // -- assertions ----------------------------------------------------------
    let app = ComponentMatcher::name(ComponentName::new(APP_PACKAGE, APP_CLASS));
    let mut checker = AssertionsChecker::<Frame>::new();
    checker
        .add("app window is invisible", predicates::is_invisible(app.clone()))
        .add("app window is visible", predicates::is_visible(app));

    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()), clock);
    let mut recorder = RecorderSink::new();
    let mut failures = 0_usize;
    for scenario in &scenarios {
        let mut sinks = Tee(&mut pretty, &mut recorder);
        if let Err(failure) = checker.run_with_sink(scenario.trace.iter(), &mut sinks) {
            failures += 1;
            println!("{}", failure.report());
        }
        if let Err(failure) = trace_checks::visible_nodes_shown_more_than_one_consecutive_entry(
            &scenario.trace,
            &trace_checks::default_ignored(),
        ) {
            failures += 1;
            println!("{failure}");
        }
        if args.dump {
            flicker_debug::dump::write_trace(&scenario.trace, &mut std::io::stdout())?;
        }
    }

    // -- export Chrome trace -------------------------------------------------
    if let Some(path) = &args.chrome {
        let mut writer = BufWriter::new(File::create(path)?);
        flicker_debug::chrome::export(recorder.as_bytes(), clock, &mut writer)?;
        let scenario_path = path.with_extension("scenarios.json");
        let mut writer = BufWriter::new(File::create(&scenario_path)?);
        flicker_debug::chrome::export_scenarios(&scenarios, clock, &mut writer)?;
        println!("Wrote {} and {}", path.display(), scenario_path.display());
    }

    println!("{} scenario(s), {failures} failure(s)", scenarios.len());
    Ok(())
}

/// Forwards every event to two sinks.
struct Tee<'a, A, B>(&'a mut A, &'a mut B);

impl<A: CheckSink, B: CheckSink> CheckSink for Tee<'_, A, B> {
    fn on_run_begin(&mut self, e: &RunBeginEvent) {
        self.0.on_run_begin(e);
        self.1.on_run_begin(e);
    }

    fn on_step(&mut self, e: &StepEvent<'_>) {
        self.0.on_step(e);
        self.1.on_step(e);
    }

    fn on_advance(&mut self, e: &AdvanceEvent) {
        self.0.on_advance(e);
        self.1.on_advance(e);
    }

    fn on_entry_skipped(&mut self, entry_index: usize, timestamp: Timestamp) {
        self.0.on_entry_skipped(entry_index, timestamp);
        self.1.on_entry_skipped(entry_index, timestamp);
    }

    fn on_run_end(&mut self, e: &RunEndEvent) {
        self.0.on_run_end(e);
        self.1.on_run_end(e);
    }
}

fn at(frame: u64) -> Timestamp {
    let elapsed = START_NS + frame * REFRESH_INTERVAL_NS;
    Timestamp::new(elapsed, elapsed, 0)
}

/// A launcher-only phone screen that the demo app covers from
/// [`APP_FIRST_FRAME`] on.
fn synthetic_launch() -> Capture {
    let screen = Rect::new(0, 0, 1080, 2340);
    let frames = (0..FRAME_COUNT)
        .map(|i| {
            let mut nodes = vec![
                RawNode::new(1, "Display 0").with_bounds(screen.to_kurbo()),
                RawNode::opaque_surface(2, "Wallpaper BBQ wrapper#2", screen).with_parent(1),
                RawNode::opaque_surface(
                    3,
                    "com.android.launcher3/com.android.launcher3.uioverrides.QuickstepLauncher#3",
                    screen,
                )
                .with_parent(1)
                .with_z(1),
                RawNode::opaque_surface(4, "StatusBar#4", Rect::new(0, 0, 1080, 80))
                    .with_parent(1)
                    .with_z(10),
            ];
            if i >= APP_FIRST_FRAME {
                nodes.push(
                    RawNode::opaque_surface(5, format!("{APP_PACKAGE}/{APP_CLASS}#5"), screen)
                        .with_parent(1)
                        .with_z(2),
                );
            }
            DecodedFrame {
                timestamp: at(i),
                vsync_id: Some(i),
                nodes,
                displays: vec![Display::new(0, "Built-in Screen", 1080, 2340)],
            }
        })
        .collect();

    let transition = Transition::new(1, TransitionType::Open)
        .with_create_time(at(APP_FIRST_FRAME - 3))
        .with_send_time(at(APP_FIRST_FRAME - 2))
        .with_finish_time(at(APP_FIRST_FRAME + 6))
        .with_transactions(101, 102)
        .with_change(TransitMode::Open, 5)
        .with_change(TransitMode::ToBack, 3);

    Capture {
        frames,
        markers: vec![Marker::new(
            LAUNCH_TAG,
            at(APP_FIRST_FRAME - 4),
            at(APP_FIRST_FRAME + 4),
        )],
        transitions: vec![transition],
        commits: vec![
            Commit::new(101, APP_FIRST_FRAME),
            Commit::new(102, APP_FIRST_FRAME + 8),
        ],
    }
}

// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and export for flicker analysis runs.
//!
//! This crate provides [`CheckSink`](flicker_analysis::assertions::CheckSink)
//! implementations and dumps for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome`]: writes Chrome Trace Event Format JSON from recorded bytes
//!   or from extracted scenarios.
//! - [`dump`]: indented text trees of reconstructed frames.

pub mod chrome;
pub mod dump;
pub mod pretty;
pub mod recorder;

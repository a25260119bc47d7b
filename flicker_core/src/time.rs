// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capture timestamps.
//!
//! Records coming out of a capture carry up to three clocks:
//!
//! - **elapsed**: monotonic nanoseconds since boot, including deep sleep,
//! - **system uptime**: monotonic nanoseconds since boot, excluding sleep,
//! - **unix**: wall-clock nanoseconds since the Unix epoch.
//!
//! Any subset may be missing. A [`Timestamp`] keeps each as an `Option`, and
//! every comparison names the [`TimeField`] it keys on. A raw value of `0`
//! on input means "absent".

use core::cmp::Ordering;
use core::fmt;
use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Which clock a comparison keys on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeField {
    /// Monotonic time since boot, including sleep.
    #[default]
    Elapsed,
    /// Monotonic time since boot, excluding sleep.
    SystemUptime,
    /// Wall-clock time.
    Unix,
}

/// A point in time on up to three clocks, in nanoseconds.
///
/// A clock reading of `0` is indistinguishable from "not captured": every
/// constructor and the wire form map it to `None`. Capture clocks start
/// counting at boot or at the epoch, so real records never sit at zero;
/// the earliest present instant is `1`, see [`Timestamp::MIN`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "RawTimestamp", into = "RawTimestamp")]
pub struct Timestamp {
    elapsed: Option<u64>,
    system_uptime: Option<u64>,
    unix: Option<u64>,
}

/// Wire form where `0` marks an absent clock.
#[derive(Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
struct RawTimestamp {
    elapsed_nanos: u64,
    system_uptime_nanos: u64,
    unix_nanos: u64,
}

impl From<RawTimestamp> for Timestamp {
    fn from(raw: RawTimestamp) -> Self {
        Self::new(raw.elapsed_nanos, raw.system_uptime_nanos, raw.unix_nanos)
    }
}

impl From<Timestamp> for RawTimestamp {
    fn from(ts: Timestamp) -> Self {
        Self {
            elapsed_nanos: ts.elapsed.unwrap_or(0),
            system_uptime_nanos: ts.system_uptime.unwrap_or(0),
            unix_nanos: ts.unix.unwrap_or(0),
        }
    }
}

const fn non_zero(v: u64) -> Option<u64> {
    if v == 0 { None } else { Some(v) }
}

impl Timestamp {
    /// A timestamp with no clock values.
    pub const EMPTY: Self = Self {
        elapsed: None,
        system_uptime: None,
        unix: None,
    };

    /// The earliest representable instant on every clock.
    pub const MIN: Self = Self {
        elapsed: Some(1),
        system_uptime: Some(1),
        unix: Some(1),
    };

    /// The latest representable instant on every clock.
    pub const MAX: Self = Self {
        elapsed: Some(u64::MAX),
        system_uptime: Some(u64::MAX),
        unix: Some(u64::MAX),
    };

    /// Creates a timestamp from raw values, treating `0` as absent.
    #[inline]
    #[must_use]
    pub const fn new(elapsed: u64, system_uptime: u64, unix: u64) -> Self {
        Self {
            elapsed: non_zero(elapsed),
            system_uptime: non_zero(system_uptime),
            unix: non_zero(unix),
        }
    }

    /// Creates a timestamp carrying only the elapsed clock.
    ///
    /// `from_elapsed(0)` is [`Timestamp::EMPTY`].
    #[inline]
    #[must_use]
    pub const fn from_elapsed(nanos: u64) -> Self {
        Self::new(nanos, 0, 0)
    }

    /// Creates a timestamp carrying only the system-uptime clock.
    #[inline]
    #[must_use]
    pub const fn from_system_uptime(nanos: u64) -> Self {
        Self::new(0, nanos, 0)
    }

    /// Creates a timestamp carrying only the wall clock.
    #[inline]
    #[must_use]
    pub const fn from_unix(nanos: u64) -> Self {
        Self::new(0, 0, nanos)
    }

    /// Elapsed-clock value.
    #[inline]
    #[must_use]
    pub const fn elapsed(&self) -> Option<u64> {
        self.elapsed
    }

    /// System-uptime value.
    #[inline]
    #[must_use]
    pub const fn system_uptime(&self) -> Option<u64> {
        self.system_uptime
    }

    /// Wall-clock value.
    #[inline]
    #[must_use]
    pub const fn unix(&self) -> Option<u64> {
        self.unix
    }

    /// Value of the given clock.
    #[inline]
    #[must_use]
    pub const fn get(&self, field: TimeField) -> Option<u64> {
        match field {
            TimeField::Elapsed => self.elapsed,
            TimeField::SystemUptime => self.system_uptime,
            TimeField::Unix => self.unix,
        }
    }

    /// Returns `true` if no clock is present.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.elapsed.is_none() && self.system_uptime.is_none() && self.unix.is_none()
    }

    /// Compares on a single clock; `None` if either side lacks it.
    #[must_use]
    pub fn cmp_on(&self, other: &Self, field: TimeField) -> Option<Ordering> {
        Some(self.get(field)?.cmp(&other.get(field)?))
    }

    /// Compares on the first clock present on both sides, trying the wall
    /// clock, then elapsed, then system uptime.
    #[must_use]
    pub fn compare_preferred(&self, other: &Self) -> Option<Ordering> {
        [TimeField::Unix, TimeField::Elapsed, TimeField::SystemUptime]
            .into_iter()
            .find_map(|field| self.cmp_on(other, field))
    }

    /// Adds a duration to every present clock, saturating.
    #[must_use]
    pub fn saturating_add(self, duration: Duration) -> Self {
        let d = duration_nanos(duration);
        self.map(|v| v.saturating_add(d))
    }

    /// Subtracts a duration from every present clock, clamping at the
    /// earliest present instant so no clock drops out.
    #[must_use]
    pub fn saturating_sub(self, duration: Duration) -> Self {
        let d = duration_nanos(duration);
        self.map(|v| v.saturating_sub(d).max(1))
    }

    /// Per-clock minimum. A clock present on only one side is kept as is.
    #[must_use]
    pub fn min_per_field(self, other: Self) -> Self {
        self.zip(other, u64::min)
    }

    /// Per-clock maximum. A clock present on only one side is kept as is.
    #[must_use]
    pub fn max_per_field(self, other: Self) -> Self {
        self.zip(other, u64::max)
    }

    fn map(self, f: impl Fn(u64) -> u64) -> Self {
        Self {
            elapsed: self.elapsed.map(&f),
            system_uptime: self.system_uptime.map(&f),
            unix: self.unix.map(&f),
        }
    }

    fn zip(self, other: Self, f: impl Fn(u64, u64) -> u64) -> Self {
        let pick = |a: Option<u64>, b: Option<u64>| match (a, b) {
            (Some(a), Some(b)) => Some(f(a, b)),
            (a, b) => a.or(b),
        };
        Self {
            elapsed: pick(self.elapsed, other.elapsed),
            system_uptime: pick(self.system_uptime, other.system_uptime),
            unix: pick(self.unix, other.unix),
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "durations beyond u64 nanoseconds (584 years) saturate"
)]
fn duration_nanos(d: Duration) -> u64 {
    d.as_nanos().min(u128::from(u64::MAX)) as u64
}

/// Formats nanoseconds as `1d2h3m4s5ms6ns`, omitting zero units.
#[must_use]
pub fn format_elapsed(nanos: u64) -> String {
    use core::fmt::Write as _;

    const UNITS: [(u64, &str); 6] = [
        (86_400_000_000_000, "d"),
        (3_600_000_000_000, "h"),
        (60_000_000_000, "m"),
        (1_000_000_000, "s"),
        (1_000_000, "ms"),
        (1, "ns"),
    ];
    if nanos == 0 {
        return String::from("0ns");
    }
    let mut out = String::new();
    let mut rest = nanos;
    for (size, suffix) in UNITS {
        let count = rest / size;
        if count > 0 {
            let _ = write!(out, "{count}{suffix}");
            rest %= size;
        }
    }
    out
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut t = f.debug_struct("Timestamp");
        if let Some(v) = self.elapsed {
            t.field("elapsed", &v);
        }
        if let Some(v) = self.system_uptime {
            t.field("system_uptime", &v);
        }
        if let Some(v) = self.unix {
            t.field("unix", &v);
        }
        t.finish()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.elapsed, self.system_uptime, self.unix) {
            (Some(e), _, _) => write!(f, "{} ({e}ns)", format_elapsed(e)),
            (None, Some(s), _) => write!(f, "uptime {s}ns"),
            (None, None, Some(u)) => write!(f, "unix {u}ns"),
            (None, None, None) => f.write_str("<no timestamp>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_means_absent() {
        let ts = Timestamp::new(5, 0, 7);
        assert_eq!(ts.get(TimeField::Elapsed), Some(5));
        assert_eq!(ts.get(TimeField::SystemUptime), None);
        assert!(Timestamp::new(0, 0, 0).is_empty(), "all zero is empty");
    }

    #[test]
    fn comparison_needs_shared_field() {
        let a = Timestamp::from_elapsed(10);
        let b = Timestamp::from_unix(20);
        assert_eq!(a.cmp_on(&b, TimeField::Elapsed), None);
        assert_eq!(a.compare_preferred(&b), None);
        let c = Timestamp::new(30, 0, 1);
        let d = Timestamp::new(10, 0, 2);
        assert_eq!(c.compare_preferred(&d), Some(Ordering::Less), "unix wins");
        assert_eq!(c.cmp_on(&d, TimeField::Elapsed), Some(Ordering::Greater));
    }

    #[test]
    fn arithmetic_clamps() {
        let ts = Timestamp::from_elapsed(1_000);
        assert_eq!(
            ts.saturating_sub(Duration::from_micros(5)).elapsed(),
            Some(1),
            "clamped clock stays present"
        );
        assert_eq!(ts.saturating_sub(Duration::from_nanos(1)).elapsed(), Some(999));
        assert_eq!(ts.saturating_add(Duration::from_nanos(1)).elapsed(), Some(1_001));
        assert_eq!(Timestamp::EMPTY.saturating_add(Duration::from_secs(1)), Timestamp::EMPTY);
    }

    #[test]
    fn zero_reading_is_empty() {
        assert!(Timestamp::from_elapsed(0).is_empty(), "zero elapsed is absent");
        assert_eq!(Timestamp::from_unix(0), Timestamp::EMPTY);
        assert!(!Timestamp::from_elapsed(1).is_empty());
    }

    #[test]
    fn clamped_sub_survives_serde() {
        let ts = Timestamp::new(3, 0, 2).saturating_sub(Duration::from_secs(1));
        assert_eq!(ts, Timestamp::new(1, 0, 1));
        let back: Timestamp = serde_json::from_value(serde_json::to_value(ts).unwrap()).unwrap();
        assert_eq!(back, ts, "clamped value is not read back as absent");
        assert_eq!(back.cmp_on(&Timestamp::MIN, TimeField::Elapsed), Some(Ordering::Equal));
    }

    #[test]
    fn per_field_min_max() {
        let a = Timestamp::new(10, 0, 100);
        let b = Timestamp::new(20, 5, 0);
        assert_eq!(a.min_per_field(b), Timestamp::new(10, 5, 100));
        assert_eq!(a.max_per_field(b), Timestamp::new(20, 5, 100));
    }

    #[test]
    fn elapsed_formatting() {
        assert_eq!(format_elapsed(0), "0ns");
        assert_eq!(format_elapsed(1_500_000_007), "1s500ms7ns");
        assert_eq!(format_elapsed(90_061_000_000_000), "1d1h1m1s");
    }

    #[test]
    fn serde_uses_zero_for_absent() {
        let ts: Timestamp = serde_json::from_str(r#"{"elapsed_nanos": 42}"#).unwrap();
        assert_eq!(ts, Timestamp::from_elapsed(42));
        let json = serde_json::to_value(ts).unwrap();
        assert_eq!(json["unix_nanos"], 0);
    }
}

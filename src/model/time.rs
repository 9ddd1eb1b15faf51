// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Durations, timing methods, and the duration text grammar.
//!
//! `TimeSpan` is a signed nanosecond-precision duration backed by
//! `chrono::TimeDelta`. Text input follows `[+-]? ((h:)? m:)? s (.frac)?`
//! and is always formatted back to hundredths for display, so equivalent
//! spellings ("83.45", "1:23.450") collapse to one canonical form.

use chrono::TimeDelta;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Index, Sub};
use thiserror::Error;

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_HUNDREDTH: i64 = 10_000_000;
const MAX_FRACTION_DIGITS: usize = 9;

// ============================================================================
// PARSE ERRORS
// ============================================================================

/// Reasons a duration string does not match the grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseTimeError {
    #[error("empty duration")]
    Empty,
    #[error("too many `:` separated components")]
    TooManyComponents,
    #[error("invalid duration component `{0}`")]
    InvalidComponent(String),
    #[error("fraction has more than 9 digits")]
    FractionTooLong,
    #[error("duration out of range")]
    OutOfRange,
}

// ============================================================================
// TIME SPAN
// ============================================================================

/// A signed duration with nanosecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSpan(TimeDelta);

impl TimeSpan {
    pub fn zero() -> Self {
        Self(TimeDelta::zero())
    }

    pub fn from_nanos(nanos: i64) -> Self {
        Self(TimeDelta::nanoseconds(nanos))
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(TimeDelta::milliseconds(millis))
    }

    pub fn from_seconds(seconds: f64) -> Self {
        Self::from_nanos((seconds * NANOS_PER_SECOND as f64).round() as i64)
    }

    /// Total nanoseconds; saturates for spans beyond ~292 years.
    pub fn total_nanos(self) -> i64 {
        self.0.num_nanoseconds().unwrap_or(if self.0 < TimeDelta::zero() {
            i64::MIN
        } else {
            i64::MAX
        })
    }

    pub fn total_seconds(self) -> f64 {
        self.total_nanos() as f64 / NANOS_PER_SECOND as f64
    }

    pub fn is_negative(self) -> bool {
        self.0 < TimeDelta::zero()
    }

    /// Parse a duration string.
    pub fn parse(text: &str) -> Result<Self, ParseTimeError> {
        let text = text.trim();
        let (negative, rest) = if let Some(rest) = text.strip_prefix('-') {
            (true, rest)
        } else if let Some(rest) = text.strip_prefix('+') {
            (false, rest)
        } else {
            (false, text)
        };
        if rest.is_empty() {
            return Err(ParseTimeError::Empty);
        }

        let parts: Vec<&str> = rest.split(':').collect();
        if parts.len() > 3 {
            return Err(ParseTimeError::TooManyComponents);
        }
        let (leading, last) = parts.split_at(parts.len() - 1);
        let (seconds, fraction) = match last[0].split_once('.') {
            Some((seconds, fraction)) => (seconds, Some(fraction)),
            None => (last[0], None),
        };

        let mut total_seconds: i64 = 0;
        for part in leading.iter().copied().chain(std::iter::once(seconds)) {
            let value = parse_digits(part)?;
            total_seconds = total_seconds
                .checked_mul(60)
                .and_then(|s| s.checked_add(value))
                .ok_or(ParseTimeError::OutOfRange)?;
        }

        let fraction_nanos = match fraction {
            Some(fraction) => parse_fraction(fraction)?,
            None => 0,
        };

        let nanos = total_seconds
            .checked_mul(NANOS_PER_SECOND)
            .and_then(|n| n.checked_add(fraction_nanos))
            .ok_or(ParseTimeError::OutOfRange)?;

        Ok(Self::from_nanos(if negative { -nanos } else { nanos }))
    }

    /// Parse a duration string where empty input means "no time".
    pub fn parse_optional(text: &str) -> Result<Option<Self>, ParseTimeError> {
        if text.trim().is_empty() {
            Ok(None)
        } else {
            Self::parse(text).map(Some)
        }
    }
}

fn parse_digits(part: &str) -> Result<i64, ParseTimeError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseTimeError::InvalidComponent(part.to_string()));
    }
    part.parse().map_err(|_| ParseTimeError::OutOfRange)
}

fn parse_fraction(fraction: &str) -> Result<i64, ParseTimeError> {
    if fraction.len() > MAX_FRACTION_DIGITS {
        return Err(ParseTimeError::FractionTooLong);
    }
    let value = parse_digits(fraction)?;
    let scale = 10_i64.pow((MAX_FRACTION_DIGITS - fraction.len()) as u32);
    Ok(value * scale)
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.total_nanos();
        let abs = nanos.unsigned_abs();
        let total_seconds = abs / NANOS_PER_SECOND as u64;
        let hundredths = (abs % NANOS_PER_SECOND as u64) / NANOS_PER_HUNDREDTH as u64;
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if nanos < 0 {
            f.write_str("-")?;
        }
        if hours > 0 {
            write!(f, "{hours}:{minutes:02}:{seconds:02}.{hundredths:02}")
        } else if minutes > 0 {
            write!(f, "{minutes}:{seconds:02}.{hundredths:02}")
        } else {
            write!(f, "{seconds}.{hundredths:02}")
        }
    }
}

impl Default for TimeSpan {
    fn default() -> Self {
        Self::zero()
    }
}

impl Add for TimeSpan {
    type Output = TimeSpan;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for TimeSpan {
    type Output = TimeSpan;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

// Stored as fractional seconds so run files stay readable.
impl Serialize for TimeSpan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.total_seconds())
    }
}

impl<'de> Deserialize<'de> for TimeSpan {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Self::from_seconds)
    }
}

/// Format an optional time for a text field (empty when absent)
pub fn format_optional(time: Option<TimeSpan>) -> String {
    time.map(|t| t.to_string()).unwrap_or_default()
}

// ============================================================================
// TIMING METHOD
// ============================================================================

/// Which clock a time value belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimingMethod {
    #[default]
    RealTime,
    GameTime,
}

impl TimingMethod {
    pub const ALL: [TimingMethod; 2] = [TimingMethod::RealTime, TimingMethod::GameTime];
}

impl fmt::Display for TimingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingMethod::RealTime => f.write_str("Real Time"),
            TimingMethod::GameTime => f.write_str("Game Time"),
        }
    }
}

// ============================================================================
// TIME
// ============================================================================

/// A pair of optional durations, one per timing method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Time {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_time: Option<TimeSpan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_time: Option<TimeSpan>,
}

impl Time {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, method: TimingMethod) -> Option<TimeSpan> {
        self[method]
    }

    pub fn set(&mut self, method: TimingMethod, value: Option<TimeSpan>) {
        match method {
            TimingMethod::RealTime => self.real_time = value,
            TimingMethod::GameTime => self.game_time = value,
        }
    }

    pub fn with(mut self, method: TimingMethod, value: Option<TimeSpan>) -> Self {
        self.set(method, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.real_time.is_none() && self.game_time.is_none()
    }
}

impl Index<TimingMethod> for Time {
    type Output = Option<TimeSpan>;

    fn index(&self, method: TimingMethod) -> &Option<TimeSpan> {
        match method {
            TimingMethod::RealTime => &self.real_time,
            TimingMethod::GameTime => &self.game_time,
        }
    }
}

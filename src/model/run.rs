// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Run data model: segments, comparisons, and attempt history.
//!
//! A `Run` is plain owned data that serializes to JSON. Personal best split
//! times live directly on each segment; every custom comparison is a column
//! name in `Run::comparisons` plus one `Time` per segment at the same index
//! in `Segment::comparisons`. Methods that change comparisons keep those
//! vectors aligned. `validate` checks the invariants on freshly loaded data.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::Path;
use thiserror::Error;

use super::icon::Icon;
use super::time::{Time, TimeSpan, TimingMethod};

// ============================================================================
// COMPARISON NAMES
// ============================================================================

pub const PERSONAL_BEST: &str = "Personal Best";
pub const BEST_SEGMENTS: &str = "Best Segments";

/// Names owned by generated comparisons; users can't take them
pub const RESERVED_COMPARISONS: [&str; 8] = [
    PERSONAL_BEST,
    BEST_SEGMENTS,
    "Average Segments",
    "Median Segments",
    "Worst Segments",
    "Balanced PB",
    "Latest Run",
    "None",
];

/// Prefix used by race comparisons injected at runtime
pub const RACE_PREFIX: &str = "[Race]";

/// Why a comparison name was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComparisonNameError {
    #[error("comparison name is empty")]
    Empty,
    #[error("`{0}` is a reserved comparison name")]
    Reserved(String),
    #[error("a comparison named `{0}` already exists")]
    Duplicate(String),
}

/// Whether a name belongs to a generated or race comparison
pub fn is_reserved_comparison_name(name: &str) -> bool {
    RESERVED_COMPARISONS.contains(&name) || name.starts_with(RACE_PREFIX)
}

/// Invariant violations found in loaded run data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("a run needs at least one segment")]
    NoSegments,
    #[error("segment {segment} has {found} comparison times, expected {expected}")]
    ComparisonCountMismatch {
        segment: usize,
        expected: usize,
        found: usize,
    },
    #[error(transparent)]
    InvalidComparison(#[from] ComparisonNameError),
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One leg of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    /// Cumulative time of the personal best at the end of this segment
    #[serde(default)]
    pub personal_best_split_time: Time,
    #[serde(default)]
    pub best_segment_time: Time,
    /// Cumulative comparison times, aligned with `Run::comparisons`
    #[serde(default)]
    pub comparisons: Vec<Time>,
    /// Segment times per attempt id
    #[serde(default)]
    pub segment_history: BTreeMap<i32, Time>,
}

impl Segment {
    pub fn new(name: impl Into<String>, comparison_count: usize) -> Self {
        Self {
            name: name.into(),
            icon: None,
            personal_best_split_time: Time::new(),
            best_segment_time: Time::new(),
            comparisons: vec![Time::new(); comparison_count],
            segment_history: BTreeMap::new(),
        }
    }
}

/// A finished or reset attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub index: i32,
    #[serde(default)]
    pub time: Time,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended: Option<DateTime<Utc>>,
}

/// A complete set of splits for one game and category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    #[serde(default)]
    pub game_name: String,
    #[serde(default)]
    pub category_name: String,
    #[serde(default)]
    pub offset: TimeSpan,
    #[serde(default)]
    pub attempt_count: u32,
    #[serde(default)]
    pub attempt_history: Vec<Attempt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_icon: Option<Icon>,
    /// Custom comparison names in column order
    #[serde(default)]
    pub comparisons: Vec<String>,
    pub segments: Vec<Segment>,
}

impl Run {
    /// Create a run with a single unnamed segment
    pub fn new() -> Self {
        Self {
            game_name: String::new(),
            category_name: String::new(),
            offset: TimeSpan::zero(),
            attempt_count: 0,
            attempt_history: Vec::new(),
            game_icon: None,
            comparisons: Vec::new(),
            segments: vec![Segment::new("", 0)],
        }
    }

    /// Create a run with named segments and no times
    pub fn with_segments<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut run = Self::new();
        let segments: Vec<Segment> = names.into_iter().map(|n| Segment::new(n, 0)).collect();
        if !segments.is_empty() {
            run.segments = segments;
        }
        run
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Check the invariants the editor relies on
    pub fn validate(&self) -> Result<(), RunError> {
        if self.segments.is_empty() {
            return Err(RunError::NoSegments);
        }
        for (i, name) in self.comparisons.iter().enumerate() {
            check_comparison_name(&self.comparisons[..i], name)?;
        }
        let expected = self.comparisons.len();
        for (segment, s) in self.segments.iter().enumerate() {
            if s.comparisons.len() != expected {
                return Err(RunError::ComparisonCountMismatch {
                    segment,
                    expected,
                    found: s.comparisons.len(),
                });
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Comparisons
    // ------------------------------------------------------------------

    pub fn comparison_index(&self, name: &str) -> Option<usize> {
        self.comparisons.iter().position(|c| c == name)
    }

    /// Check a name that is about to be added
    pub fn check_new_comparison_name(&self, name: &str) -> Result<(), ComparisonNameError> {
        check_comparison_name(&self.comparisons, name)
    }

    /// Append an empty comparison column
    pub fn add_comparison(&mut self, name: &str) -> Result<usize, ComparisonNameError> {
        self.check_new_comparison_name(name)?;
        self.comparisons.push(name.to_string());
        for segment in &mut self.segments {
            segment.comparisons.push(Time::new());
        }
        Ok(self.comparisons.len() - 1)
    }

    /// Rename a comparison in place; returns false if `old` doesn't exist
    pub fn rename_comparison(&mut self, old: &str, new: &str) -> Result<bool, ComparisonNameError> {
        let Some(index) = self.comparison_index(old) else {
            return Ok(false);
        };
        if old == new {
            return Ok(true);
        }
        self.check_new_comparison_name(new)?;
        self.comparisons[index] = new.to_string();
        Ok(true)
    }

    /// Drop a comparison column and its times
    pub fn remove_comparison(&mut self, name: &str) -> bool {
        let Some(index) = self.comparison_index(name) else {
            return false;
        };
        self.comparisons.remove(index);
        for segment in &mut self.segments {
            segment.comparisons.remove(index);
        }
        true
    }

    // ------------------------------------------------------------------
    // Derived times
    // ------------------------------------------------------------------

    /// Personal best split time at `index`
    pub fn split_time(&self, index: usize, method: TimingMethod) -> Option<TimeSpan> {
        self.segments.get(index)?.personal_best_split_time[method]
    }

    /// Personal best split time of the segment before `index` (zero at start)
    pub fn previous_split_time(&self, index: usize, method: TimingMethod) -> Option<TimeSpan> {
        match index.checked_sub(1) {
            Some(previous) => self.split_time(previous, method),
            None => Some(TimeSpan::zero()),
        }
    }

    /// Personal best segment time at `index`
    pub fn segment_time(&self, index: usize, method: TimingMethod) -> Option<TimeSpan> {
        let split = self.split_time(index, method)?;
        let previous = self.previous_split_time(index, method)?;
        Some(split - previous)
    }

    /// Sum of best segment times over `range`, if all of them are known
    pub fn sum_of_best(
        &self,
        range: RangeInclusive<usize>,
        method: TimingMethod,
    ) -> Option<TimeSpan> {
        self.segments
            .get(range)?
            .iter()
            .try_fold(TimeSpan::zero(), |sum, s| Some(sum + s.best_segment_time[method]?))
    }

    pub fn attempt(&self, index: i32) -> Option<&Attempt> {
        self.attempt_history.iter().find(|a| a.index == index)
    }

    // ------------------------------------------------------------------
    // Bulk clearing
    // ------------------------------------------------------------------

    /// Forget every attempt and segment history entry
    pub fn clear_history(&mut self) {
        self.attempt_history.clear();
        for segment in &mut self.segments {
            segment.segment_history.clear();
        }
    }

    /// Forget history plus all personal best, best segment and comparison
    /// times; the attempt counter starts over
    pub fn clear_times(&mut self) {
        self.clear_history();
        self.attempt_count = 0;
        for segment in &mut self.segments {
            segment.personal_best_split_time = Time::new();
            segment.best_segment_time = Time::new();
            for time in &mut segment.comparisons {
                *time = Time::new();
            }
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Parse and validate run JSON
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let run: Run = serde_json::from_slice(bytes).context("Not a splitbench run file")?;
        run.validate().context("Run file violates run invariants")?;
        Ok(run)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize run")
    }

    /// Load a run file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&bytes).with_context(|| format!("Failed to load {}", path.display()))
    }

    /// Write the run to disk as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }
}

impl Default for Run {
    fn default() -> Self {
        Self::new()
    }
}

fn check_comparison_name(existing: &[String], name: &str) -> Result<(), ComparisonNameError> {
    if name.trim().is_empty() {
        Err(ComparisonNameError::Empty)
    } else if is_reserved_comparison_name(name) {
        Err(ComparisonNameError::Reserved(name.to_string()))
    } else if existing.iter().any(|c| c == name) {
        Err(ComparisonNameError::Duplicate(name.to_string()))
    } else {
        Ok(())
    }
}

// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! The run-editing capability an `EditSession` drives.
//!
//! The session never touches run data directly. Every mutation goes through
//! `RunEditing`, which either accepts it (returns `true` / applies it) or
//! rejects it without side effects, and every view of the data comes from a
//! fresh `EditorState` projection.

use crate::model::{Run, TimingMethod};
use serde::{Deserialize, Serialize};

// ============================================================================
// SNAPSHOT TYPES
// ============================================================================

/// Selection tag of one segment row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionState {
    #[default]
    NotSelected,
    Selected,
    Active,
}

impl SelectionState {
    pub fn is_selected(self) -> bool {
        self != SelectionState::NotSelected
    }
}

/// Which structural buttons are currently usable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buttons {
    pub can_remove: bool,
    pub can_move_up: bool,
    pub can_move_down: bool,
}

/// One segment row of the editor projection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentState {
    /// Fresh icon URL when the icon changed since the previous projection,
    /// `Some("")` when it was removed
    pub icon_change: Option<String>,
    pub name: String,
    pub split_time: String,
    pub segment_time: String,
    pub best_segment_time: String,
    pub comparison_times: Vec<String>,
    pub selected: SelectionState,
}

/// Read-only projection of a run being edited
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorState {
    pub icon_change: Option<String>,
    pub game: String,
    pub category: String,
    pub offset: String,
    pub attempts: String,
    pub timing_method: TimingMethod,
    pub segments: Vec<SegmentState>,
    pub comparison_names: Vec<String>,
    pub buttons: Buttons,
}

impl EditorState {
    /// Index of the active segment, if any
    pub fn active_index(&self) -> Option<usize> {
        self.segments
            .iter()
            .position(|s| s.selected == SelectionState::Active)
    }

    /// Indices of every selected (or active) segment
    pub fn selected_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.selected.is_selected())
            .map(|(i, _)| i)
    }
}

// ============================================================================
// MUTATION ARGUMENTS
// ============================================================================

/// Text fields of the active segment that parse into times
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    SplitTime,
    SegmentTime,
    BestSegmentTime,
    ComparisonTime(String),
}

/// Where an icon lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconSlot {
    Game,
    /// The currently active segment
    ActiveSegment,
}

/// Direction for moving selected segments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// A correction proposed by the sum of best cleaner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PotentialCleanUp {
    message: String,
    pub(crate) segment_index: usize,
    pub(crate) attempt_id: i32,
    pub(crate) method: TimingMethod,
}

impl PotentialCleanUp {
    pub(crate) fn new(
        message: String,
        segment_index: usize,
        attempt_id: i32,
        method: TimingMethod,
    ) -> Self {
        Self {
            message,
            segment_index,
            attempt_id,
            method,
        }
    }

    /// Human readable justification to show the user
    pub fn message(&self) -> &str {
        &self.message
    }
}

// ============================================================================
// CAPABILITIES
// ============================================================================

/// Lazily yields sum of best corrections. Dropping the cleaner releases it.
pub trait SumOfBestCleaner {
    /// Next proposal computed from the current run, or `None` when done
    fn next_potential_clean_up(&mut self) -> Option<PotentialCleanUp>;

    /// Apply a proposal to the run
    fn apply(&mut self, clean_up: PotentialCleanUp);
}

/// Exclusive editing access to one run
pub trait RunEditing {
    fn set_game_name(&mut self, name: &str);
    fn set_category_name(&mut self, name: &str);
    fn parse_and_set_offset(&mut self, text: &str) -> bool;
    fn parse_and_set_attempt_count(&mut self, text: &str) -> bool;
    fn select_timing_method(&mut self, method: TimingMethod);

    /// Insert an empty segment at `index` and make it the only selection
    fn insert_segment(&mut self, index: usize);
    fn remove_selected_segments(&mut self) -> bool;
    fn move_selected(&mut self, direction: MoveDirection) -> bool;

    /// Replace the selection; `active` must be one of `indices` if present
    fn set_selection(&mut self, indices: &[usize], active: Option<usize>);

    fn add_comparison(&mut self, name: &str) -> bool;
    fn rename_comparison(&mut self, old: &str, new: &str) -> bool;
    fn remove_comparison(&mut self, name: &str);
    /// Add `name` as a comparison holding `other`'s personal best
    fn import_comparison(&mut self, other: &Run, name: &str) -> bool;

    fn set_active_name(&mut self, name: &str) -> bool;
    fn parse_and_set_active_field(&mut self, field: &FieldKind, text: &str) -> bool;

    fn set_icon(&mut self, slot: IconSlot, bytes: &[u8]) -> bool;
    fn remove_icon(&mut self, slot: IconSlot);

    fn clear_history(&mut self);
    fn clear_times(&mut self);

    fn clean_sum_of_best(&mut self) -> Box<dyn SumOfBestCleaner + '_>;

    /// Project the current run. Icon changes are reported once per change.
    fn state(&mut self) -> EditorState;

    /// Give up editing and hand back the run
    fn into_run(self) -> Run
    where
        Self: Sized;
}

// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Structural edits for EditSession: rows, selection, comparisons, icons
//! and whole-run operations. Each one goes straight to the editor and then
//! refreshes; none of them use draft cells.

use super::EditSession;
use crate::editing::capability::{IconSlot, MoveDirection, RunEditing};
use crate::editing::cleanup::{CleanUpDecision, CleanupReport, run_cleanup};
use crate::editing::error::EditError;
use crate::editing::selection::Selection;
use crate::model::{Run, TimingMethod};

impl<E: RunEditing> EditSession<E> {
    // ------------------------------------------------------------------
    // Rows
    // ------------------------------------------------------------------

    pub fn insert_above(&mut self) -> Result<(), EditError> {
        let active = self.selection.active().ok_or(EditError::NoActiveSegment)?;
        self.editor.insert_segment(active);
        tracing::debug!("Inserted segment at {}", active);
        self.refresh_and_reset();
        Ok(())
    }

    pub fn insert_below(&mut self) -> Result<(), EditError> {
        let active = self.selection.active().ok_or(EditError::NoActiveSegment)?;
        self.editor.insert_segment(active + 1);
        tracing::debug!("Inserted segment at {}", active + 1);
        self.refresh_and_reset();
        Ok(())
    }

    pub fn remove_selected(&mut self) -> Result<(), EditError> {
        if !self.state.buttons.can_remove || !self.editor.remove_selected_segments() {
            return Err(EditError::IllegalStructuralOp);
        }
        tracing::debug!("Removed segments {:?}", self.selection.indices());
        self.refresh_and_reset();
        Ok(())
    }

    pub fn move_selected_up(&mut self) -> Result<(), EditError> {
        self.move_selected(MoveDirection::Up)
    }

    pub fn move_selected_down(&mut self) -> Result<(), EditError> {
        self.move_selected(MoveDirection::Down)
    }

    fn move_selected(&mut self, direction: MoveDirection) -> Result<(), EditError> {
        let buttons = self.state.buttons;
        let allowed = match direction {
            MoveDirection::Up => buttons.can_move_up,
            MoveDirection::Down => buttons.can_move_down,
        };
        if !allowed || !self.editor.move_selected(direction) {
            return Err(EditError::IllegalStructuralOp);
        }
        tracing::debug!("Moved segments {:?} {:?}", self.selection.indices(), direction);
        self.refresh_and_reset();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Push a new selection to the editor. Drafts of the previous active
    /// row are dropped when the active row changes.
    fn apply_selection(&mut self, selection: Selection) {
        self.editor
            .set_selection(&selection.indices(), selection.active());
        self.refresh();
    }

    fn has_row(&self, index: usize) -> bool {
        if index < self.state.segments.len() {
            return true;
        }
        tracing::debug!("Ignoring selection of missing row {}", index);
        false
    }

    /// Make `index` the only selected row and the active one. Rows past
    /// the end are ignored by every selection method.
    pub fn focus(&mut self, index: usize) {
        if !self.has_row(index) {
            return;
        }
        let mut selection = self.selection.clone();
        selection.focus(index);
        self.apply_selection(selection);
    }

    pub fn select_only(&mut self, index: usize) {
        if !self.has_row(index) {
            return;
        }
        let mut selection = self.selection.clone();
        selection.select_only(index);
        self.apply_selection(selection);
    }

    pub fn select_additional(&mut self, index: usize) {
        if !self.has_row(index) {
            return;
        }
        let mut selection = self.selection.clone();
        selection.select_additional(index);
        self.apply_selection(selection);
    }

    pub fn toggle_additional(&mut self, index: usize) {
        if !self.has_row(index) {
            return;
        }
        let mut selection = self.selection.clone();
        selection.toggle_additional(index);
        self.apply_selection(selection);
    }

    pub fn unselect(&mut self, index: usize) {
        if !self.has_row(index) {
            return;
        }
        let mut selection = self.selection.clone();
        selection.unselect(index);
        self.apply_selection(selection);
    }

    // ------------------------------------------------------------------
    // Comparisons
    // ------------------------------------------------------------------

    pub fn add_comparison(&mut self, name: &str) -> Result<(), EditError> {
        self.columns.add(&mut self.editor, name)?;
        self.refresh();
        Ok(())
    }

    pub fn rename_comparison(&mut self, old: &str, new: &str) -> Result<(), EditError> {
        self.columns.rename(&mut self.editor, old, new)?;
        self.refresh();
        Ok(())
    }

    pub fn remove_comparison(&mut self, name: &str) -> Result<(), EditError> {
        let column = self.columns.remove(&mut self.editor, name)?;
        if let Some(row) = &mut self.row {
            row.remove_column(column);
        }
        self.refresh();
        Ok(())
    }

    pub fn import_comparison(&mut self, other: &Run, name: &str) -> Result<(), EditError> {
        self.columns.import_from(&mut self.editor, other, name)?;
        self.refresh();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Icons
    // ------------------------------------------------------------------

    pub fn set_game_icon(&mut self, bytes: &[u8]) -> Result<(), EditError> {
        if !self.editor.set_icon(IconSlot::Game, bytes) {
            return Err(EditError::Resource);
        }
        self.refresh();
        Ok(())
    }

    pub fn remove_game_icon(&mut self) {
        self.editor.remove_icon(IconSlot::Game);
        self.refresh();
    }

    pub fn set_segment_icon(&mut self, bytes: &[u8]) -> Result<(), EditError> {
        if self.selection.active().is_none() {
            return Err(EditError::NoActiveSegment);
        }
        if !self.editor.set_icon(IconSlot::ActiveSegment, bytes) {
            return Err(EditError::Resource);
        }
        self.refresh();
        Ok(())
    }

    pub fn remove_segment_icon(&mut self) -> Result<(), EditError> {
        if self.selection.active().is_none() {
            return Err(EditError::NoActiveSegment);
        }
        self.editor.remove_icon(IconSlot::ActiveSegment);
        self.refresh();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Whole run
    // ------------------------------------------------------------------

    /// Switch which timing method the time fields show and edit
    pub fn select_timing_method(&mut self, method: TimingMethod) {
        self.editor.select_timing_method(method);
        tracing::debug!("Editing {}", method);
        self.refresh_and_reset();
    }

    pub fn clear_history(&mut self) {
        self.editor.clear_history();
        tracing::info!("Cleared run history");
        self.refresh();
    }

    pub fn clear_times(&mut self) {
        self.editor.clear_times();
        tracing::info!("Cleared run times");
        self.refresh_and_reset();
    }

    /// Offer every sum of best correction to `decide`, then refresh once
    pub fn clean_sum_of_best(
        &mut self,
        decide: impl FnMut(&str) -> CleanUpDecision,
    ) -> CleanupReport {
        let report = {
            let mut cleaner = self.editor.clean_sum_of_best();
            run_cleanup(&mut *cleaner, decide)
        };
        self.refresh();
        report
    }
}

// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Text field edits for EditSession
//!
//! Every field goes through its draft cell: the cell keeps what was typed,
//! and only text the grammar accepts reaches the editor. A refresh follows
//! each accepted commit; a rejected one leaves the projection alone.

use super::EditSession;
use crate::editing::capability::{FieldKind, RunEditing};
use crate::editing::error::EditError;
use crate::editing::field::RowField;

fn parse_error(field: &'static str, text: &str) -> EditError {
    EditError::Parse {
        field,
        text: text.to_string(),
    }
}

impl<E: RunEditing> EditSession<E> {
    // ------------------------------------------------------------------
    // Run header
    // ------------------------------------------------------------------

    pub fn set_game_name(&mut self, name: &str) {
        self.editor.set_game_name(name);
        tracing::debug!("Game name set to {:?}", name);
        self.refresh();
    }

    pub fn set_category_name(&mut self, name: &str) {
        self.editor.set_category_name(name);
        tracing::debug!("Category name set to {:?}", name);
        self.refresh();
    }

    pub fn parse_and_set_offset(&mut self, text: &str) -> Result<(), EditError> {
        let editor = &mut self.editor;
        if self.offset.set_raw(text, |t| editor.parse_and_set_offset(t)) {
            self.refresh();
            Ok(())
        } else {
            Err(parse_error("offset", text))
        }
    }

    pub fn parse_and_set_attempt_count(&mut self, text: &str) -> Result<(), EditError> {
        let editor = &mut self.editor;
        if self
            .attempts
            .set_raw(text, |t| editor.parse_and_set_attempt_count(t))
        {
            self.refresh();
            Ok(())
        } else {
            Err(parse_error("attempt count", text))
        }
    }

    pub fn blur_offset(&mut self) {
        self.offset.blur();
    }

    pub fn blur_attempt_count(&mut self) {
        self.attempts.blur();
    }

    // ------------------------------------------------------------------
    // Active segment
    // ------------------------------------------------------------------

    pub fn set_segment_name(&mut self, name: &str) -> Result<(), EditError> {
        if self.selection.active().is_none() || !self.editor.set_active_name(name) {
            return Err(EditError::NoActiveSegment);
        }
        self.refresh();
        Ok(())
    }

    pub fn set_split_time(&mut self, text: &str) -> Result<(), EditError> {
        self.set_row_field(RowField::SplitTime, text)
    }

    pub fn set_segment_time(&mut self, text: &str) -> Result<(), EditError> {
        self.set_row_field(RowField::SegmentTime, text)
    }

    pub fn set_best_segment_time(&mut self, text: &str) -> Result<(), EditError> {
        self.set_row_field(RowField::BestSegmentTime, text)
    }

    pub fn set_comparison_time(&mut self, comparison: &str, text: &str) -> Result<(), EditError> {
        let column = self
            .columns
            .position(comparison)
            .ok_or_else(|| EditError::UnknownComparison(comparison.to_string()))?;
        self.set_row_field(RowField::Comparison(column), text)
    }

    /// Type `text` into a time field of the active row
    pub fn set_row_field(&mut self, field: RowField, text: &str) -> Result<(), EditError> {
        let (kind, label) = match field {
            RowField::SplitTime => (FieldKind::SplitTime, "split time"),
            RowField::SegmentTime => (FieldKind::SegmentTime, "segment time"),
            RowField::BestSegmentTime => (FieldKind::BestSegmentTime, "best segment time"),
            RowField::Comparison(column) => {
                let name = self
                    .columns
                    .names()
                    .get(column)
                    .ok_or(EditError::NoSuchColumn(column))?;
                (FieldKind::ComparisonTime(name.clone()), "comparison time")
            }
        };

        let cell = self
            .row
            .as_mut()
            .and_then(|row| row.cell_mut(field))
            .ok_or(EditError::NoActiveSegment)?;
        let editor = &mut self.editor;
        if cell.set_raw(text, |t| editor.parse_and_set_active_field(&kind, t)) {
            tracing::debug!("Committed {} {:?}", label, text);
            self.refresh();
            Ok(())
        } else {
            Err(parse_error(label, text))
        }
    }

    /// Drop the draft of one field of the active row
    pub fn blur_row_field(&mut self, field: RowField) {
        if let Some(cell) = self.row.as_mut().and_then(|row| row.cell_mut(field)) {
            cell.blur();
        }
    }

    /// Drop every draft of the active row
    pub fn blur_row(&mut self) {
        if let Some(row) = &mut self.row {
            row.blur_all();
        }
    }
}

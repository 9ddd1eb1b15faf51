// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Field validation cells: local drafts of text fields.
//!
//! A cell holds whatever the user last typed, independent of the committed
//! value. While the user is typing, the view shows the raw text (even after
//! it was committed, so keystrokes are never reformatted under the cursor).
//! Blurring the field throws the draft away and the committed, canonically
//! formatted value shows again.

use crate::model::TimeSpan;

/// Which text a field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGrammar {
    /// Duration text; empty clears the time
    Duration,
    /// Non-negative integer; empty means zero
    Count,
}

impl FieldGrammar {
    pub fn accepts(self, text: &str) -> bool {
        let text = text.trim();
        match self {
            FieldGrammar::Duration => TimeSpan::parse_optional(text).is_ok(),
            FieldGrammar::Count => {
                text.is_empty()
                    || (text.bytes().all(|b| b.is_ascii_digit()) && text.parse::<u32>().is_ok())
            }
        }
    }
}

/// Draft state of one text field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCell {
    grammar: FieldGrammar,
    raw: Option<String>,
    valid: bool,
}

impl FieldCell {
    pub fn new(grammar: FieldGrammar) -> Self {
        Self {
            grammar,
            raw: None,
            valid: true,
        }
    }

    /// Record a keystroke's worth of text.
    ///
    /// `commit` runs only when the grammar accepts the text; its answer is
    /// the final validity. Returns whether the text was accepted.
    pub fn set_raw(&mut self, text: &str, commit: impl FnOnce(&str) -> bool) -> bool {
        self.raw = Some(text.to_string());
        self.valid = self.grammar.accepts(text) && commit(text);
        self.valid
    }

    /// Drop the draft and mirror the committed value again
    pub fn blur(&mut self) {
        self.raw = None;
        self.valid = true;
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_editing(&self) -> bool {
        self.raw.is_some()
    }

    /// Text to show: the draft while editing, otherwise `committed`
    pub fn display<'a>(&'a self, committed: &'a str) -> &'a str {
        self.raw.as_deref().unwrap_or(committed)
    }
}

/// A time field in a segment row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowField {
    SplitTime,
    SegmentTime,
    BestSegmentTime,
    /// Comparison column by position
    Comparison(usize),
}

/// Draft cells of the focused segment row.
///
/// Comparison cells are keyed by column position, so renaming a column
/// leaves in-flight drafts alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCells {
    index: usize,
    split_time: FieldCell,
    segment_time: FieldCell,
    best_segment_time: FieldCell,
    comparisons: Vec<FieldCell>,
}

impl RowCells {
    pub fn new(index: usize, columns: usize) -> Self {
        Self {
            index,
            split_time: FieldCell::new(FieldGrammar::Duration),
            segment_time: FieldCell::new(FieldGrammar::Duration),
            best_segment_time: FieldCell::new(FieldGrammar::Duration),
            comparisons: vec![FieldCell::new(FieldGrammar::Duration); columns],
        }
    }

    /// Segment row these cells belong to
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn cell(&self, field: RowField) -> Option<&FieldCell> {
        match field {
            RowField::SplitTime => Some(&self.split_time),
            RowField::SegmentTime => Some(&self.segment_time),
            RowField::BestSegmentTime => Some(&self.best_segment_time),
            RowField::Comparison(k) => self.comparisons.get(k),
        }
    }

    pub fn cell_mut(&mut self, field: RowField) -> Option<&mut FieldCell> {
        match field {
            RowField::SplitTime => Some(&mut self.split_time),
            RowField::SegmentTime => Some(&mut self.segment_time),
            RowField::BestSegmentTime => Some(&mut self.best_segment_time),
            RowField::Comparison(k) => self.comparisons.get_mut(k),
        }
    }

    /// Resize the comparison cells to the current column count
    pub fn sync_columns(&mut self, columns: usize) {
        self.comparisons
            .resize(columns, FieldCell::new(FieldGrammar::Duration));
    }

    /// Drop the draft of a removed column. Cells to its right shift left
    /// with their columns.
    pub fn remove_column(&mut self, column: usize) {
        if column < self.comparisons.len() {
            self.comparisons.remove(column);
        }
    }

    /// Blur every cell in the row
    pub fn blur_all(&mut self) {
        self.split_time.blur();
        self.segment_time.blur();
        self.best_segment_time.blur();
        self.comparisons.iter_mut().for_each(FieldCell::blur);
    }
}

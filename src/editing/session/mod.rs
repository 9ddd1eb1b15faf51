// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Edit session - manages editing state for a single run

mod fields;
mod structure;

use super::capability::{EditorState, RunEditing, SegmentState};
use super::columns::ComparisonColumns;
use super::field::{FieldCell, FieldGrammar, RowCells, RowField};
use super::icon_cache::{IconCache, IconKey};
use super::selection::Selection;
use crate::model::Run;
use std::sync::Arc;

/// Text of a field as it should be shown, with its validity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldView<'a> {
    pub text: &'a str,
    pub valid: bool,
}

impl<'a> FieldView<'a> {
    fn of(cell: Option<&'a FieldCell>, committed: &'a str) -> Self {
        match cell {
            Some(cell) => Self {
                text: cell.display(committed),
                valid: cell.is_valid(),
            },
            None => Self {
                text: committed,
                valid: true,
            },
        }
    }
}

/// Editing session for one run
///
/// The session owns the run editor for as long as the user edits. It layers
/// local drafts (what the user typed) over the last projection of the run,
/// and replaces that projection after every committed change. Nothing but
/// the editor ever holds run data, so discarding the session discards every
/// change.
#[derive(Debug)]
pub struct EditSession<E: RunEditing> {
    /// The run editor; the only path to run data
    editor: E,

    /// Last projection of the run. Replaced wholesale, never patched.
    state: Arc<EditorState>,

    /// Draft of the offset field
    offset: FieldCell,

    /// Draft of the attempt count field
    attempts: FieldCell,

    /// Drafts of the active row, `None` when no row is active
    row: Option<RowCells>,

    /// Selection mirrored from the projection
    selection: Selection,

    /// Comparison columns mirrored from the projection
    columns: ComparisonColumns,

    /// Icon URLs that survive projections without icon changes
    icons: IconCache,
}

impl<E: RunEditing> EditSession<E> {
    /// Start editing with exclusive ownership of `editor`
    pub fn new(mut editor: E) -> Self {
        let state = editor.state();
        let mut icons = IconCache::new();
        icons.observe(&state);
        let row = state
            .active_index()
            .map(|index| RowCells::new(index, state.comparison_names.len()));
        tracing::info!(
            "Opened run editor for {:?} ({} segments)",
            state.game,
            state.segments.len()
        );

        Self {
            selection: Selection::from_state(&state),
            columns: ComparisonColumns::from_state(&state),
            offset: FieldCell::new(FieldGrammar::Duration),
            attempts: FieldCell::new(FieldGrammar::Count),
            row,
            icons,
            state: Arc::new(state),
            editor,
        }
    }

    /// Re-read the run and replace the projection.
    ///
    /// This is the only place the projection changes. Icon cache, selection,
    /// columns and the active row's cells all follow it here.
    pub(super) fn refresh(&mut self) {
        let state = self.editor.state();
        self.icons.observe(&state);
        self.selection = Selection::from_state(&state);
        self.columns.sync(&state);

        let columns = state.comparison_names.len();
        self.row = match (self.row.take(), state.active_index()) {
            (Some(mut row), Some(active)) if row.index() == active => {
                row.sync_columns(columns);
                Some(row)
            }
            (_, active) => active.map(|index| RowCells::new(index, columns)),
        };
        self.state = Arc::new(state);
    }

    /// Drop every draft, then refresh. Used after edits that move rows
    /// around or change what the committed texts mean.
    pub(super) fn refresh_and_reset(&mut self) {
        self.row = None;
        self.offset.blur();
        self.attempts.blur();
        self.refresh();
    }

    /// Finish editing. Saving hands the run back; otherwise it is dropped
    /// together with the editor.
    pub fn close(self, save: bool) -> Option<Run> {
        let run = self.editor.into_run();
        if save {
            tracing::info!("Run editor closed, changes kept");
            Some(run)
        } else {
            tracing::info!("Run editor closed, changes discarded");
            None
        }
    }

    // ------------------------------------------------------------------
    // View accessors
    // ------------------------------------------------------------------

    /// The current projection
    pub fn snapshot(&self) -> &Arc<EditorState> {
        &self.state
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn columns(&self) -> &ComparisonColumns {
        &self.columns
    }

    pub fn active_index(&self) -> Option<usize> {
        self.selection.active()
    }

    pub fn segment(&self, index: usize) -> Option<&SegmentState> {
        self.state.segments.get(index)
    }

    pub fn offset_field(&self) -> FieldView<'_> {
        FieldView::of(Some(&self.offset), &self.state.offset)
    }

    pub fn attempts_field(&self) -> FieldView<'_> {
        FieldView::of(Some(&self.attempts), &self.state.attempts)
    }

    /// A time field of any row. Only the active row has drafts.
    pub fn row_field(&self, index: usize, field: RowField) -> Option<FieldView<'_>> {
        let segment = self.state.segments.get(index)?;
        let committed = match field {
            RowField::SplitTime => &segment.split_time,
            RowField::SegmentTime => &segment.segment_time,
            RowField::BestSegmentTime => &segment.best_segment_time,
            RowField::Comparison(k) => segment.comparison_times.get(k)?,
        };
        let cell = self
            .row
            .as_ref()
            .filter(|row| row.index() == index)
            .and_then(|row| row.cell(field));
        Some(FieldView::of(cell, committed))
    }

    pub fn game_icon(&self) -> &str {
        self.icons.resolve(IconKey::Game)
    }

    pub fn segment_icon(&self, index: usize) -> &str {
        self.icons.resolve(IconKey::Segment(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::capability::SelectionState;
    use crate::editing::cleanup::CleanUpDecision;
    use crate::editing::error::EditError;
    use crate::model::icon::test_png;
    use crate::model::sum_of_best::tests::dirty_run;
    use crate::model::{RunEditor, TimeSpan, TimingMethod};

    fn session(names: &[&str]) -> EditSession<RunEditor> {
        let run = Run::with_segments(names.iter().copied());
        EditSession::new(RunEditor::new(run).unwrap())
    }

    fn text(session: &EditSession<RunEditor>, index: usize, field: RowField) -> String {
        session.row_field(index, field).unwrap().text.to_string()
    }

    #[test]
    fn typed_split_time_commits_and_garbage_reverts() {
        let mut session = session(&["Start", "End"]);
        session.set_split_time("1:23.45").unwrap();
        assert_eq!(
            session.editor().run().split_time(0, TimingMethod::RealTime),
            Some(TimeSpan::from_millis(83_450))
        );
        assert_eq!(session.snapshot().segments[0].split_time, "1:23.45");

        let err = session.set_split_time("abc").unwrap_err();
        assert!(matches!(err, EditError::Parse { .. }));
        let view = session.row_field(0, RowField::SplitTime).unwrap();
        assert_eq!(view.text, "abc");
        assert!(!view.valid);
        assert_eq!(
            session.editor().run().split_time(0, TimingMethod::RealTime),
            Some(TimeSpan::from_millis(83_450))
        );

        session.blur_row_field(RowField::SplitTime);
        let view = session.row_field(0, RowField::SplitTime).unwrap();
        assert_eq!(view.text, "1:23.45");
        assert!(view.valid);
    }

    #[test]
    fn draft_survives_refresh_until_blur() {
        let mut session = session(&["A"]);
        session.set_split_time("83.450").unwrap();
        session.set_game_name("Game");
        assert_eq!(text(&session, 0, RowField::SplitTime), "83.450");
        session.blur_row_field(RowField::SplitTime);
        assert_eq!(text(&session, 0, RowField::SplitTime), "1:23.45");
    }

    #[test]
    fn failed_edit_keeps_snapshot() {
        let mut session = session(&["A"]);
        let before = Arc::clone(session.snapshot());
        assert!(session.set_best_segment_time("-3").is_err());
        assert!(Arc::ptr_eq(&before, session.snapshot()));
    }

    #[test]
    fn offset_and_attempts() {
        let mut session = session(&["A"]);
        session.parse_and_set_offset("-5").unwrap();
        assert_eq!(session.editor().run().offset, TimeSpan::from_millis(-5000));
        assert!(session.parse_and_set_attempt_count("x").is_err());
        assert!(!session.attempts_field().valid);
        session.blur_attempt_count();
        assert_eq!(session.attempts_field().text, "0");
        session.parse_and_set_attempt_count("12").unwrap();
        assert_eq!(session.snapshot().attempts, "12");
        session.parse_and_set_offset("").unwrap();
        assert_eq!(session.editor().run().offset, TimeSpan::zero());
    }

    #[test]
    fn toggle_twice_restores_selection() {
        let mut session = session(&["A", "B", "C", "D"]);
        session.select_additional(2);
        let before: Vec<SelectionState> =
            session.snapshot().segments.iter().map(|s| s.selected).collect();
        for i in 0..4 {
            session.toggle_additional(i);
            session.toggle_additional(i);
            let selected: Vec<usize> = session.snapshot().selected_indices().collect();
            assert_eq!(selected, vec![0, 2]);
        }
        let after: Vec<SelectionState> =
            session.snapshot().segments.iter().map(|s| s.selected).collect();
        assert_eq!(after, before);
    }

    #[test]
    fn illegal_moves_change_nothing() {
        let mut session = session(&["A", "B"]);
        let before = Arc::clone(session.snapshot());
        assert_eq!(session.move_selected_up(), Err(EditError::IllegalStructuralOp));
        assert!(Arc::ptr_eq(&before, session.snapshot()));

        session.select_additional(1);
        assert_eq!(session.remove_selected(), Err(EditError::IllegalStructuralOp));
        assert_eq!(session.snapshot().segments.len(), 2);
    }

    #[test]
    fn insert_and_remove_rows() {
        let mut session = session(&["A", "B"]);
        session.focus(1);
        session.insert_below().unwrap();
        assert_eq!(session.active_index(), Some(2));
        session.set_segment_name("C").unwrap();
        session.focus(0);
        session.insert_above().unwrap();
        let names: Vec<&str> = session
            .snapshot()
            .segments
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, ["", "A", "B", "C"]);

        session.remove_selected().unwrap();
        assert_eq!(session.snapshot().segments.len(), 3);
        assert_eq!(session.active_index(), Some(0));
    }

    #[test]
    fn moving_rows_resets_drafts() {
        let mut session = session(&["A", "B"]);
        assert!(session.set_split_time("zzz").is_err());
        session.move_selected_down().unwrap();
        assert_eq!(session.active_index(), Some(1));
        assert!(session.row_field(1, RowField::SplitTime).unwrap().valid);
        assert_eq!(session.snapshot().segments[1].name, "A");
    }

    #[test]
    fn comparison_columns_and_cells() {
        let mut session = session(&["A"]);
        session.add_comparison("One").unwrap();
        session.add_comparison("Two").unwrap();
        assert_eq!(session.add_comparison("One"), Err(EditError::added()));
        assert_eq!(session.add_comparison("Personal Best"), Err(EditError::added()));

        session.set_comparison_time("Two", "12").unwrap();
        assert!(session.set_comparison_time("One", "nope").is_err());
        session.rename_comparison("One", "Uno").unwrap();
        assert_eq!(text(&session, 0, RowField::Comparison(0)), "nope");

        session.remove_comparison("Uno").unwrap();
        assert_eq!(session.columns().names(), ["Two"]);
        let view = session.row_field(0, RowField::Comparison(0)).unwrap();
        assert!(view.valid);
        assert_eq!(view.text, "12.00");
        assert_eq!(
            session.set_comparison_time("Uno", "1"),
            Err(EditError::UnknownComparison("Uno".to_string()))
        );
    }

    #[test]
    fn removing_a_column_keeps_later_drafts_with_their_columns() {
        let mut session = session(&["A"]);
        for name in ["One", "Two", "Three"] {
            session.add_comparison(name).unwrap();
        }
        session.set_comparison_time("Three", "30").unwrap();
        session.blur_row();
        session.set_comparison_time("Two", "12").unwrap();

        session.remove_comparison("One").unwrap();
        assert_eq!(session.columns().names(), ["Two", "Three"]);
        assert_eq!(text(&session, 0, RowField::Comparison(0)), "12");
        assert_eq!(text(&session, 0, RowField::Comparison(1)), "30.00");
        assert_eq!(
            session.set_row_field(RowField::Comparison(2), "1"),
            Err(EditError::NoSuchColumn(2))
        );
        assert_eq!(
            EditError::NoSuchColumn(2).to_string(),
            "There is no comparison in column 3."
        );
    }

    #[test]
    fn selecting_missing_rows_is_ignored() {
        let mut session = session(&["A", "B"]);
        session.focus(1);
        let before = Arc::clone(session.snapshot());
        session.focus(7);
        session.toggle_additional(2);
        session.select_only(9);
        session.unselect(5);
        assert!(Arc::ptr_eq(&before, session.snapshot()));
        assert_eq!(session.active_index(), Some(1));
        assert_eq!(session.selection().indices(), vec![1]);
    }

    #[test]
    fn import_comparison_uses_other_run() {
        let mut other = Run::with_segments(["A", "B"]);
        other.segments[1].personal_best_split_time.real_time = Some(TimeSpan::from_millis(9000));
        let mut session = session(&["A", "B"]);
        session.import_comparison(&other, "Friend").unwrap();
        assert_eq!(session.snapshot().segments[1].comparison_times, ["9.00"]);
        assert_eq!(
            session.import_comparison(&other, "Friend"),
            Err(EditError::added())
        );
    }

    #[test]
    fn icons_resolve_from_cache() {
        let mut session = session(&["A", "B"]);
        assert_eq!(session.game_icon(), "");
        session.set_game_icon(&test_png(1)).unwrap();
        assert!(session.game_icon().starts_with("data:image/png;base64,"));
        session.set_game_name("Refresh");
        assert!(session.game_icon().starts_with("data:image/png;base64,"));

        session.set_segment_icon(&test_png(2)).unwrap();
        assert!(!session.segment_icon(0).is_empty());
        assert_eq!(session.segment_icon(1), "");
        assert_eq!(session.set_segment_icon(b"junk"), Err(EditError::Resource));
        assert!(!session.segment_icon(0).is_empty());

        session.remove_segment_icon().unwrap();
        assert_eq!(session.segment_icon(0), "");
        session.remove_game_icon();
        assert_eq!(session.game_icon(), "");
    }

    #[test]
    fn cleanup_decline_all_leaves_run_identical() {
        let run = dirty_run();
        let mut session = EditSession::new(RunEditor::new(run.clone()).unwrap());
        let report = session.clean_sum_of_best(|_| CleanUpDecision::Decline);
        assert_eq!(report.proposed, 2);
        assert_eq!(session.close(true), Some(run));
    }

    #[test]
    fn cleanup_accept_all_then_nothing_left() {
        let mut session = EditSession::new(RunEditor::new(dirty_run()).unwrap());
        assert_eq!(session.clean_sum_of_best(|_| CleanUpDecision::Accept).applied, 2);
        assert_eq!(session.clean_sum_of_best(|_| CleanUpDecision::Accept).proposed, 0);
    }

    #[test]
    fn timing_method_switch_shows_other_times() {
        let mut session = session(&["A"]);
        session.set_split_time("10").unwrap();
        session.select_timing_method(TimingMethod::GameTime);
        assert_eq!(session.snapshot().segments[0].split_time, "");
        session.set_split_time("8").unwrap();
        session.select_timing_method(TimingMethod::RealTime);
        assert_eq!(session.snapshot().segments[0].split_time, "10.00");
    }

    #[test]
    fn clear_times_keeps_segments_and_comparisons() {
        let mut session = session(&["A", "B"]);
        session.add_comparison("Friend").unwrap();
        session.set_split_time("10").unwrap();
        session.clear_times();
        let state = session.snapshot();
        assert_eq!(state.segments.len(), 2);
        assert_eq!(state.segments[0].split_time, "");
        assert_eq!(state.comparison_names, ["Friend"]);
    }

    #[test]
    fn discard_returns_nothing() {
        let mut session = session(&["A"]);
        session.set_game_name("Changed");
        assert_eq!(session.close(false), None);
    }

    #[test]
    fn no_active_row_refuses_row_edits() {
        let mut session = session(&["A", "B"]);
        session.unselect(0);
        assert_eq!(session.active_index(), None);
        assert_eq!(session.set_split_time("1"), Err(EditError::NoActiveSegment));
        assert_eq!(session.set_segment_name("X"), Err(EditError::NoActiveSegment));
        assert_eq!(session.insert_above(), Err(EditError::NoActiveSegment));
    }
}

// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! In-memory run editor implementing the `RunEditing` capability.
//!
//! `RunEditor` owns a `Run` for the duration of an editing session. It keeps
//! the selection the session pushes into it, the timing method time fields
//! are edited in, and which icons it has already reported, so each
//! `EditorState` only carries an icon URL when that slot actually changed.

use std::collections::BTreeSet;

use super::icon::{Icon, IconId};
use super::run::{Run, RunError, Segment};
use super::sum_of_best::HistoryCleaner;
use super::time::{TimeSpan, TimingMethod, format_optional};
use crate::editing::capability::{
    Buttons, EditorState, FieldKind, IconSlot, MoveDirection, RunEditing, SegmentState,
    SelectionState, SumOfBestCleaner,
};
use crate::settings;

/// Editing state wrapped around an owned run
#[derive(Debug, Clone)]
pub struct RunEditor {
    run: Run,
    timing_method: TimingMethod,
    selected: BTreeSet<usize>,
    active: Option<usize>,
    /// Game icon reported by the previous `state()`
    reported_game_icon: Option<IconId>,
    /// Segment icons reported by previous `state()` calls, by row.
    /// Never shrinks, so a row that is reused after a removal still gets
    /// its stale icon cleared.
    reported_segment_icons: Vec<Option<IconId>>,
}

impl RunEditor {
    /// Start editing a run. The first segment begins active.
    pub fn new(run: Run) -> Result<Self, RunError> {
        run.validate()?;
        Ok(Self {
            run,
            timing_method: settings::editor::DEFAULT_TIMING_METHOD,
            selected: BTreeSet::from([0]),
            active: Some(0),
            reported_game_icon: None,
            reported_segment_icons: Vec::new(),
        })
    }

    pub fn run(&self) -> &Run {
        &self.run
    }

    pub fn timing_method(&self) -> TimingMethod {
        self.timing_method
    }

    fn buttons(&self) -> Buttons {
        let len = self.run.len();
        let any = !self.selected.is_empty();
        Buttons {
            can_remove: any && self.selected.len() < len,
            can_move_up: any && !self.selected.contains(&0),
            can_move_down: any && !self.selected.contains(&(len - 1)),
        }
    }

    fn select_single(&mut self, index: usize) {
        self.selected = BTreeSet::from([index]);
        self.active = Some(index);
    }

    fn selection_state(&self, index: usize) -> SelectionState {
        if self.active == Some(index) {
            SelectionState::Active
        } else if self.selected.contains(&index) {
            SelectionState::Selected
        } else {
            SelectionState::NotSelected
        }
    }

    fn segment_state(&self, index: usize) -> SegmentState {
        let method = self.timing_method;
        let segment = &self.run.segments[index];
        SegmentState {
            icon_change: None,
            name: segment.name.clone(),
            split_time: format_optional(segment.personal_best_split_time[method]),
            segment_time: format_optional(self.run.segment_time(index, method)),
            best_segment_time: format_optional(segment.best_segment_time[method]),
            comparison_times: segment
                .comparisons
                .iter()
                .map(|time| format_optional(time[method]))
                .collect(),
            selected: self.selection_state(index),
        }
    }

    // ------------------------------------------------------------------
    // Time edits
    // ------------------------------------------------------------------

    fn set_split_time(&mut self, index: usize, value: Option<TimeSpan>) {
        let method = self.timing_method;
        self.run.segments[index]
            .personal_best_split_time
            .set(method, value);
        self.fix_best_segments(index);
    }

    /// Set a segment time by moving this split; later splits shift along
    fn set_segment_time(&mut self, index: usize, value: Option<TimeSpan>) {
        let method = self.timing_method;
        let Some(segment_time) = value else {
            self.set_split_time(index, None);
            return;
        };

        let previous = self
            .run
            .previous_split_time(index, method)
            .unwrap_or_default();
        let new_split = previous + segment_time;
        let old_split = self.run.split_time(index, method);
        self.run.segments[index]
            .personal_best_split_time
            .set(method, Some(new_split));

        if let Some(old_split) = old_split {
            let delta = new_split - old_split;
            for segment in &mut self.run.segments[index + 1..] {
                if let Some(split) = segment.personal_best_split_time[method] {
                    segment
                        .personal_best_split_time
                        .set(method, Some(split + delta));
                }
            }
        }
        self.fix_best_segments(index);
    }

    /// A personal best segment can never be slower than the best segment
    fn fix_best_segments(&mut self, index: usize) {
        let method = self.timing_method;
        for i in [index, index + 1] {
            let Some(segment_time) = self.run.segment_time(i, method) else {
                continue;
            };
            if segment_time.is_negative() {
                continue;
            }
            let best = &mut self.run.segments[i].best_segment_time;
            if best[method].is_none_or(|b| segment_time < b) {
                tracing::debug!("Best segment {} lowered to {}", i, segment_time);
                best.set(method, Some(segment_time));
            }
        }
    }

    // ------------------------------------------------------------------
    // Structural edits
    // ------------------------------------------------------------------

    /// Swap segment `first` with the one below it, keeping every
    /// cumulative series consistent
    fn swap_with_next(&mut self, first: usize) {
        let comparison_count = self.run.comparisons.len();
        for method in TimingMethod::ALL {
            let previous = self.run.previous_split_time(first, method);
            let second = self.run.segments[first + 1].personal_best_split_time[method];
            let split = &mut self.run.segments[first].personal_best_split_time;
            let current = split[method];
            split.set(method, swapped_split(previous, current, second));

            for k in 0..comparison_count {
                let previous = match first.checked_sub(1) {
                    Some(p) => self.run.segments[p].comparisons[k][method],
                    None => Some(TimeSpan::zero()),
                };
                let second = self.run.segments[first + 1].comparisons[k][method];
                let time = &mut self.run.segments[first].comparisons[k];
                let current = time[method];
                time.set(method, swapped_split(previous, current, second));
            }
        }

        let (head, tail) = self.run.segments.split_at_mut(first + 1);
        let (a, b): (&mut Segment, &mut Segment) = (&mut head[first], &mut tail[0]);
        std::mem::swap(&mut a.name, &mut b.name);
        std::mem::swap(&mut a.icon, &mut b.icon);
        std::mem::swap(&mut a.best_segment_time, &mut b.best_segment_time);
        std::mem::swap(&mut a.segment_history, &mut b.segment_history);
    }

    fn active_segment_mut(&mut self) -> Option<&mut Segment> {
        let index = self.active?;
        self.run.segments.get_mut(index)
    }
}

/// New cumulative time at the upper row after two rows trade places
fn swapped_split(
    previous: Option<TimeSpan>,
    first: Option<TimeSpan>,
    second: Option<TimeSpan>,
) -> Option<TimeSpan> {
    match (previous, first, second) {
        (Some(p), Some(a), Some(b)) => Some(p + (b - a)),
        _ => None,
    }
}

impl RunEditing for RunEditor {
    fn set_game_name(&mut self, name: &str) {
        self.run.game_name = name.to_string();
    }

    fn set_category_name(&mut self, name: &str) {
        self.run.category_name = name.to_string();
    }

    fn parse_and_set_offset(&mut self, text: &str) -> bool {
        match TimeSpan::parse_optional(text) {
            Ok(offset) => {
                self.run.offset = offset.unwrap_or_default();
                true
            }
            Err(e) => {
                tracing::debug!("Rejected offset {:?}: {}", text, e);
                false
            }
        }
    }

    fn parse_and_set_attempt_count(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            self.run.attempt_count = 0;
            return true;
        }
        if !text.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        match text.parse() {
            Ok(count) => {
                self.run.attempt_count = count;
                true
            }
            Err(_) => false,
        }
    }

    fn select_timing_method(&mut self, method: TimingMethod) {
        self.timing_method = method;
    }

    fn insert_segment(&mut self, index: usize) {
        let index = index.min(self.run.len());
        let segment = Segment::new(
            settings::editor::NEW_SEGMENT_NAME,
            self.run.comparisons.len(),
        );
        self.run.segments.insert(index, segment);
        self.select_single(index);
    }

    fn remove_selected_segments(&mut self) -> bool {
        if !self.buttons().can_remove {
            return false;
        }
        let Some(&first) = self.selected.iter().next() else {
            return false;
        };
        for &index in self.selected.iter().rev() {
            self.run.segments.remove(index);
        }
        self.select_single(first.min(self.run.len() - 1));
        true
    }

    fn move_selected(&mut self, direction: MoveDirection) -> bool {
        let buttons = self.buttons();
        let selected: Vec<usize> = self.selected.iter().copied().collect();
        let moved: BTreeSet<usize> = match direction {
            MoveDirection::Up => {
                if !buttons.can_move_up {
                    return false;
                }
                for &index in &selected {
                    self.swap_with_next(index - 1);
                }
                selected.iter().map(|i| i - 1).collect()
            }
            MoveDirection::Down => {
                if !buttons.can_move_down {
                    return false;
                }
                for &index in selected.iter().rev() {
                    self.swap_with_next(index);
                }
                selected.iter().map(|i| i + 1).collect()
            }
        };
        self.active = self.active.map(|a| match direction {
            MoveDirection::Up => a - 1,
            MoveDirection::Down => a + 1,
        });
        self.selected = moved;
        true
    }

    fn set_selection(&mut self, indices: &[usize], active: Option<usize>) {
        let len = self.run.len();
        self.selected = indices.iter().copied().filter(|&i| i < len).collect();
        self.active = active.filter(|&i| i < len);
        if let Some(active) = self.active {
            self.selected.insert(active);
        }
    }

    fn add_comparison(&mut self, name: &str) -> bool {
        match self.run.add_comparison(name) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("Comparison not added: {}", e);
                false
            }
        }
    }

    fn rename_comparison(&mut self, old: &str, new: &str) -> bool {
        match self.run.rename_comparison(old, new) {
            Ok(renamed) => renamed,
            Err(e) => {
                tracing::debug!("Comparison not renamed: {}", e);
                false
            }
        }
    }

    fn remove_comparison(&mut self, name: &str) {
        self.run.remove_comparison(name);
    }

    fn import_comparison(&mut self, other: &Run, name: &str) -> bool {
        let Some(other_last) = other.segments.last() else {
            return false;
        };
        let index = match self.run.add_comparison(name) {
            Ok(index) => index,
            Err(e) => {
                tracing::debug!("Comparison not imported: {}", e);
                return false;
            }
        };

        // Match segments by name in order; the final split always lines up
        // with the other run's final time.
        let last = self.run.len() - 1;
        let mut cursor = 0;
        for (i, segment) in self.run.segments.iter_mut().enumerate() {
            let source = if i == last {
                Some(other_last)
            } else {
                other.segments[cursor..]
                    .iter()
                    .position(|s| s.name == segment.name)
                    .map(|offset| {
                        cursor += offset + 1;
                        &other.segments[cursor - 1]
                    })
            };
            if let Some(source) = source {
                segment.comparisons[index] = source.personal_best_split_time;
            }
        }
        true
    }

    fn set_active_name(&mut self, name: &str) -> bool {
        match self.active_segment_mut() {
            Some(segment) => {
                segment.name = name.to_string();
                true
            }
            None => false,
        }
    }

    fn parse_and_set_active_field(&mut self, field: &FieldKind, text: &str) -> bool {
        let Some(index) = self.active else {
            return false;
        };
        let value = match TimeSpan::parse_optional(text) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Rejected {:?} text {:?}: {}", field, text, e);
                return false;
            }
        };
        if value.is_some_and(TimeSpan::is_negative) {
            return false;
        }

        let method = self.timing_method;
        match field {
            FieldKind::SplitTime => self.set_split_time(index, value),
            FieldKind::SegmentTime => self.set_segment_time(index, value),
            FieldKind::BestSegmentTime => {
                self.run.segments[index].best_segment_time.set(method, value);
            }
            FieldKind::ComparisonTime(name) => {
                let Some(k) = self.run.comparison_index(name) else {
                    return false;
                };
                self.run.segments[index].comparisons[k].set(method, value);
            }
        }
        true
    }

    fn set_icon(&mut self, slot: IconSlot, bytes: &[u8]) -> bool {
        let icon = match Icon::from_bytes(bytes) {
            Ok(icon) => icon,
            Err(e) => {
                tracing::warn!("Ignoring icon: {}", e);
                return false;
            }
        };
        match slot {
            IconSlot::Game => self.run.game_icon = Some(icon),
            IconSlot::ActiveSegment => match self.active_segment_mut() {
                Some(segment) => segment.icon = Some(icon),
                None => return false,
            },
        }
        true
    }

    fn remove_icon(&mut self, slot: IconSlot) {
        match slot {
            IconSlot::Game => self.run.game_icon = None,
            IconSlot::ActiveSegment => {
                if let Some(segment) = self.active_segment_mut() {
                    segment.icon = None;
                }
            }
        }
    }

    fn clear_history(&mut self) {
        self.run.clear_history();
    }

    fn clear_times(&mut self) {
        self.run.clear_times();
    }

    fn clean_sum_of_best(&mut self) -> Box<dyn SumOfBestCleaner + '_> {
        Box::new(HistoryCleaner::new(&mut self.run))
    }

    fn state(&mut self) -> EditorState {
        let game_icon = self.run.game_icon.as_ref().map(Icon::id);
        let icon_change = (game_icon != self.reported_game_icon).then(|| {
            self.reported_game_icon = game_icon;
            self.run.game_icon.as_ref().map(Icon::url).unwrap_or_default()
        });

        let mut segments = Vec::with_capacity(self.run.len());
        for index in 0..self.run.len() {
            let mut state = self.segment_state(index);
            let icon = self.run.segments[index].icon.as_ref();
            let current = icon.map(Icon::id);
            if self.reported_segment_icons.len() <= index {
                self.reported_segment_icons.resize(index + 1, None);
            }
            if self.reported_segment_icons[index] != current {
                self.reported_segment_icons[index] = current;
                state.icon_change = Some(icon.map(Icon::url).unwrap_or_default());
            }
            segments.push(state);
        }

        EditorState {
            icon_change,
            game: self.run.game_name.clone(),
            category: self.run.category_name.clone(),
            offset: self.run.offset.to_string(),
            attempts: self.run.attempt_count.to_string(),
            timing_method: self.timing_method,
            segments,
            comparison_names: self.run.comparisons.clone(),
            buttons: self.buttons(),
        }
    }

    fn into_run(self) -> Run {
        self.run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::icon::test_png;

    fn secs(s: i64) -> Option<TimeSpan> {
        Some(TimeSpan::from_millis(s * 1000))
    }

    fn editor(names: &[&str]) -> RunEditor {
        RunEditor::new(Run::with_segments(names.iter().copied())).unwrap()
    }

    #[test]
    fn starts_with_first_segment_active() {
        let mut editor = editor(&["A", "B"]);
        let state = editor.state();
        assert_eq!(state.active_index(), Some(0));
        assert!(state.buttons.can_remove);
        assert!(!state.buttons.can_move_up);
        assert!(state.buttons.can_move_down);
    }

    #[test]
    fn state_serializes_as_json() {
        let mut editor = editor(&["A", "B"]);
        assert!(editor.set_icon(IconSlot::Game, &test_png(5)));
        let state = editor.state();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["segments"][1]["name"], "B");
        assert_eq!(json["segments"][0]["selected"], "Active");
        assert_eq!(json["buttons"]["can_move_down"], true);
        assert!(json["icon_change"].as_str().unwrap().starts_with("data:image/png"));
        let back: EditorState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn split_time_edit_updates_best_segment() {
        let mut editor = editor(&["Start", "End"]);
        assert!(editor.parse_and_set_active_field(&FieldKind::SplitTime, "1:23.45"));
        let state = editor.state();
        assert_eq!(state.segments[0].split_time, "1:23.45");
        assert_eq!(state.segments[0].best_segment_time, "1:23.45");
        assert_eq!(
            editor.run().split_time(0, TimingMethod::RealTime),
            Some(TimeSpan::from_millis(83_450))
        );
    }

    #[test]
    fn negative_and_garbage_times_are_rejected() {
        let mut editor = editor(&["A"]);
        assert!(!editor.parse_and_set_active_field(&FieldKind::SplitTime, "-1"));
        assert!(!editor.parse_and_set_active_field(&FieldKind::SplitTime, "abc"));
        assert_eq!(editor.run().split_time(0, TimingMethod::RealTime), None);
    }

    #[test]
    fn segment_time_shifts_later_splits() {
        let mut editor = editor(&["A", "B", "C"]);
        for (i, t) in [(0, "10"), (1, "20"), (2, "30")] {
            editor.set_selection(&[i], Some(i));
            assert!(editor.parse_and_set_active_field(&FieldKind::SplitTime, t));
        }
        editor.set_selection(&[1], Some(1));
        assert!(editor.parse_and_set_active_field(&FieldKind::SegmentTime, "15"));
        let run = editor.run();
        assert_eq!(run.split_time(1, TimingMethod::RealTime), secs(25));
        assert_eq!(run.split_time(2, TimingMethod::RealTime), secs(35));
    }

    #[test]
    fn game_time_edits_leave_real_time_alone() {
        let mut editor = editor(&["A"]);
        editor.select_timing_method(TimingMethod::GameTime);
        assert!(editor.parse_and_set_active_field(&FieldKind::BestSegmentTime, "4.5"));
        let best = editor.run().segments[0].best_segment_time;
        assert_eq!(best.game_time, Some(TimeSpan::from_millis(4_500)));
        assert_eq!(best.real_time, None);
    }

    #[test]
    fn insert_selects_new_segment() {
        let mut editor = editor(&["A", "B"]);
        editor.add_comparison("PB");
        editor.insert_segment(1);
        let state = editor.state();
        assert_eq!(state.segments.len(), 3);
        assert_eq!(state.active_index(), Some(1));
        assert_eq!(state.segments[1].comparison_times.len(), 1);
        assert!(editor.run().validate().is_ok());
    }

    #[test]
    fn cannot_remove_every_segment() {
        let mut editor = editor(&["A", "B"]);
        editor.set_selection(&[0, 1], Some(0));
        assert!(!editor.remove_selected_segments());
        editor.set_selection(&[1], Some(1));
        assert!(editor.remove_selected_segments());
        assert_eq!(editor.run().len(), 1);
        assert_eq!(editor.state().active_index(), Some(0));
    }

    #[test]
    fn move_keeps_segment_times() {
        let mut editor = editor(&["A", "B", "C"]);
        for (i, t) in [(0, "10"), (1, "30"), (2, "35")] {
            editor.set_selection(&[i], Some(i));
            editor.parse_and_set_active_field(&FieldKind::SplitTime, t);
        }
        editor.set_selection(&[1], Some(1));
        assert!(editor.move_selected(MoveDirection::Up));
        let run = editor.run();
        assert_eq!(run.segments[0].name, "B");
        assert_eq!(run.segment_time(0, TimingMethod::RealTime), secs(20));
        assert_eq!(run.segment_time(1, TimingMethod::RealTime), secs(10));
        assert_eq!(run.split_time(2, TimingMethod::RealTime), secs(35));
        assert_eq!(editor.state().active_index(), Some(0));
        assert!(!editor.move_selected(MoveDirection::Up));
    }

    #[test]
    fn import_matches_segments_by_name() {
        let mut other = Run::with_segments(["A", "X", "B", "End"]);
        for (i, s) in [(0, 5), (1, 7), (2, 9), (3, 12)] {
            other.segments[i].personal_best_split_time.real_time = secs(s);
        }
        let mut editor = editor(&["A", "B", "C"]);
        assert!(editor.import_comparison(&other, "Friend"));
        let run = editor.run();
        assert_eq!(run.segments[0].comparisons[0].real_time, secs(5));
        assert_eq!(run.segments[1].comparisons[0].real_time, secs(9));
        assert_eq!(run.segments[2].comparisons[0].real_time, secs(12));
        assert!(!editor.import_comparison(&other, "Friend"));
    }

    #[test]
    fn icon_changes_are_reported_once() {
        let mut editor = editor(&["A", "B"]);
        let first = editor.state();
        assert_eq!(first.icon_change, None);
        assert_eq!(first.segments[0].icon_change, None);

        assert!(editor.set_icon(IconSlot::ActiveSegment, &test_png(5)));
        let state = editor.state();
        let url = state.segments[0].icon_change.clone().unwrap();
        assert!(url.starts_with("data:image/png"));
        assert_eq!(editor.state().segments[0].icon_change, None);

        editor.remove_icon(IconSlot::ActiveSegment);
        assert_eq!(editor.state().segments[0].icon_change, Some(String::new()));
    }

    #[test]
    fn bad_icon_bytes_change_nothing() {
        let mut editor = editor(&["A"]);
        editor.state();
        assert!(!editor.set_icon(IconSlot::Game, b"nope"));
        assert_eq!(editor.state().icon_change, None);
        assert!(editor.run().game_icon.is_none());
    }

    #[test]
    fn attempt_count_grammar() {
        let mut editor = editor(&["A"]);
        assert!(editor.parse_and_set_attempt_count("42"));
        assert_eq!(editor.run().attempt_count, 42);
        assert!(!editor.parse_and_set_attempt_count("-1"));
        assert!(!editor.parse_and_set_attempt_count("4x"));
        assert_eq!(editor.run().attempt_count, 42);
        assert!(editor.parse_and_set_attempt_count(""));
        assert_eq!(editor.run().attempt_count, 0);
    }
}

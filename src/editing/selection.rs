// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Segment selection: a multi-select set with at most one active row.
//!
//! `Selection` wraps an `Arc<BTreeSet<usize>>` so snapshots can hold a copy
//! cheaply. Mutations produce a new set (copy-on-write via `Arc::make_mut`).
//! The `BTreeSet` gives ascending iteration order, which is the order the
//! run expects when moving or removing several segments at once.
//!
//! Invariant: the active row, when present, is always in the set.

use crate::editing::capability::{EditorState, SelectionState};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Selected segment rows plus the focused (active) one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    inner: Arc<BTreeSet<usize>>,
    active: Option<usize>,
}

impl Selection {
    /// Create a new empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the selection from the tags of a projection
    pub fn from_state(state: &EditorState) -> Self {
        Self {
            inner: Arc::new(state.selected_indices().collect()),
            active: state.active_index(),
        }
    }

    /// Check if the selection is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get the number of selected rows
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if a row is selected
    pub fn contains(&self, index: usize) -> bool {
        self.inner.contains(&index)
    }

    /// Iterate over selected rows in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.inner.iter().copied()
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn state(&self, index: usize) -> SelectionState {
        if self.active == Some(index) {
            SelectionState::Active
        } else if self.contains(index) {
            SelectionState::Selected
        } else {
            SelectionState::NotSelected
        }
    }

    /// Select only `index` and make it active
    pub fn focus(&mut self, index: usize) {
        self.inner = Arc::new(BTreeSet::from([index]));
        self.active = Some(index);
    }

    /// Same as `focus`; used before single-row actions
    pub fn select_only(&mut self, index: usize) {
        self.focus(index);
    }

    /// Add a row without touching the others. It only becomes active when
    /// nothing else is.
    pub fn select_additional(&mut self, index: usize) {
        Arc::make_mut(&mut self.inner).insert(index);
        if self.active.is_none() {
            self.active = Some(index);
        }
    }

    /// Remove a row. Unselecting the active row leaves no active row.
    pub fn unselect(&mut self, index: usize) {
        Arc::make_mut(&mut self.inner).remove(&index);
        if self.active == Some(index) {
            self.active = None;
        }
    }

    /// Click on a row with multi-select semantics
    pub fn toggle_additional(&mut self, index: usize) {
        if self.contains(index) {
            self.unselect(index);
        } else {
            self.select_additional(index);
        }
    }

    pub fn indices(&self) -> Vec<usize> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invariant(sel: &Selection) {
        if let Some(active) = sel.active() {
            assert!(sel.contains(active));
        }
    }

    #[test]
    fn new_selection_is_empty() {
        let sel = Selection::new();
        assert!(sel.is_empty());
        assert_eq!(sel.len(), 0);
        assert_eq!(sel.active(), None);
    }

    #[test]
    fn focus_replaces_everything() {
        let mut sel = Selection::new();
        sel.focus(1);
        sel.select_additional(3);
        sel.focus(2);
        assert_eq!(sel.indices(), vec![2]);
        assert_eq!(sel.active(), Some(2));
        assert_eq!(sel.state(2), SelectionState::Active);
        assert_eq!(sel.state(1), SelectionState::NotSelected);
    }

    #[test]
    fn additional_keeps_existing_active() {
        let mut sel = Selection::new();
        sel.focus(0);
        sel.select_additional(4);
        assert_eq!(sel.active(), Some(0));
        assert_eq!(sel.state(4), SelectionState::Selected);
        assert_invariant(&sel);
    }

    #[test]
    fn additional_becomes_active_when_none_is() {
        let mut sel = Selection::new();
        sel.select_additional(2);
        assert_eq!(sel.active(), Some(2));
    }

    #[test]
    fn unselecting_active_leaves_no_active() {
        let mut sel = Selection::new();
        sel.focus(0);
        sel.select_additional(1);
        sel.unselect(0);
        assert_eq!(sel.active(), None);
        assert_eq!(sel.indices(), vec![1]);
        assert_invariant(&sel);
    }

    #[test]
    fn toggle_twice_restores_set() {
        let mut sel = Selection::new();
        sel.focus(0);
        sel.select_additional(2);
        let before = sel.indices();

        for i in 0..4 {
            sel.toggle_additional(i);
            sel.toggle_additional(i);
            assert_eq!(sel.indices(), before);
            assert_invariant(&sel);
        }
    }

    #[test]
    fn clone_is_independent() {
        let mut sel = Selection::new();
        sel.focus(1);
        let mut clone = sel.clone();
        clone.select_additional(5);
        assert!(!sel.contains(5));
        assert!(clone.contains(5));
    }
}

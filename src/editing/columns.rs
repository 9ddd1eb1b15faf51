// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Comparison column set.
//!
//! Mirrors the run's comparison names after every commit. The run decides
//! the order; this side only forwards requests and reports the coarse name
//! conflict error when the run refuses one.

use super::capability::{EditorState, RunEditing};
use super::error::EditError;
use crate::model::Run;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonColumns {
    names: Vec<String>,
}

impl ComparisonColumns {
    pub fn from_state(state: &EditorState) -> Self {
        Self {
            names: state.comparison_names.clone(),
        }
    }

    /// Take the names of a fresh projection
    pub fn sync(&mut self, state: &EditorState) {
        if self.names != state.comparison_names {
            self.names.clone_from(&state.comparison_names);
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn add(&self, editor: &mut impl RunEditing, name: &str) -> Result<(), EditError> {
        if editor.add_comparison(name) {
            tracing::debug!("Added comparison {:?}", name);
            Ok(())
        } else {
            tracing::warn!("Comparison {:?} was refused", name);
            Err(EditError::added())
        }
    }

    pub fn rename(
        &self,
        editor: &mut impl RunEditing,
        old: &str,
        new: &str,
    ) -> Result<(), EditError> {
        if self.position(old).is_none() {
            return Err(EditError::UnknownComparison(old.to_string()));
        }
        if editor.rename_comparison(old, new) {
            tracing::debug!("Renamed comparison {:?} to {:?}", old, new);
            Ok(())
        } else {
            tracing::warn!("Comparison {:?} could not be renamed to {:?}", old, new);
            Err(EditError::renamed())
        }
    }

    /// Remove a column, returning the position it had
    pub fn remove(&self, editor: &mut impl RunEditing, name: &str) -> Result<usize, EditError> {
        let position = self
            .position(name)
            .ok_or_else(|| EditError::UnknownComparison(name.to_string()))?;
        editor.remove_comparison(name);
        tracing::debug!("Removed comparison {:?}", name);
        Ok(position)
    }

    pub fn import_from(
        &self,
        editor: &mut impl RunEditing,
        other: &Run,
        name: &str,
    ) -> Result<(), EditError> {
        if editor.import_comparison(other, name) {
            tracing::debug!("Imported comparison {:?}", name);
            Ok(())
        } else {
            tracing::warn!("Comparison {:?} could not be imported", name);
            Err(EditError::added())
        }
    }
}

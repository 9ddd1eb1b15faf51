// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Errors an editing session reports to its caller.
//!
//! None of these are fatal: a failed operation leaves the committed run and
//! the snapshot exactly as they were.

use crate::model::RunError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// Text didn't match the field grammar or the run refused the value
    #[error("`{text}` is not a valid {field}")]
    Parse { field: &'static str, text: String },

    /// The run refused a comparison name. It doesn't say whether the name
    /// was taken or reserved, so neither do we.
    #[error("The comparison could not be {verb}. It may be a duplicate or a reserved name.")]
    NameConflict { verb: &'static str },

    /// Remove or move requested while the matching button is disabled
    #[error("This segment operation isn't available for the current selection.")]
    IllegalStructuralOp,

    /// Icon bytes couldn't be decoded
    #[error("The icon could not be read as an image.")]
    Resource,

    #[error("No segment is active.")]
    NoActiveSegment,

    #[error("There is no comparison named `{0}`.")]
    UnknownComparison(String),

    /// Comparison column position past the last column
    #[error("There is no comparison in column {}.", .0 + 1)]
    NoSuchColumn(usize),

    #[error("You can't edit your run while the timer is running.")]
    TimerRunning,

    #[error("Couldn't parse the splits.")]
    ImportParse,

    /// The run handed to the editor breaks a run invariant
    #[error(transparent)]
    InvalidRun(#[from] RunError),
}

impl EditError {
    pub(crate) fn added() -> Self {
        EditError::NameConflict { verb: "added" }
    }

    pub(crate) fn renamed() -> Self {
        EditError::NameConflict { verb: "renamed" }
    }
}

// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Editing model and interaction

pub mod capability;
pub mod cleanup;
pub mod columns;
pub mod error;
pub mod field;
pub mod icon_cache;
pub mod selection;
pub mod session;

pub use capability::{
    Buttons, EditorState, FieldKind, IconSlot, MoveDirection, PotentialCleanUp, RunEditing,
    SegmentState, SelectionState, SumOfBestCleaner,
};
pub use cleanup::{CleanUpDecision, CleanupReport};
pub use error::EditError;
pub use field::RowField;
pub use selection::Selection;
pub use session::{EditSession, FieldView};

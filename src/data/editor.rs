// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Run editor session management for AppState

use super::{AppState, TimerPhase};
use crate::editing::{EditError, EditSession, RunEditing};
use crate::model::RunEditor;

impl AppState {
    /// Open an editing session on a copy of the live run.
    ///
    /// Refused while the timer is running. Opening while a session is
    /// already open keeps the existing one.
    pub fn open_run_editor(&mut self) -> Result<(), EditError> {
        if self.timer_phase != TimerPhase::NotRunning {
            let error = EditError::TimerRunning;
            tracing::warn!("{}", error);
            self.error_message = Some(error.to_string());
            return Err(error);
        }
        if self.run_editor.is_some() {
            return Ok(());
        }

        let mut editor = RunEditor::new(self.run.clone())?;
        editor.select_timing_method(self.config.timing_method);
        self.run_editor = Some(EditSession::new(editor));
        self.error_message = None;
        Ok(())
    }

    /// Close the editing session. Saving replaces the live run with the
    /// edited copy; discarding drops the copy.
    ///
    /// Returns whether a session was open.
    pub fn close_run_editor(&mut self, save: bool) -> bool {
        let Some(session) = self.run_editor.take() else {
            return false;
        };
        if let Some(run) = session.close(save) {
            self.run = run;
        }
        true
    }
}

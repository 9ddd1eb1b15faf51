// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Central application state (`AppState`).
//!
//! `AppState` owns the live run, the timer phase and, while the user edits,
//! the run editing session working on a copy of the run. Sub-modules split
//! the methods by domain: file I/O, editor lifecycle, and prompt-driven
//! dialogs.

mod dialogs;
mod editor;
mod file_io;

pub use dialogs::{PickedFile, Prompter};

use crate::editing::EditSession;
use crate::model::{Run, RunEditor};
use crate::settings::Config;
use std::path::PathBuf;

/// Where the timer currently is. Editing is only possible before a run
/// starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimerPhase {
    #[default]
    NotRunning,
    Running,
    Paused,
    Ended,
}

/// Main application state
pub struct AppState {
    /// The live run the timer works with
    pub run: Run,

    pub timer_phase: TimerPhase,

    /// Open editing session, working on a copy of `run`
    pub run_editor: Option<EditSession<RunEditor>>,

    /// File the run was loaded from, if any
    pub run_path: Option<PathBuf>,

    /// Runtime options
    pub config: Config,

    /// Error message to display, if any
    pub error_message: Option<String>,

    /// When the run was last saved (formatted time string for display)
    pub last_saved: Option<String>,
}

impl AppState {
    /// Create a new application state with a fresh run
    pub fn new(config: Config) -> Self {
        Self {
            run: Run::new(),
            timer_phase: TimerPhase::NotRunning,
            run_editor: None,
            run_path: None,
            config,
            error_message: None,
            last_saved: None,
        }
    }

    /// Whether a run editing session is open
    pub fn is_editing(&self) -> bool {
        self.run_editor.is_some()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

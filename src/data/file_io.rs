// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! File I/O operations for AppState (load, save, import parsing)

use super::AppState;
use crate::editing::EditError;
use crate::model::Run;
use crate::settings;
use anyhow::{Context, Result};
use chrono::Local;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Path of the backup copy written before `path` is overwritten
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(settings::files::BACKUP_SUFFIX);
    path.with_file_name(name)
}

/// Parse run file bytes picked for a comparison import
pub fn parse_import(bytes: &[u8]) -> Result<Run, EditError> {
    Run::from_json(bytes).map_err(|e| {
        tracing::debug!("Import failed: {:#}", e);
        EditError::ImportParse
    })
}

impl AppState {
    /// Load a run from a path
    pub fn load_run(&mut self, path: PathBuf) {
        match Run::load(&path) {
            Ok(run) => {
                tracing::info!(
                    "Loaded run: {} - {} ({} segments)",
                    run.game_name,
                    run.category_name,
                    run.len()
                );
                self.run = run;
                self.run_path = Some(path);
                self.error_message = None;
            }
            Err(e) => {
                let error = format!("Failed to load run: {:#}", e);
                tracing::error!("{}", error);
                self.error_message = Some(error);
            }
        }
    }

    /// Save the live run to the file it came from
    pub fn save_run(&mut self) {
        let Some(path) = self.run_path.clone() else {
            self.error_message = Some("No run file to save to".to_string());
            return;
        };

        match self.write_run(&path) {
            Ok(()) => {
                tracing::info!("Saved: {}", path.display());
                self.error_message = None;
                self.last_saved = Some(Local::now().format("%I:%M %p").to_string());
            }
            Err(e) => {
                let error = format!("Failed to save: {:#}", e);
                tracing::error!("{}", error);
                self.error_message = Some(error);
            }
        }
    }

    fn write_run(&self, path: &Path) -> Result<()> {
        if self.config.backup_on_save && path.exists() {
            let backup = backup_path(path);
            std::fs::copy(path, &backup)
                .with_context(|| format!("Failed to back up to {}", backup.display()))?;
            tracing::debug!("Backed up run to {}", backup.display());
        }
        self.run.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("splitbench-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn backup_path_appends_suffix() {
        assert_eq!(
            backup_path(Path::new("/runs/any%.json")),
            PathBuf::from("/runs/any%.json.bak")
        );
    }

    #[test]
    fn import_rejects_garbage() {
        assert_eq!(parse_import(b"not json").unwrap_err(), EditError::ImportParse);
        assert_eq!(
            parse_import(br#"{"segments": []}"#).unwrap_err(),
            EditError::ImportParse
        );
    }

    #[test]
    fn save_then_load_round_trip() {
        let dir = temp_dir("roundtrip");
        let path = dir.join("run.json");

        let mut app = AppState::default();
        app.run = Run::with_segments(["One", "Two"]);
        app.run.game_name = "Game".to_string();
        app.run_path = Some(path.clone());
        app.save_run();
        assert_eq!(app.error_message, None);
        assert!(app.last_saved.is_some());

        app.run.game_name = "Changed".to_string();
        app.save_run();
        assert!(backup_path(&path).exists());

        let mut other = AppState::default();
        other.load_run(path);
        assert_eq!(other.run, app.run);
        assert_eq!(other.run.game_name, "Changed");

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_file_sets_error() {
        let mut app = AppState::default();
        let before = app.run.clone();
        app.load_run(PathBuf::from("/definitely/not/here.json"));
        assert!(app.error_message.is_some());
        assert_eq!(app.run, before);
    }

    #[test]
    fn save_without_path_is_an_error() {
        let mut app = AppState::default();
        app.save_run();
        assert!(app.error_message.is_some());
    }
}

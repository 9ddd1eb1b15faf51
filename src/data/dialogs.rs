// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Prompt-driven dialogs for the run editor.
//!
//! Every dialog works on the open editing session and talks to the user
//! through a `Prompter`. Cancelling a prompt or a file pick is never an
//! error; it just ends the dialog.

use super::AppState;
use super::file_io::parse_import;
use crate::editing::{CleanUpDecision, CleanupReport, EditError};
use std::path::Path;

/// A file the user picked, already read into memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl PickedFile {
    /// File name without its extension
    pub fn stem(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.name)
    }
}

/// User interaction the dialogs need
pub trait Prompter {
    /// Ask for a line of text. `None` when cancelled.
    fn prompt(&mut self, message: &str, default: &str) -> Option<String>;

    /// Ask a yes/no question. `None` when cancelled.
    fn confirm(&mut self, message: &str) -> Option<bool>;

    fn alert(&mut self, message: &str);

    /// Let the user pick a file with one of `extensions`. `None` when
    /// cancelled.
    fn pick_file(&mut self, title: &str, extensions: &[&str]) -> Option<PickedFile>;
}

const ICON_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

impl AppState {
    fn report(prompter: &mut dyn Prompter, result: Result<(), EditError>) {
        if let Err(e) = result {
            prompter.alert(&e.to_string());
        }
    }

    pub fn add_comparison_dialog(&mut self, prompter: &mut dyn Prompter) {
        let Some(session) = self.run_editor.as_mut() else {
            return;
        };
        let Some(name) =
            prompter.prompt("Specify the name of the comparison you want to add:", "")
        else {
            return;
        };
        if name.is_empty() {
            return;
        }
        Self::report(prompter, session.add_comparison(&name));
    }

    pub fn rename_comparison_dialog(&mut self, prompter: &mut dyn Prompter, old: &str) {
        let Some(session) = self.run_editor.as_mut() else {
            return;
        };
        let Some(new) = prompter.prompt("Specify the new name of the comparison:", old) else {
            return;
        };
        if new.is_empty() || new == old {
            return;
        }
        Self::report(prompter, session.rename_comparison(old, &new));
    }

    pub fn import_comparison_dialog(&mut self, prompter: &mut dyn Prompter) {
        let Some(session) = self.run_editor.as_mut() else {
            return;
        };
        let Some(file) = prompter.pick_file("Import Comparison", &["json"]) else {
            return;
        };
        let other = match parse_import(&file.bytes) {
            Ok(run) => run,
            Err(e) => {
                prompter.alert(&e.to_string());
                return;
            }
        };
        let Some(name) = prompter.prompt(
            "Specify the name of the comparison you want to import:",
            file.stem(),
        ) else {
            return;
        };
        if name.is_empty() {
            return;
        }
        Self::report(prompter, session.import_comparison(&other, &name));
    }

    pub fn game_icon_dialog(&mut self, prompter: &mut dyn Prompter) {
        let Some(session) = self.run_editor.as_mut() else {
            return;
        };
        if let Some(file) = prompter.pick_file("Select Game Icon", ICON_EXTENSIONS) {
            Self::report(prompter, session.set_game_icon(&file.bytes));
        }
    }

    pub fn segment_icon_dialog(&mut self, prompter: &mut dyn Prompter) {
        let Some(session) = self.run_editor.as_mut() else {
            return;
        };
        if let Some(file) = prompter.pick_file("Select Segment Icon", ICON_EXTENSIONS) {
            Self::report(prompter, session.set_segment_icon(&file.bytes));
        }
    }

    /// Ask about every sum of best correction. Yes applies, no skips,
    /// cancelling stops the whole pass.
    pub fn clean_sum_of_best_dialog(
        &mut self,
        prompter: &mut dyn Prompter,
    ) -> Option<CleanupReport> {
        let session = self.run_editor.as_mut()?;
        let report = session.clean_sum_of_best(|message| match prompter.confirm(message) {
            Some(true) => CleanUpDecision::Accept,
            Some(false) => CleanUpDecision::Decline,
            None => CleanUpDecision::Abort,
        });
        if report.proposed == 0 {
            prompter.alert("There is nothing to clean up.");
        }
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::icon::test_png;
    use crate::model::sum_of_best::tests::dirty_run;
    use crate::model::{Run, TimeSpan};
    use std::collections::VecDeque;

    /// Prompter answering from prepared queues
    #[derive(Default)]
    struct Scripted {
        answers: VecDeque<Option<String>>,
        confirms: VecDeque<Option<bool>>,
        files: VecDeque<Option<PickedFile>>,
        prompts: Vec<(String, String)>,
        alerts: Vec<String>,
    }

    impl Scripted {
        fn answer(mut self, text: Option<&str>) -> Self {
            self.answers.push_back(text.map(str::to_string));
            self
        }

        fn reply(mut self, answer: Option<bool>) -> Self {
            self.confirms.push_back(answer);
            self
        }

        fn file(mut self, name: &str, bytes: Vec<u8>) -> Self {
            self.files.push_back(Some(PickedFile {
                name: name.to_string(),
                bytes,
            }));
            self
        }
    }

    impl Prompter for Scripted {
        fn prompt(&mut self, message: &str, default: &str) -> Option<String> {
            self.prompts.push((message.to_string(), default.to_string()));
            self.answers.pop_front().flatten()
        }

        fn confirm(&mut self, _message: &str) -> Option<bool> {
            self.confirms.pop_front().flatten()
        }

        fn alert(&mut self, message: &str) {
            self.alerts.push(message.to_string());
        }

        fn pick_file(&mut self, _title: &str, _extensions: &[&str]) -> Option<PickedFile> {
            self.files.pop_front().flatten()
        }
    }

    fn editing(run: Run) -> AppState {
        let mut app = AppState::default();
        app.run = run;
        app.open_run_editor().unwrap();
        app
    }

    fn comparisons(app: &AppState) -> Vec<String> {
        app.run_editor
            .as_ref()
            .unwrap()
            .columns()
            .names()
            .to_vec()
    }

    #[test]
    fn add_dialog_ignores_cancel_and_empty() {
        let mut app = editing(Run::with_segments(["A"]));
        let mut prompter = Scripted::default().answer(None).answer(Some(""));
        app.add_comparison_dialog(&mut prompter);
        app.add_comparison_dialog(&mut prompter);
        assert!(comparisons(&app).is_empty());
        assert!(prompter.alerts.is_empty());
    }

    #[test]
    fn add_dialog_alerts_once_on_conflict() {
        let mut app = editing(Run::with_segments(["A"]));
        let mut prompter = Scripted::default()
            .answer(Some("Friend"))
            .answer(Some("Latest Run"));
        app.add_comparison_dialog(&mut prompter);
        app.add_comparison_dialog(&mut prompter);
        assert_eq!(comparisons(&app), ["Friend"]);
        assert_eq!(
            prompter.alerts,
            ["The comparison could not be added. It may be a duplicate or a reserved name."]
        );
    }

    #[test]
    fn rename_dialog_defaults_to_old_name() {
        let mut app = editing(Run::with_segments(["A"]));
        let mut prompter = Scripted::default().answer(Some("One")).answer(Some("Uno"));
        app.add_comparison_dialog(&mut prompter);
        app.rename_comparison_dialog(&mut prompter, "One");
        assert_eq!(prompter.prompts[1].1, "One");
        assert_eq!(comparisons(&app), ["Uno"]);
    }

    #[test]
    fn import_dialog_uses_file_stem() {
        let mut other = Run::with_segments(["A"]);
        other.segments[0].personal_best_split_time.real_time = Some(TimeSpan::from_millis(5000));
        let json = other.to_json().unwrap().into_bytes();

        let mut app = editing(Run::with_segments(["A"]));
        let mut prompter = Scripted::default()
            .file("friend.json", json)
            .answer(Some("friend"));
        app.import_comparison_dialog(&mut prompter);
        assert_eq!(prompter.prompts[0].1, "friend");
        assert_eq!(comparisons(&app), ["friend"]);
        let state = app.run_editor.as_ref().unwrap().snapshot();
        assert_eq!(state.segments[0].comparison_times, ["5.00"]);
    }

    #[test]
    fn import_dialog_reports_bad_splits() {
        let mut app = editing(Run::with_segments(["A"]));
        let mut prompter = Scripted::default().file("broken.lss", b"<Run>".to_vec());
        app.import_comparison_dialog(&mut prompter);
        assert_eq!(prompter.alerts, ["Couldn't parse the splits."]);
        assert!(prompter.prompts.is_empty());
    }

    #[test]
    fn icon_dialogs() {
        let mut app = editing(Run::with_segments(["A"]));
        let mut prompter = Scripted::default()
            .file("game.png", test_png(9))
            .file("junk.png", b"junk".to_vec());
        app.game_icon_dialog(&mut prompter);
        app.segment_icon_dialog(&mut prompter);
        app.segment_icon_dialog(&mut prompter);
        let session = app.run_editor.as_ref().unwrap();
        assert!(!session.game_icon().is_empty());
        assert_eq!(session.segment_icon(0), "");
        assert_eq!(prompter.alerts, ["The icon could not be read as an image."]);
    }

    #[test]
    fn cleanup_dialog_maps_answers() {
        let mut app = editing(dirty_run());
        let mut prompter = Scripted::default().reply(Some(true)).reply(None);
        let report = app.clean_sum_of_best_dialog(&mut prompter).unwrap();
        assert_eq!(report.proposed, 2);
        assert_eq!(report.applied, 1);
        assert!(report.aborted);

        let mut prompter = Scripted::default().reply(Some(true));
        let report = app.clean_sum_of_best_dialog(&mut prompter).unwrap();
        assert_eq!(report.applied, 1);

        let mut prompter = Scripted::default();
        let report = app.clean_sum_of_best_dialog(&mut prompter).unwrap();
        assert_eq!(report.proposed, 0);
        assert_eq!(prompter.alerts, ["There is nothing to clean up."]);
    }

    #[test]
    fn dialogs_need_an_open_session() {
        let mut app = AppState::default();
        let mut prompter = Scripted::default().answer(Some("Friend"));
        app.add_comparison_dialog(&mut prompter);
        assert!(prompter.prompts.is_empty());
        assert!(app.clean_sum_of_best_dialog(&mut prompter).is_none());
    }
}

// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Line-oriented front-end for the run editor.
//!
//! Reads one command per line, applies it to the open editing session and
//! prints what happened. The same input stream answers prompts, so a whole
//! editing session can be scripted from a file. Rows and comparison columns
//! are numbered from 1.

use crate::data::{AppState, PickedFile, Prompter};
use crate::editing::{EditError, EditSession, FieldView, RowField, SelectionState};
use crate::model::{RunEditor, TimingMethod};
use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::Path;
use thiserror::Error;

const USAGE: &str = "commands: focus N | toggle N | name TEXT | split T | segment T | best T | \
cmp N T | blur | insert-above | insert-below | remove | up | down | add-cmp | \
rename-cmp NAME | remove-cmp NAME | import-cmp | game TEXT | category TEXT | offset T | \
attempts N | timing real|game | icon [clear] | game-icon [clear] | clean | \
clear-history | clear-times | show | save | discard";

// ============================================================================
// COMMANDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(String),
    #[error("`{0}` is not a row or column number")]
    BadNumber(String),
    #[error("timing method must be `real` or `game`")]
    BadTimingMethod,
}

/// One parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Focus(usize),
    Toggle(usize),
    Name(String),
    Split(String),
    Segment(String),
    Best(String),
    Comparison { column: usize, text: String },
    Blur,
    InsertAbove,
    InsertBelow,
    Remove,
    Up,
    Down,
    AddComparison,
    RenameComparison(String),
    RemoveComparison(String),
    ImportComparison,
    Game(String),
    Category(String),
    Offset(String),
    Attempts(String),
    Timing(TimingMethod),
    SegmentIcon { clear: bool },
    GameIcon { clear: bool },
    Clean,
    ClearHistory,
    ClearTimes,
    Show,
    Save,
    Discard,
}

/// Parse a 1-based number into a 0-based index
fn index(text: &str) -> Result<usize, CommandError> {
    text.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| CommandError::BadNumber(text.to_string()))
}

fn required<'a>(command: &str, rest: &'a str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument(command.to_string()))
    } else {
        Ok(rest)
    }
}

fn clear_flag(rest: &str) -> Result<bool, CommandError> {
    match rest {
        "" => Ok(false),
        "clear" => Ok(true),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

impl Command {
    /// Parse a line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match word {
            "focus" => Command::Focus(index(required(word, rest)?)?),
            "toggle" => Command::Toggle(index(required(word, rest)?)?),
            "name" => Command::Name(rest.to_string()),
            "split" => Command::Split(rest.to_string()),
            "segment" => Command::Segment(rest.to_string()),
            "best" => Command::Best(rest.to_string()),
            "cmp" => {
                let rest = required(word, rest)?;
                let (column, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                Command::Comparison {
                    column: index(column)?,
                    text: text.trim().to_string(),
                }
            }
            "blur" => Command::Blur,
            "insert-above" => Command::InsertAbove,
            "insert-below" => Command::InsertBelow,
            "remove" => Command::Remove,
            "up" => Command::Up,
            "down" => Command::Down,
            "add-cmp" => Command::AddComparison,
            "rename-cmp" => Command::RenameComparison(required(word, rest)?.to_string()),
            "remove-cmp" => Command::RemoveComparison(required(word, rest)?.to_string()),
            "import-cmp" => Command::ImportComparison,
            "game" => Command::Game(rest.to_string()),
            "category" => Command::Category(rest.to_string()),
            "offset" => Command::Offset(rest.to_string()),
            "attempts" => Command::Attempts(rest.to_string()),
            "timing" => Command::Timing(match rest {
                "real" => TimingMethod::RealTime,
                "game" => TimingMethod::GameTime,
                _ => return Err(CommandError::BadTimingMethod),
            }),
            "icon" => Command::SegmentIcon {
                clear: clear_flag(rest)?,
            },
            "game-icon" => Command::GameIcon {
                clear: clear_flag(rest)?,
            },
            "clean" => Command::Clean,
            "clear-history" => Command::ClearHistory,
            "clear-times" => Command::ClearTimes,
            "show" => Command::Show,
            "save" => Command::Save,
            "discard" => Command::Discard,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

// ============================================================================
// CONSOLE
// ============================================================================

/// Whether the loop keeps reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Console bound to an input and an output stream
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                tracing::error!("Failed to read input: {}", e);
                None
            }
        }
    }

    fn say(&mut self, text: &str) {
        if let Err(e) = writeln!(self.output, "{}", text) {
            tracing::error!("Failed to write output: {}", e);
        }
    }

    /// Read commands until `save`, `discard` or end of input. End of input
    /// discards the session.
    pub fn run(&mut self, app: &mut AppState) -> Result<()> {
        if !app.is_editing() {
            app.open_run_editor()?;
        }
        self.show(app);

        while let Some(line) = self.read_line() {
            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    self.say(&format!("{}\n{}", e, USAGE));
                    continue;
                }
            };
            if self.execute(app, command) == Flow::Exit {
                return Ok(());
            }
        }

        tracing::info!("Input ended, discarding changes");
        app.close_run_editor(false);
        Ok(())
    }

    fn execute(&mut self, app: &mut AppState, command: Command) -> Flow {
        match command {
            Command::AddComparison => app.add_comparison_dialog(self),
            Command::RenameComparison(old) => app.rename_comparison_dialog(self, &old),
            Command::ImportComparison => app.import_comparison_dialog(self),
            Command::SegmentIcon { clear: false } => app.segment_icon_dialog(self),
            Command::GameIcon { clear: false } => app.game_icon_dialog(self),
            Command::Clean => {
                if let Some(report) = app.clean_sum_of_best_dialog(self) {
                    self.say(&format!(
                        "{} of {} proposed corrections applied",
                        report.applied, report.proposed
                    ));
                }
            }
            Command::Show => self.show(app),
            Command::Save => {
                app.close_run_editor(true);
                app.save_run();
                if let Some(error) = app.error_message.clone() {
                    self.say(&error);
                }
                return Flow::Exit;
            }
            Command::Discard => {
                app.close_run_editor(false);
                return Flow::Exit;
            }
            command => {
                let Some(session) = app.run_editor.as_mut() else {
                    return Flow::Exit;
                };
                if let Err(e) = apply(session, command) {
                    self.say(&e.to_string());
                }
            }
        }
        Flow::Continue
    }

    fn show(&mut self, app: &AppState) {
        let Some(session) = &app.run_editor else {
            return;
        };
        let text = render(session);
        self.say(&text);
    }
}

/// Apply a command that needs no prompting
fn apply(session: &mut EditSession<RunEditor>, command: Command) -> Result<(), EditError> {
    match command {
        Command::Focus(index) => session.focus(index),
        Command::Toggle(index) => session.toggle_additional(index),
        Command::Name(name) => session.set_segment_name(&name)?,
        Command::Split(text) => session.set_split_time(&text)?,
        Command::Segment(text) => session.set_segment_time(&text)?,
        Command::Best(text) => session.set_best_segment_time(&text)?,
        Command::Comparison { column, text } => {
            session.set_row_field(RowField::Comparison(column), &text)?
        }
        Command::Blur => {
            session.blur_row();
            session.blur_offset();
            session.blur_attempt_count();
        }
        Command::InsertAbove => session.insert_above()?,
        Command::InsertBelow => session.insert_below()?,
        Command::Remove => session.remove_selected()?,
        Command::Up => session.move_selected_up()?,
        Command::Down => session.move_selected_down()?,
        Command::RemoveComparison(name) => session.remove_comparison(&name)?,
        Command::Game(name) => session.set_game_name(&name),
        Command::Category(name) => session.set_category_name(&name),
        Command::Offset(text) => session.parse_and_set_offset(&text)?,
        Command::Attempts(text) => session.parse_and_set_attempt_count(&text)?,
        Command::Timing(method) => session.select_timing_method(method),
        Command::SegmentIcon { clear: true } => session.remove_segment_icon()?,
        Command::GameIcon { clear: true } => session.remove_game_icon(),
        Command::ClearHistory => session.clear_history(),
        Command::ClearTimes => session.clear_times(),
        _ => {}
    }
    Ok(())
}

fn cell(view: Option<FieldView<'_>>) -> String {
    match view {
        Some(view) if !view.valid => format!("{}!", view.text),
        Some(view) => view.text.to_string(),
        None => String::new(),
    }
}

/// Plain text table of the session's current view
pub fn render(session: &EditSession<RunEditor>) -> String {
    let state = session.snapshot();
    let offset = session.offset_field();
    let attempts = session.attempts_field();
    let mut lines = vec![
        format!(
            "{} - {}{}",
            state.game,
            state.category,
            if session.game_icon().is_empty() { "" } else { " [icon]" }
        ),
        format!(
            "offset {}{}  attempts {}{}  timing {}",
            offset.text,
            if offset.valid { "" } else { "!" },
            attempts.text,
            if attempts.valid { "" } else { "!" },
            state.timing_method
        ),
    ];

    let mut header = String::from("   #  name | split | segment | best");
    for name in session.columns().names() {
        header.push_str(" | ");
        header.push_str(name);
    }
    lines.push(header);

    for (i, segment) in state.segments.iter().enumerate() {
        let marker = match segment.selected {
            SelectionState::Active => '>',
            SelectionState::Selected => '*',
            SelectionState::NotSelected => ' ',
        };
        let mut line = format!(
            "{} {:>3}  {}{} | {} | {} | {}",
            marker,
            i + 1,
            segment.name,
            if session.segment_icon(i).is_empty() { "" } else { " [icon]" },
            cell(session.row_field(i, RowField::SplitTime)),
            cell(session.row_field(i, RowField::SegmentTime)),
            cell(session.row_field(i, RowField::BestSegmentTime)),
        );
        for k in 0..session.columns().len() {
            line.push_str(" | ");
            line.push_str(&cell(session.row_field(i, RowField::Comparison(k))));
        }
        lines.push(line);
    }
    lines.join("\n")
}

impl<R: BufRead, W: Write> Prompter for Console<R, W> {
    fn prompt(&mut self, message: &str, default: &str) -> Option<String> {
        if default.is_empty() {
            self.say(message);
        } else {
            self.say(&format!("{} [{}]", message, default));
        }
        let answer = self.read_line()?;
        let answer = answer.trim();
        Some(if answer.is_empty() { default } else { answer }.to_string())
    }

    fn confirm(&mut self, message: &str) -> Option<bool> {
        self.say(&format!("{} [y/n, anything else cancels]", message));
        match self.read_line()?.trim() {
            "y" | "yes" => Some(true),
            "n" | "no" => Some(false),
            _ => None,
        }
    }

    fn alert(&mut self, message: &str) {
        self.say(message);
    }

    fn pick_file(&mut self, title: &str, extensions: &[&str]) -> Option<PickedFile> {
        self.say(&format!("{} ({}), empty cancels:", title, extensions.join(", ")));
        let line = self.read_line()?;
        let path = Path::new(line.trim());
        if path.as_os_str().is_empty() {
            return None;
        }
        match std::fs::read(path) {
            Ok(bytes) => Some(PickedFile {
                name: path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                bytes,
            }),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                self.say(&format!("Couldn't read {}: {}", path.display(), e));
                None
            }
        }
    }
}

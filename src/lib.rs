// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Splitbench: a run editor for speedrun splits

pub mod console;
pub mod data;
pub mod editing;
pub mod model;
pub mod settings;

use anyhow::{Result, bail};
use console::Console;
use data::AppState;
use settings::Config;
use std::path::{Path, PathBuf};

/// Entry point for the Splitbench console editor
pub fn run() -> Result<()> {
    // Initialize tracing subscriber (can be controlled via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("splitbench=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(Path::new(settings::files::CONFIG_FILE_NAME))?;
    let mut app = AppState::new(config);

    handle_command_line_args(&mut app)?;

    let stdin = std::io::stdin();
    let mut console = Console::new(stdin.lock(), std::io::stdout());
    console.run(&mut app)
}

/// Load the run file named on the command line
fn handle_command_line_args(app: &mut AppState) -> Result<()> {
    let Some(arg) = std::env::args_os().nth(1) else {
        bail!("Usage: splitbench <path/to/run.json>");
    };
    let run_path = PathBuf::from(arg);

    if !run_path.exists() {
        tracing::error!("Path does not exist: {}", run_path.display());
        bail!("Usage: splitbench <path/to/run.json>");
    }

    tracing::info!("Loading run from: {}", run_path.display());
    app.load_run(run_path);
    if let Some(error) = app.error_message.take() {
        bail!(error);
    }
    Ok(())
}

// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Application settings and configuration constants.
//!
//! Compile-time knobs live at the top of this file and are re-exported
//! through small public modules. Runtime options that a user may want to
//! change without rebuilding come from an optional `splitbench.toml`.

use crate::model::TimingMethod;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// EDITOR SETTINGS
// ============================================================================
/// Name given to freshly inserted segments
const NEW_SEGMENT_NAME: &str = "";

/// Timing method a new editing session starts in
const DEFAULT_TIMING_METHOD: TimingMethod = TimingMethod::RealTime;

// ============================================================================
// ICON SETTINGS
// ============================================================================
/// Largest icon file accepted (4 MiB)
const ICON_MAX_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// FILE SETTINGS
// ============================================================================
/// Config file looked up next to the working directory
const CONFIG_FILE_NAME: &str = "splitbench.toml";

/// Suffix appended to the run file name when saving a backup copy
const BACKUP_SUFFIX: &str = ".bak";

// ============================================================================
// PUBLIC API - Don't edit below this line unless you know what you're doing
// ============================================================================

/// Editor defaults
pub mod editor {
    use crate::model::TimingMethod;

    /// Name given to freshly inserted segments
    pub const NEW_SEGMENT_NAME: &str = super::NEW_SEGMENT_NAME;

    /// Timing method a new editing session starts in
    pub const DEFAULT_TIMING_METHOD: TimingMethod = super::DEFAULT_TIMING_METHOD;
}

/// Icon limits
pub mod icons {
    /// Largest icon file accepted, in bytes
    pub const MAX_BYTES: usize = super::ICON_MAX_BYTES;
}

/// Run file handling
pub mod files {
    /// Runtime config file name
    pub const CONFIG_FILE_NAME: &str = super::CONFIG_FILE_NAME;

    /// Suffix for the backup written before overwriting a run file
    pub const BACKUP_SUFFIX: &str = super::BACKUP_SUFFIX;
}

// ============================================================================
// RUNTIME CONFIG
// ============================================================================

/// Options read from `splitbench.toml`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Timing method selected when a session opens
    pub timing_method: TimingMethod,

    /// Keep a `.bak` copy of the run file before saving over it
    pub backup_on_save: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timing_method: editor::DEFAULT_TIMING_METHOD,
            backup_on_save: true,
        }
    }
}

impl Config {
    /// Parse a config from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid splitbench config")
    }

    /// Load the config file, falling back to defaults when it doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn config_overrides() {
        let config = Config::from_toml(
            "timing_method = \"GameTime\"\nbackup_on_save = false\n",
        )
        .unwrap();
        assert_eq!(config.timing_method, TimingMethod::GameTime);
        assert!(!config.backup_on_save);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_toml("zoom = 3").is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let config = Config::load(Path::new("/nonexistent/splitbench.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}

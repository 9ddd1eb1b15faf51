// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Last-known icon URLs per slot.
//!
//! Projections only carry an icon URL when the icon changed, so the session
//! remembers the last one it saw for every slot. Slots are never dropped:
//! a row that reappears after a removal keeps its entry until the run
//! reports a change for it.

use super::capability::EditorState;

/// An icon slot as the cache sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconKey {
    Game,
    Segment(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconCache {
    game: String,
    segments: Vec<String>,
}

impl IconCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL for a slot; empty when no icon is known
    pub fn resolve(&self, key: IconKey) -> &str {
        match key {
            IconKey::Game => &self.game,
            IconKey::Segment(index) => self.segments.get(index).map_or("", String::as_str),
        }
    }

    /// Apply the icon change tokens of a projection
    pub fn observe(&mut self, state: &EditorState) {
        if let Some(url) = &state.icon_change {
            self.game.clone_from(url);
        }
        if self.segments.len() < state.segments.len() {
            self.segments.resize(state.segments.len(), String::new());
        }
        for (slot, segment) in self.segments.iter_mut().zip(&state.segments) {
            if let Some(url) = &segment.icon_change {
                slot.clone_from(url);
            }
        }
    }
}

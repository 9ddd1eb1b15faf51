// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Run data model and the in-memory run editor

pub mod editor;
pub mod icon;
pub mod run;
pub mod sum_of_best;
pub mod time;

pub use editor::RunEditor;
pub use icon::{Icon, IconError, IconId};
pub use run::{Attempt, Run, RunError, Segment};
pub use time::{ParseTimeError, Time, TimeSpan, TimingMethod};

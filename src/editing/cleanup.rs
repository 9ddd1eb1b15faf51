// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Interactive sum of best cleanup loop

use super::capability::SumOfBestCleaner;

/// What the user answered for one proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanUpDecision {
    Accept,
    Decline,
    /// Stop asking; nothing further is applied
    Abort,
}

/// Outcome of one cleanup pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub proposed: usize,
    pub applied: usize,
    pub aborted: bool,
}

/// Walk every proposal of `cleaner`, asking `decide` about each one.
///
/// Accepted proposals are applied before the next one is computed, since
/// applying one can change what comes after it.
pub fn run_cleanup(
    cleaner: &mut dyn SumOfBestCleaner,
    mut decide: impl FnMut(&str) -> CleanUpDecision,
) -> CleanupReport {
    let mut report = CleanupReport::default();
    while let Some(clean_up) = cleaner.next_potential_clean_up() {
        report.proposed += 1;
        match decide(clean_up.message()) {
            CleanUpDecision::Accept => {
                cleaner.apply(clean_up);
                report.applied += 1;
            }
            CleanUpDecision::Decline => {}
            CleanUpDecision::Abort => {
                report.aborted = true;
                break;
            }
        }
    }
    tracing::debug!(
        "Cleanup pass: {} proposed, {} applied{}",
        report.proposed,
        report.applied,
        if report.aborted { ", aborted" } else { "" }
    );
    report
}

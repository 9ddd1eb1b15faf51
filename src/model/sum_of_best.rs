// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Sum of best cleaning.
//!
//! When splits were skipped during an attempt, the history entry after the
//! gap holds the combined time of several segments. If that combined time
//! beats the sum of the best segments it spans, one of the two is wrong and
//! the sum of best is unreliable. `HistoryCleaner` walks the history once
//! per timing method and proposes deleting each such combined time.

use std::ops::Bound;

use super::run::Run;
use super::time::{TimeSpan, TimingMethod};
use crate::editing::capability::{PotentialCleanUp, SumOfBestCleaner};

/// Cursor over the segment history of a borrowed run
pub struct HistoryCleaner<'a> {
    run: &'a mut Run,
    method_index: usize,
    segment_index: usize,
    /// Last attempt id inspected in the current segment
    after: Option<i32>,
}

impl<'a> HistoryCleaner<'a> {
    pub fn new(run: &'a mut Run) -> Self {
        tracing::debug!("Sum of best cleaner started");
        Self {
            run,
            method_index: 0,
            segment_index: 0,
            after: None,
        }
    }

    /// Next history entry with a time for `method` in the current segment
    fn next_entry(&self, method: TimingMethod) -> Option<(i32, TimeSpan)> {
        let lower = match self.after {
            Some(id) => Bound::Excluded(id),
            None => Bound::Unbounded,
        };
        self.run.segments[self.segment_index]
            .segment_history
            .range((lower, Bound::Unbounded))
            .find_map(|(&id, time)| time[method].map(|t| (id, t)))
    }

    fn check(
        &self,
        index: usize,
        attempt_id: i32,
        time: TimeSpan,
        method: TimingMethod,
    ) -> Option<PotentialCleanUp> {
        let segments = &self.run.segments;
        let start = (0..index)
            .rev()
            .find(|&j| {
                segments[j]
                    .segment_history
                    .get(&attempt_id)
                    .is_some_and(|t| t[method].is_some())
            })
            .map_or(0, |j| j + 1);
        if start == index {
            return None;
        }

        let sum = self.run.sum_of_best(start..=index, method)?;
        if time >= sum {
            return None;
        }

        let from = match start.checked_sub(1) {
            Some(previous) => format!("“{}”", segments[previous].name),
            None => "the start of the run".to_string(),
        };
        let date = self
            .run
            .attempt(attempt_id)
            .and_then(|a| a.started)
            .map(|started| format!(" in a run on {}", started.format("%Y-%m-%d")))
            .unwrap_or_default();
        let message = format!(
            "You had a {} segment time of {} between {} and “{}”{}, which is faster \
             than the combined best segments of {}. Do you think that this segment \
             time is inaccurate and should be removed?",
            method, time, from, segments[index].name, date, sum
        );
        Some(PotentialCleanUp::new(message, index, attempt_id, method))
    }
}

impl SumOfBestCleaner for HistoryCleaner<'_> {
    fn next_potential_clean_up(&mut self) -> Option<PotentialCleanUp> {
        loop {
            let method = *TimingMethod::ALL.get(self.method_index)?;
            if self.segment_index >= self.run.len() {
                self.method_index += 1;
                self.segment_index = 0;
                self.after = None;
                continue;
            }

            let Some((attempt_id, time)) = self.next_entry(method) else {
                self.segment_index += 1;
                self.after = None;
                continue;
            };
            self.after = Some(attempt_id);

            if let Some(clean_up) = self.check(self.segment_index, attempt_id, time, method) {
                return Some(clean_up);
            }
        }
    }

    fn apply(&mut self, clean_up: PotentialCleanUp) {
        let Some(segment) = self.run.segments.get_mut(clean_up.segment_index) else {
            return;
        };
        let history = &mut segment.segment_history;
        if let Some(time) = history.get_mut(&clean_up.attempt_id) {
            time.set(clean_up.method, None);
            if time.is_empty() {
                history.remove(&clean_up.attempt_id);
            }
            tracing::info!(
                "Removed {} history time of attempt {} from segment {}",
                clean_up.method,
                clean_up.attempt_id,
                clean_up.segment_index
            );
        }
    }
}

impl Drop for HistoryCleaner<'_> {
    fn drop(&mut self) {
        tracing::debug!("Sum of best cleaner released");
    }
}

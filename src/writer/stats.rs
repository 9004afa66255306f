// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Per-[`Status`] counters of steps and scenarios.

use crate::event::Status;

/// Execution statistics of [`Step`]s (or [`Scenario`]s).
///
/// [`Scenario`]: crate::feature::Pickle
/// [`Step`]: crate::feature::PickleStep
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    /// Number of passed items.
    pub passed: usize,

    /// Number of failed items.
    pub failed: usize,

    /// Number of pending items.
    pub pending: usize,

    /// Number of undefined items.
    pub undefined: usize,

    /// Number of skipped items.
    ///
    /// Always zero for scenarios.
    pub skipped: usize,
}

impl Stats {
    /// Creates new [`Stats`] with all the counts set to zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            passed: 0,
            failed: 0,
            pending: 0,
            undefined: 0,
            skipped: 0,
        }
    }

    /// Counts one more item of the given [`Status`].
    pub fn record(&mut self, status: Status) {
        *match status {
            Status::Passed => &mut self.passed,
            Status::Failed => &mut self.failed,
            Status::Pending => &mut self.pending,
            Status::Undefined => &mut self.undefined,
            Status::Skipped => &mut self.skipped,
        } += 1;
    }

    /// Returns total number of items these [`Stats`] have been collected for.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.failed + self.pending + self.undefined + self.skipped
    }

    /// Returns non-zero counts paired with their [`Status`], in reporting
    /// order.
    pub fn non_zero(&self) -> impl Iterator<Item = (Status, usize)> {
        [
            (Status::Passed, self.passed),
            (Status::Failed, self.failed),
            (Status::Pending, self.pending),
            (Status::Undefined, self.undefined),
            (Status::Skipped, self.skipped),
        ]
        .into_iter()
        .filter(|(_, n)| *n > 0)
    }
}

impl FromIterator<Status> for Stats {
    fn from_iter<I: IntoIterator<Item = Status>>(iter: I) -> Self {
        let mut stats = Self::new();
        for s in iter {
            stats.record(s);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_every_status() {
        let stats = [
            Status::Passed,
            Status::Passed,
            Status::Failed,
            Status::Pending,
            Status::Undefined,
            Status::Skipped,
        ]
        .into_iter()
        .collect::<Stats>();

        assert_eq!(
            stats,
            Stats {
                passed: 2,
                failed: 1,
                pending: 1,
                undefined: 1,
                skipped: 1,
            },
        );
        assert_eq!(stats.total(), 6);
    }

    #[test]
    fn omits_zero_counts() {
        let stats = Stats { failed: 3, skipped: 1, ..Stats::new() };

        assert_eq!(
            stats.non_zero().collect::<Vec<_>>(),
            [(Status::Failed, 3), (Status::Skipped, 1)],
        );
    }

    #[test]
    fn default_is_empty() {
        assert_eq!(Stats::default().total(), 0);
        assert_eq!(Stats::default().non_zero().count(), 0);
    }
}

// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Default concurrent [`Runner`] of scenarios.
//!
//! [`Runner`]: Basic

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::Instant,
};

use futures::{channel::mpsc, executor::block_on_stream};
use tracing::{debug, info};

use crate::{
    event::{self, SuiteResult},
    feature::{self, ExpandExamplesError, Feature},
    step, Writer,
};

use super::{
    executor::{Executor, DEFAULT_MAX_NESTING_DEPTH},
    scenario::{self, Scheduled},
};

/// Default number of concurrently executed scenarios.
pub const DEFAULT_MAX_CONCURRENT_SCENARIOS: usize = 64;

/// CLI options of a [`Basic`] runner.
#[derive(Clone, Debug, Default, clap::Args)]
#[group(skip)]
pub struct Cli {
    /// Number of scenarios to run concurrently. If not specified, uses the
    /// value configured in tests runner, or 64 by default.
    #[arg(long, short, value_name = "int", global = true)]
    pub concurrency: Option<usize>,

    /// Maximum depth nested steps may expand to. If not specified, uses the
    /// value configured in tests runner, or 32 by default.
    #[arg(long, value_name = "int", global = true)]
    pub max_nesting_depth: Option<usize>,
}

/// Default runner executing scenarios on a bounded pool of worker threads.
///
/// Workers pull scenarios from a shared queue in document order, while all
/// the [`event::Cucumber`]s are handed to a [`Writer`] on the calling thread.
/// Results are reported back in document order, regardless of the order
/// scenarios finished in.
pub struct Basic<World> {
    /// Number of concurrently executed scenarios.
    max_concurrent_scenarios: usize,

    /// Depth nested steps are allowed to expand to.
    max_nesting_depth: usize,

    /// [`step::Collection`] to match steps against.
    steps: step::Collection<World>,
}

impl<World> std::fmt::Debug for Basic<World> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Basic")
            .field("max_concurrent_scenarios", &self.max_concurrent_scenarios)
            .field("max_nesting_depth", &self.max_nesting_depth)
            .field("steps", &self.steps.len())
            .finish()
    }
}

impl<World: 'static> Default for Basic<World> {
    fn default() -> Self {
        Self::new(step::Collection::new())
    }
}

impl<World> Basic<World> {
    /// Creates a new [`Basic`] runner matching steps against the given
    /// [`step::Collection`].
    #[must_use]
    pub const fn new(steps: step::Collection<World>) -> Self {
        Self {
            max_concurrent_scenarios: DEFAULT_MAX_CONCURRENT_SCENARIOS,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            steps,
        }
    }

    /// Makes this [`Basic`] runner to execute at most `max` scenarios at
    /// once.
    ///
    /// Zero is treated as `1`.
    #[must_use]
    pub fn max_concurrent_scenarios(mut self, max: usize) -> Self {
        self.max_concurrent_scenarios = max.max(1);
        self
    }

    /// Limits the depth nested steps are allowed to expand to.
    #[must_use]
    pub fn max_nesting_depth(mut self, max: usize) -> Self {
        self.max_nesting_depth = max;
        self
    }

    /// Applies the given [`Cli`] options on top of the configured ones.
    #[must_use]
    pub fn with_cli(self, cli: &Cli) -> Self {
        let depth = cli.max_nesting_depth.unwrap_or(self.max_nesting_depth);
        let concurrency =
            cli.concurrency.unwrap_or(self.max_concurrent_scenarios);
        self.max_concurrent_scenarios(concurrency).max_nesting_depth(depth)
    }

    /// Returns the [`step::Collection`] of this [`Basic`] runner.
    #[must_use]
    pub const fn steps(&self) -> &step::Collection<World> {
        &self.steps
    }

    /// Returns the number of concurrently executed scenarios.
    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.max_concurrent_scenarios
    }

    /// Compiles the given [`Feature`]s into document-ordered scenarios.
    ///
    /// # Errors
    ///
    /// If [`Examples`] of some [`Scenario Outline`][1] cannot be expanded.
    ///
    /// [`Examples`]: gherkin::Examples
    /// [1]: https://cucumber.io/docs/gherkin/reference#scenario-outline
    pub fn schedule(
        features: &[Feature],
    ) -> Result<Vec<Scheduled>, ExpandExamplesError> {
        // Outlines aren't expanded yet, so this is a lower bound.
        let mut scheduled = Vec::with_capacity(
            features
                .iter()
                .map(|f| feature::Ext::count_scenarios(&f.document))
                .sum(),
        );
        for (feature, f) in features.iter().enumerate() {
            for pickle in f.pickles()? {
                scheduled.push(Scheduled {
                    index: scheduled.len(),
                    feature,
                    pickle: Arc::new(pickle),
                });
            }
        }
        Ok(scheduled)
    }

    /// Executes the given `scenarios`, feeding the `writer` with
    /// [`event::Cucumber`]s.
    ///
    /// Blocks until every scenario finishes.
    pub fn run<Wr>(
        &self,
        scenarios: Vec<Scheduled>,
        writer: &mut Wr,
    ) -> SuiteResult
    where
        World: Default,
        Wr: Writer + ?Sized,
    {
        let started = Instant::now();
        let total = scenarios.len();
        let workers = self.max_concurrent_scenarios.min(total);
        info!(scenarios = total, workers, "execution started");
        writer.handle_event(&event::Cucumber::Started { scenarios: total });

        let executor = Executor::new(&self.steps, self.max_nesting_depth);
        let cursor = AtomicUsize::new(0);
        let (sender, receiver) = mpsc::unbounded();

        let mut results = thread::scope(|s| {
            for _ in 0..workers {
                let sender = sender.clone();
                let (scenarios, cursor) = (&scenarios, &cursor);
                _ = s.spawn(move || {
                    while let Some(sc) =
                        scenarios.get(cursor.fetch_add(1, Ordering::Relaxed))
                    {
                        let result = scenario::run(executor, sc, |ev| {
                            _ = sender.unbounded_send(ev);
                        });
                        _ = sender
                            .unbounded_send(event::Cucumber::Scenario(result));
                    }
                });
            }
            drop(sender);

            let mut results = Vec::with_capacity(total);
            for ev in block_on_stream(receiver) {
                writer.handle_event(&ev);
                if let event::Cucumber::Scenario(result) = ev {
                    debug!(
                        index = result.index,
                        status = %result.status(),
                        "scenario finished",
                    );
                    results.push(result);
                }
            }
            results
        });
        results.sort_by_key(|r| r.index);

        let suite = SuiteResult::new(results, started.elapsed());
        let finished = event::Cucumber::Finished(suite);
        writer.handle_event(&finished);
        let event::Cucumber::Finished(suite) = finished else {
            unreachable!("`Finished` event is constructed above");
        };
        info!(
            failed = suite.is_failed(),
            elapsed = ?suite.elapsed,
            "execution finished",
        );
        suite
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use super::*;
    use crate::{
        event::Status,
        step::{Collection, Outcome},
        writer::Discard,
    };

    #[derive(Default)]
    struct World;

    const SUITE: &str = "\
Feature: concurrency

  Scenario: first
    Given slow 30
    Then fail

  Scenario: second
    Given slow 0

  Scenario: third
    Given slow 10
    Then unknown
";

    fn runner() -> Basic<World> {
        let mut steps = Collection::new();
        steps
            .step(r"slow (\d+)", |_: &mut World, ms: u64| {
                thread::sleep(Duration::from_millis(ms));
            })
            .unwrap()
            .step("fail", |_: &mut World| Outcome::Failed("nope".into()))
            .unwrap();
        Basic::new(steps)
    }

    fn features() -> Vec<Feature> {
        vec![Feature::parse("concurrency.feature", SUITE).unwrap()]
    }

    #[test]
    fn reports_in_document_order() {
        let runner = runner().max_concurrent_scenarios(3);
        let scheduled = Basic::<World>::schedule(&features()).unwrap();

        let suite = runner.run(scheduled, &mut Discard);

        let names = suite
            .scenarios
            .iter()
            .map(|s| s.pickle.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, ["first", "second", "third"]);
        let statuses =
            suite.scenarios.iter().map(|s| s.status()).collect::<Vec<_>>();
        assert_eq!(
            statuses,
            [Status::Failed, Status::Passed, Status::Undefined],
        );
        assert!(suite.is_failed());
    }

    #[test]
    fn clamps_concurrency() {
        assert_eq!(runner().max_concurrent_scenarios(0).concurrency(), 1);
        assert_eq!(runner().concurrency(), DEFAULT_MAX_CONCURRENT_SCENARIOS);
    }

    #[test]
    fn applies_cli() {
        let cli = Cli { concurrency: Some(4), max_nesting_depth: None };

        let runner = runner().max_nesting_depth(5).with_cli(&cli);

        assert_eq!(runner.concurrency(), 4);
        assert_eq!(runner.max_nesting_depth, 5);
    }

    #[test]
    fn runs_empty_suite() {
        let suite = runner().run(Vec::new(), &mut Discard);

        assert!(suite.scenarios.is_empty());
        assert!(!suite.is_failed());
    }
}

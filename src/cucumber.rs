// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Top-level [Cucumber] executor.
//!
//! [Cucumber]: https://cucumber.io

use std::{
    any, io,
    path::{Path, PathBuf},
};

use derive_more::{Display, Error, From};

use crate::{
    cli,
    event::SuiteResult,
    feature::{ExpandExamplesError, Feature},
    parser, runner, step,
    writer::{self, Writer},
};

/// Top-level [Cucumber] executor.
///
/// Bundles a [`step::Collection`] (inside a [`runner::Basic`]) with a
/// [`Writer`] outputting the execution.
///
/// [Cucumber]: https://cucumber.io
pub struct Cucumber<World, Wr = writer::Progress> {
    /// [`runner::Basic`] executing scenarios.
    runner: runner::Basic<World>,

    /// [`Writer`] outputting events.
    writer: Wr,

    /// Path to load [`Feature`]s from, overriding the one passed to
    /// [`Cucumber::run_path()`].
    input: Option<PathBuf>,
}

impl<World, Wr: std::fmt::Debug> std::fmt::Debug for Cucumber<World, Wr> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cucumber")
            .field("runner", &self.runner)
            .field("writer", &self.writer)
            .field("input", &self.input)
            .finish()
    }
}

impl<World> Cucumber<World> {
    /// Creates a new [`Cucumber`] executor matching steps against the given
    /// [`step::Collection`] and printing [`writer::Progress`] to
    /// [`io::Stdout`].
    #[must_use]
    pub fn new(steps: step::Collection<World>) -> Self {
        let writer =
            writer::Progress::stdout().world_name(world_name::<World>());
        Self { runner: runner::Basic::new(steps), writer, input: None }
    }
}

impl<World, Out: io::Write> Cucumber<World, writer::Progress<Out>> {
    /// Applies the given [`cli::Opts`] to the runner and the writer.
    ///
    /// The [`cli::Opts::input`] path, if any, replaces the one passed to
    /// [`Cucumber::run_path()`].
    #[must_use]
    pub fn with_cli<Custom: cli::Args>(self, opts: &cli::Opts<Custom>) -> Self {
        Self {
            runner: self.runner.with_cli(&opts.runner),
            writer: self.writer.with_cli(&opts.writer),
            input: opts.input.clone().or(self.input),
        }
    }
}

impl<World, Wr: Writer> Cucumber<World, Wr> {
    /// Replaces the [`Writer`] of this [`Cucumber`] executor.
    #[must_use]
    pub fn with_writer<Other: Writer>(
        self,
        writer: Other,
    ) -> Cucumber<World, Other> {
        Cucumber { runner: self.runner, writer, input: self.input }
    }

    /// Makes this [`Cucumber`] executor to run at most `max` scenarios at
    /// once.
    ///
    /// Zero is treated as `1`.
    #[must_use]
    pub fn max_concurrent_scenarios(mut self, max: usize) -> Self {
        self.runner = self.runner.max_concurrent_scenarios(max);
        self
    }

    /// Limits the depth nested steps are allowed to expand to.
    #[must_use]
    pub fn max_nesting_depth(mut self, max: usize) -> Self {
        self.runner = self.runner.max_nesting_depth(max);
        self
    }

    /// Returns the [`Writer`] of this [`Cucumber`] executor.
    #[must_use]
    pub const fn writer(&self) -> &Wr {
        &self.writer
    }

    /// Unwraps the [`Writer`] of this [`Cucumber`] executor.
    #[must_use]
    pub fn into_writer(self) -> Wr {
        self.writer
    }

    /// Executes the given [`Feature`]s and returns the [`SuiteResult`].
    ///
    /// # Errors
    ///
    /// If [`Examples`] of some [`Scenario Outline`][1] cannot be expanded.
    ///
    /// [`Examples`]: gherkin::Examples
    /// [1]: https://cucumber.io/docs/gherkin/reference#scenario-outline
    pub fn run(
        &mut self,
        features: &[Feature],
    ) -> Result<SuiteResult, ExpandExamplesError>
    where
        World: Default,
    {
        let scenarios = runner::Basic::<World>::schedule(features)?;
        Ok(self.runner.run(scenarios, &mut self.writer))
    }

    /// Loads [`Feature`]s from the given `path` and executes them.
    ///
    /// The `path` is ignored if another one is provided via
    /// [`Cucumber::with_cli()`].
    ///
    /// # Errors
    ///
    /// If [`Feature`]s cannot be loaded or expanded.
    pub fn run_path(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<SuiteResult, Error>
    where
        World: Default,
    {
        let features = match &self.input {
            Some(input) => parser::Basic.parse(input)?,
            None => parser::Basic.parse(path)?,
        };
        self.run(&features).map_err(Into::into)
    }

    /// Loads [`Feature`]s from the given `path` (unless overridden via
    /// [`Cucumber::with_cli()`]) and executes them.
    ///
    /// # Panics
    ///
    /// If [`Feature`]s cannot be loaded, or some step has failed.
    pub fn run_and_exit(mut self, path: impl AsRef<Path>)
    where
        World: Default,
    {
        let suite = self
            .run_path(path)
            .unwrap_or_else(|e| panic!("Failed to load features: {e}"));
        if suite.is_failed() {
            let failed = suite.step_stats.failed;
            panic!(
                "{failed} step{} failed",
                if failed == 1 { "" } else { "s" },
            );
        }
    }
}

/// Error of loading [`Feature`]s for execution.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// [`Feature`]s cannot be loaded.
    #[display("{_0}")]
    Parser(parser::Error),

    /// [`Scenario Outline`][1] cannot be expanded.
    ///
    /// [1]: https://cucumber.io/docs/gherkin/reference#scenario-outline
    #[display("{_0}")]
    ExpandExamples(ExpandExamplesError),
}

/// Returns the unqualified name of the `World` type.
fn world_name<World>() -> String {
    let full = any::type_name::<World>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path).to_owned()
}

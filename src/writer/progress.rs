// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Compact progress [`Writer`] implementation.

use std::{borrow::Cow, io, time::Duration};

use itertools::Itertools as _;
use smart_default::SmartDefault;

use crate::{
    event::{self, Status, SuiteResult},
    feature, snippet,
    writer::{
        out::{Styles, WriteStrExt as _},
        Coloring, Stats, Writer,
    },
};

/// Default number of step symbols in a single row of output.
pub const STEPS_PER_ROW: usize = 70;

/// CLI options of a [`Progress`] [`Writer`].
#[derive(Clone, Copy, Debug, SmartDefault, clap::Args)]
#[group(skip)]
pub struct Cli {
    /// Coloring policy for a console output.
    #[arg(
        long,
        value_name = "auto|always|never",
        default_value = "auto",
        global = true
    )]
    #[default(Coloring::Auto)]
    pub color: Coloring,
}

/// [`Writer`] printing a symbol per executed step and a summary at the end.
///
/// Symbols are `.` for passed, `F` for failed, `P` for pending, `U` for
/// undefined and `-` for skipped steps, wrapped into rows with a running
/// counter. The summary lists failed steps, counts by [`Status`], elapsed
/// time and stub definitions for undefined steps.
#[derive(Debug)]
pub struct Progress<Out: io::Write = io::Stdout> {
    /// [`io::Write`] implementor to write the output into.
    output: Out,

    /// [`Styles`] for terminal output.
    styles: Styles,

    /// Number of step symbols in a single row.
    steps_per_row: usize,

    /// Number of step symbols written so far.
    written: usize,

    /// [`snippet::Generator`] of stubs for undefined steps.
    snippets: snippet::Generator,
}

impl Progress {
    /// Creates a new [`Progress`] [`Writer`] outputting to [`io::Stdout`].
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<Out: io::Write> Progress<Out> {
    /// Creates a new [`Progress`] [`Writer`] outputting into the given
    /// `output`.
    #[must_use]
    pub fn new(output: Out) -> Self {
        Self {
            output,
            styles: Styles::new(),
            steps_per_row: STEPS_PER_ROW,
            written: 0,
            snippets: snippet::Generator::new(),
        }
    }

    /// Applies the given [`Coloring`] policy.
    #[must_use]
    pub fn with_coloring(mut self, coloring: Coloring) -> Self {
        self.styles.apply_coloring(coloring);
        self
    }

    /// Applies the given [`Cli`] options.
    #[must_use]
    pub fn with_cli(self, cli: &Cli) -> Self {
        self.with_coloring(cli.color)
    }

    /// Sets the number of step symbols in a single row.
    ///
    /// Zero is treated as `1`.
    #[must_use]
    pub fn steps_per_row(mut self, n: usize) -> Self {
        self.steps_per_row = n.max(1);
        self
    }

    /// Sets the name of the world type used in generated snippets.
    #[must_use]
    pub fn world_name(mut self, name: impl Into<String>) -> Self {
        self.snippets = self.snippets.world(name);
        self
    }

    /// Returns the underlying output.
    #[must_use]
    pub fn into_inner(self) -> Out {
        self.output
    }

    /// Writes the symbol of a finished step.
    fn step(&mut self, status: Status) -> io::Result<()> {
        let symbol = self.styles.status(status, status.symbol().to_string());
        self.output.write_str(symbol)?;
        self.written += 1;
        if self.written % self.steps_per_row == 0 {
            self.output.write_line(format!(" {}", self.written))?;
        }
        Ok(())
    }

    /// Writes the summary of a finished execution.
    fn finish(&mut self, suite: &SuiteResult) -> io::Result<()> {
        let left = self.written % self.steps_per_row;
        if left != 0 {
            if self.written > self.steps_per_row {
                self.output.write_str(" ".repeat(self.steps_per_row - left))?;
            }
            self.output.write_line(format!(" {}", self.written))?;
        }
        self.output.write_str("\n\n")?;

        if suite.is_failed() {
            self.failed_steps(suite)?;
        }

        let scenarios = format!(
            "{}{}",
            self.maybe_plural("scenario", suite.scenario_stats.total()),
            self.format_stats(suite.scenario_stats),
        );
        let steps = format!(
            "{}{}",
            self.maybe_plural("step", suite.step_stats.total()),
            self.format_stats(suite.step_stats),
        );
        self.output.write_line(scenarios)?;
        self.output.write_line(steps)?;
        self.output.write_line(format_elapsed(suite.elapsed))?;

        if !suite.undefined.is_empty() {
            let snippets = self.snippets.generate(&suite.undefined);
            let header = self.styles.pending(
                "\nYou can implement step definitions for undefined steps \
                 with these snippets:\n\n",
            );
            let code = self.styles.pending(self.snippets.render(&snippets));
            self.output.write_str(header)?;
            self.output.write_str(code)?;
        }
        self.output.flush()
    }

    /// Writes the block of failed steps, in document order.
    fn failed_steps(&mut self, suite: &SuiteResult) -> io::Result<()> {
        let header = self.styles.err(self.styles.bold("--- Failed steps:\n\n"));
        self.output.write_str(header)?;
        for (scenario, index, error) in suite.failed_steps() {
            let pickle = &scenario.pickle;
            let step = &pickle.steps[index];
            let scenario_line = format!(
                "  {}: {} # {}",
                pickle.keyword,
                pickle.name,
                pickle.source_ref(),
            );
            let step_line = format!(
                "    {} {} # {}",
                step.keyword,
                step.text,
                feature::source_ref(pickle.path.as_deref(), step.line),
            );
            let error_line = format!("      Error: {error}\n");
            for line in [scenario_line, step_line, error_line] {
                let line = self.styles.err(line);
                self.output.write_line(line)?;
            }
        }
        self.output.write_str("\n")
    }

    /// Formats `num` of items, pluralizing the `singular` noun if needed.
    fn maybe_plural(
        &self,
        singular: impl Into<Cow<'static, str>>,
        num: usize,
    ) -> Cow<'static, str> {
        self.styles.bold(format!(
            "{num} {}{}",
            singular.into(),
            if num == 1 { "" } else { "s" },
        ))
    }

    /// Formats non-zero counts of the given [`Stats`].
    fn format_stats(&self, stats: Stats) -> Cow<'static, str> {
        let formatted = stats
            .non_zero()
            .map(|(st, n)| self.styles.status(st, format!("{n} {st}")))
            .join(", ");
        if formatted.is_empty() {
            "".into()
        } else {
            format!(" ({formatted})").into()
        }
    }
}

impl<Out: io::Write> Writer for Progress<Out> {
    fn handle_event(&mut self, event: &event::Cucumber) {
        let res = match event {
            event::Cucumber::Step { result, .. } => self.step(result.status),
            event::Cucumber::Finished(suite) => self.finish(suite),
            event::Cucumber::Started { .. } | event::Cucumber::Scenario(_) => {
                Ok(())
            }
        };
        if let Err(e) = res {
            panic!("Failed to write into terminal: {e}");
        }
    }
}

/// Formats the `elapsed` time with millisecond precision.
fn format_elapsed(elapsed: Duration) -> String {
    let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    humantime::format_duration(Duration::from_millis(millis)).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::StepResult;

    fn progress() -> Progress<Vec<u8>> {
        Progress::new(Vec::new()).with_coloring(Coloring::Never)
    }

    fn step(status: Status) -> event::Cucumber {
        event::Cucumber::Step {
            scenario: 0,
            index: 0,
            result: StepResult::new(status),
        }
    }

    #[test]
    fn writes_symbols_in_rows() {
        let mut writer = progress().steps_per_row(3);

        for s in [
            Status::Passed,
            Status::Failed,
            Status::Pending,
            Status::Undefined,
            Status::Skipped,
        ] {
            writer.handle_event(&step(s));
        }

        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out, ".FP 3\nU-");
    }

    #[test]
    fn pads_last_row_counter() {
        let mut writer = progress().steps_per_row(3);
        for _ in 0..4 {
            writer.handle_event(&step(Status::Passed));
        }

        writer.handle_event(&event::Cucumber::Finished(SuiteResult::new(
            vec![],
            Duration::ZERO,
        )));

        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert!(out.starts_with("... 3\n.   4\n\n\n"), "{out:?}");
    }

    #[test]
    fn summarizes_empty_suite() {
        let mut writer = progress();

        writer.handle_event(&event::Cucumber::Finished(SuiteResult::new(
            vec![],
            Duration::from_micros(1500),
        )));

        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out, "\n\n0 scenarios\n0 steps\n1ms\n");
    }

    #[test]
    fn formats_elapsed_with_millis() {
        assert_eq!(format_elapsed(Duration::ZERO), "0s");
        assert_eq!(
            format_elapsed(Duration::from_micros(2_345_678)),
            "2s 345ms",
        );
    }
}

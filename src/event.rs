// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Results of an execution and events streamed while producing them.
//!
//! The top-level enum here is [`Cucumber`].

use std::{sync::Arc, time::Duration};

use derive_more::with_trait::{Display, Error, From};
use linked_hash_map::LinkedHashMap;

use crate::{
    feature::Pickle,
    panic_trap::PanicDetails,
    step::{self, ParamKind},
    writer::Stats,
};

/// Top-level event of an execution.
#[derive(Clone, Debug)]
pub enum Cucumber {
    /// Execution started.
    Started {
        /// Total number of scenarios going to be executed.
        scenarios: usize,
    },

    /// Top-level step of a scenario finished.
    Step {
        /// Document index of the scenario.
        scenario: usize,

        /// Index of the step inside its scenario.
        index: usize,

        /// Result of the step.
        result: StepResult,
    },

    /// Scenario finished.
    Scenario(ScenarioResult),

    /// Execution finished.
    Finished(SuiteResult),
}

/// Resolved status of a step or a scenario.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Status {
    /// Executed successfully.
    #[display("passed")]
    Passed,

    /// Executed with an error.
    #[display("failed")]
    Failed,

    /// Reported as not implemented yet.
    #[display("pending")]
    Pending,

    /// No step definition matched.
    #[display("undefined")]
    Undefined,

    /// Not executed because of a preceding failed or pending step.
    #[display("skipped")]
    Skipped,
}

impl Status {
    /// Returns the symbol of this [`Status`] in progress output.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Passed => '.',
            Self::Failed => 'F',
            Self::Pending => 'P',
            Self::Undefined => 'U',
            Self::Skipped => '-',
        }
    }

    /// Indicates whether a scenario stops executing its steps after a step of
    /// this [`Status`].
    #[must_use]
    pub const fn halts(self) -> bool {
        matches!(self, Self::Failed | Self::Pending)
    }

    /// Combines the given [`Status`]es by precedence:
    /// failed > pending > undefined > passed.
    ///
    /// [`Status::Skipped`] ones don't contribute.
    #[must_use]
    pub fn aggregate(statuses: impl IntoIterator<Item = Self>) -> Self {
        statuses
            .into_iter()
            .fold(Self::Passed, |acc, s| {
                if s.rank() > acc.rank() {
                    s
                } else {
                    acc
                }
            })
    }

    const fn rank(self) -> u8 {
        match self {
            Self::Passed | Self::Skipped => 0,
            Self::Undefined => 1,
            Self::Pending => 2,
            Self::Failed => 3,
        }
    }
}

/// Step text no definition matched.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Undefined {
    /// Text of the step.
    pub text: String,

    /// Kind of the body the step carries, if any.
    pub body: Option<ParamKind>,
}

impl Undefined {
    /// Creates a new [`Undefined`] step text without a body.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), body: None }
    }
}

/// Reason of a step failure.
#[derive(Clone, Debug, Display, Error, From)]
pub enum StepErrorKind {
    /// Step text matches several step definitions.
    #[display("Step match is ambiguous: {_0}")]
    Ambiguous(step::AmbiguousMatchError),

    /// Step arguments cannot be bound to the handler parameters.
    #[display("{_0}")]
    Bind(step::BindError),

    /// Handler reported a failure.
    #[display("{_0}")]
    #[from(ignore)]
    Failed(#[error(not(source))] String),

    /// Handler panicked.
    #[display("{_0}")]
    Panicked(#[error(not(source))] PanicDetails),

    /// Nested step text spans several lines.
    #[display(
        "nested steps cannot be multiline and have table or content body \
         argument"
    )]
    #[from(ignore)]
    MultilineNested,

    /// Nested steps expand deeper than allowed.
    #[display("nested steps exceed the maximum depth of {_0}")]
    #[from(ignore)]
    DepthExceeded(#[error(not(source))] usize),
}

/// Error of executing a step, with the texts of the nested steps leading to
/// it.
#[derive(Clone, Debug, Error)]
pub struct StepError {
    /// Texts of the enclosing steps, outermost first.
    ///
    /// Empty for errors of top-level steps themselves.
    pub chain: Vec<String>,

    /// Reason of the failure.
    #[error(source)]
    pub kind: StepErrorKind,
}

impl StepError {
    /// Creates a new [`StepError`] of a top-level step.
    #[must_use]
    pub fn new(kind: impl Into<StepErrorKind>) -> Self {
        Self { chain: Vec::new(), kind: kind.into() }
    }

    /// Prefixes the [`chain`](StepError::chain) with the `text` of an
    /// enclosing step.
    #[must_use]
    pub fn within(mut self, text: impl Into<String>) -> Self {
        self.chain.insert(0, text.into());
        self
    }
}

impl std::fmt::Display for StepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !matches!(self.kind, StepErrorKind::MultilineNested) {
            for text in &self.chain {
                write!(f, "{text}: ")?;
            }
        }
        write!(f, "{}", self.kind)
    }
}

/// Result of a single top-level step.
#[derive(Clone, Debug)]
pub struct StepResult {
    /// Resolved [`Status`] of the step.
    pub status: Status,

    /// Error of a [`Status::Failed`] step.
    pub error: Option<StepError>,

    /// Location of the matched step definition, if any.
    pub definition: Option<step::Location>,

    /// Undefined texts met while executing the step, including its own text.
    pub undefined: Vec<Undefined>,

    /// Time the step took.
    pub duration: Duration,
}

impl StepResult {
    /// Creates a new [`StepResult`] of the given [`Status`].
    #[must_use]
    pub const fn new(status: Status) -> Self {
        Self {
            status,
            error: None,
            definition: None,
            undefined: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Creates a new [`Status::Failed`] [`StepResult`].
    #[must_use]
    pub fn failed(error: StepError) -> Self {
        Self { error: Some(error), ..Self::new(Status::Failed) }
    }

    /// Creates a new [`Status::Skipped`] [`StepResult`].
    #[must_use]
    pub const fn skipped() -> Self {
        Self::new(Status::Skipped)
    }
}

/// Result of a single scenario.
#[derive(Clone, Debug)]
pub struct ScenarioResult {
    /// Document index of the scenario inside the whole suite.
    pub index: usize,

    /// Index of the feature the scenario belongs to.
    pub feature: usize,

    /// Executed scenario.
    pub pickle: Arc<Pickle>,

    /// Results of the scenario steps, in order.
    pub steps: Vec<StepResult>,
}

impl ScenarioResult {
    /// Returns the [`Status`] of this scenario: failed if any step failed,
    /// then pending, then undefined, otherwise passed.
    #[must_use]
    pub fn status(&self) -> Status {
        Status::aggregate(self.steps.iter().map(|s| s.status))
    }
}

/// Result of a whole execution.
#[derive(Clone, Debug)]
pub struct SuiteResult {
    /// Results of all the scenarios, in document order.
    pub scenarios: Vec<ScenarioResult>,

    /// Counts of scenarios per [`Status`].
    pub scenario_stats: Stats,

    /// Counts of top-level steps per [`Status`].
    pub step_stats: Stats,

    /// Distinct undefined step texts, in first-seen document order.
    pub undefined: Vec<Undefined>,

    /// Wall clock time of the execution.
    pub elapsed: Duration,
}

impl SuiteResult {
    /// Aggregates the given document-ordered [`ScenarioResult`]s.
    #[must_use]
    pub fn new(scenarios: Vec<ScenarioResult>, elapsed: Duration) -> Self {
        let scenario_stats =
            scenarios.iter().map(ScenarioResult::status).collect();
        let step_stats = scenarios
            .iter()
            .flat_map(|sc| sc.steps.iter().map(|s| s.status))
            .collect();

        // The first occurrence of a text decides its body kind.
        let undefined = {
            let mut seen = LinkedHashMap::<&str, &Undefined>::new();
            for u in scenarios
                .iter()
                .flat_map(|sc| &sc.steps)
                .flat_map(|s| &s.undefined)
            {
                if !seen.contains_key(u.text.as_str()) {
                    _ = seen.insert(&u.text, u);
                }
            }
            seen.values().map(|u| (*u).clone()).collect::<Vec<_>>()
        };

        Self {
            scenarios,
            scenario_stats,
            step_stats,
            undefined,
            elapsed,
        }
    }

    /// Indicates whether at least one step failed.
    ///
    /// Pending and undefined steps don't fail an execution.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        self.step_stats.failed > 0
    }

    /// Iterates over the failed steps, in document order.
    pub fn failed_steps(
        &self,
    ) -> impl Iterator<Item = (&ScenarioResult, usize, &StepError)> {
        self.scenarios.iter().flat_map(|sc| {
            sc.steps.iter().enumerate().filter_map(move |(i, s)| {
                s.error.as_ref().map(|e| (sc, i, e))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(index: usize, statuses: &[Status]) -> ScenarioResult {
        ScenarioResult {
            index,
            feature: 0,
            pickle: Arc::new(Pickle {
                keyword: "Scenario".into(),
                name: format!("scenario {index}"),
                line: index + 1,
                path: None,
                tags: vec![],
                steps: vec![],
            }),
            steps: statuses.iter().copied().map(StepResult::new).collect(),
        }
    }

    #[test]
    fn aggregates_status_by_precedence() {
        use Status::*;

        assert_eq!(Status::aggregate([]), Passed);
        assert_eq!(Status::aggregate([Passed, Undefined, Passed]), Undefined);
        assert_eq!(Status::aggregate([Undefined, Pending, Skipped]), Pending);
        assert_eq!(Status::aggregate([Pending, Failed, Undefined]), Failed);
        assert_eq!(Status::aggregate([Passed, Skipped]), Passed);
    }

    #[test]
    fn chains_nested_error_messages() {
        let err = StepError::new(StepErrorKind::Failed("errored".into()))
            .within("sub-sub")
            .within("sub2")
            .within("two");

        assert_eq!(err.to_string(), "two: sub2: sub-sub: errored");
    }

    #[test]
    fn multiline_conflict_is_not_chained() {
        let err = StepError::new(StepErrorKind::MultilineNested).within("outer");

        assert_eq!(
            err.to_string(),
            "nested steps cannot be multiline and have table or content body \
             argument",
        );
    }

    #[test]
    fn panics_display_location() {
        let err = StepError::new(PanicDetails {
            payload: "boom".into(),
            location: "steps.rs:1:2".into(),
        });

        assert_eq!(err.to_string(), "panicked at steps.rs:1:2: boom");
    }

    #[test]
    fn only_failed_steps_fail_suite() {
        let ok = SuiteResult::new(
            vec![
                scenario(0, &[Status::Passed, Status::Pending, Status::Skipped]),
                scenario(1, &[Status::Undefined, Status::Passed]),
            ],
            Duration::ZERO,
        );
        assert!(!ok.is_failed());
        assert_eq!(ok.scenario_stats.pending, 1);
        assert_eq!(ok.scenario_stats.undefined, 1);
        assert_eq!(ok.step_stats.total(), 5);

        let failed = SuiteResult::new(
            vec![scenario(0, &[Status::Passed, Status::Failed])],
            Duration::ZERO,
        );
        assert!(failed.is_failed());
        assert_eq!(failed.scenario_stats.failed, 1);
    }

    #[test]
    fn deduplicates_undefined_in_first_seen_order() {
        let mut first = scenario(0, &[Status::Undefined, Status::Undefined]);
        first.steps[0].undefined = vec![Undefined::new("b"), Undefined::new("a")];
        first.steps[1].undefined = vec![Undefined::new("b")];
        let mut second = scenario(1, &[Status::Undefined]);
        second.steps[0].undefined = vec![Undefined::new("c"), Undefined::new("a")];

        let suite = SuiteResult::new(vec![first, second], Duration::ZERO);

        let texts =
            suite.undefined.iter().map(|u| u.text.as_str()).collect::<Vec<_>>();
        assert_eq!(texts, ["b", "a", "c"]);
    }
}

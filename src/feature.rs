// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Parsed [`Feature`]s and [`Pickle`]s compiled from them.
//!
//! A [`Pickle`] is a concrete scenario ready for execution: [`Background`]
//! steps are prepended, [`Rule`]s are flattened and [`Scenario Outline`][1]
//! [`Examples`] are expanded.
//!
//! [`Background`]: gherkin::Background
//! [`Examples`]: gherkin::Examples
//! [`Rule`]: gherkin::Rule
//! [1]: https://cucumber.io/docs/gherkin/reference#scenario-outline

use std::{
    env, fmt, iter, mem,
    path::{Path, PathBuf},
};

use derive_more::with_trait::Error;
use lazy_regex::regex;
use sealed::sealed;

use crate::step::Table;

/// Source document of scenarios: a parsed [`gherkin::Feature`] together with
/// its path and raw text.
#[derive(Clone, Debug)]
pub struct Feature {
    /// Path to the `.feature` file, if any.
    pub path: Option<PathBuf>,

    /// Raw text the [`Feature`] was parsed from.
    pub content: String,

    /// Parsed document.
    pub document: gherkin::Feature,
}

impl Feature {
    /// Wraps an already parsed `document`.
    #[must_use]
    pub fn new(
        path: Option<PathBuf>,
        content: impl Into<String>,
        document: gherkin::Feature,
    ) -> Self {
        Self { path, content: content.into(), document }
    }

    /// Parses the `content` of a `.feature` file located at `path`.
    ///
    /// # Errors
    ///
    /// If the `content` is not a valid Gherkin document.
    pub fn parse(
        path: impl Into<PathBuf>,
        content: impl Into<String>,
    ) -> Result<Self, gherkin::ParseError> {
        let path = path.into();
        let content = content.into();
        let mut document =
            gherkin::Feature::parse(&content, gherkin::GherkinEnv::default())?;
        document.path = Some(path.clone());
        Ok(Self::new(Some(path), content, document))
    }

    /// Returns the name of this [`Feature`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.document.name
    }

    /// Returns the text of the given 1-based source `line`, if any.
    #[must_use]
    pub fn source_line(&self, line: usize) -> Option<&str> {
        line.checked_sub(1).and_then(|n| self.content.lines().nth(n))
    }

    /// Compiles this [`Feature`] into [`Pickle`]s, in document order.
    ///
    /// # Errors
    ///
    /// If [`Examples`] of a [`Scenario Outline`][1] cannot be expanded.
    ///
    /// [`Examples`]: gherkin::Examples
    /// [1]: https://cucumber.io/docs/gherkin/reference#scenario-outline
    pub fn pickles(&self) -> Result<Vec<Pickle>, ExpandExamplesError> {
        let document = self.document.clone().expand_examples()?;
        let background = document.background.as_ref();

        let mut scenarios = document
            .scenarios
            .iter()
            .map(|s| (s, None))
            .chain(document.rules.iter().flat_map(|r| {
                r.scenarios.iter().map(move |s| (s, r.background.as_ref()))
            }))
            .collect::<Vec<_>>();
        scenarios.sort_by_key(|(s, _)| s.position.line);

        Ok(scenarios
            .into_iter()
            .map(|(scenario, rule_background)| Pickle {
                keyword: scenario.keyword.trim().to_owned(),
                name: scenario.name.clone(),
                line: scenario.position.line,
                path: self.path.clone(),
                tags: scenario.tags.clone(),
                steps: background
                    .into_iter()
                    .chain(rule_background)
                    .flat_map(|bg| &bg.steps)
                    .chain(&scenario.steps)
                    .map(PickleStep::from)
                    .collect(),
            })
            .collect())
    }
}

/// Concrete scenario ready for execution.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pickle {
    /// Keyword of the scenario, like `Scenario` or `Scenario Outline`.
    pub keyword: String,

    /// Name of the scenario.
    pub name: String,

    /// Source line of the scenario.
    pub line: usize,

    /// Path to the `.feature` file containing the scenario, if any.
    pub path: Option<PathBuf>,

    /// Tags of the scenario.
    pub tags: Vec<String>,

    /// Steps to execute, background ones first.
    pub steps: Vec<PickleStep>,
}

impl Pickle {
    /// Returns the `path:line` reference of this [`Pickle`] for diagnostics.
    #[must_use]
    pub fn source_ref(&self) -> String {
        source_ref(self.path.as_deref(), self.line)
    }
}

/// Single step of a [`Pickle`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PickleStep {
    /// Keyword of the step, like `Given` or `And`.
    pub keyword: String,

    /// Text of the step, matched against step definitions.
    pub text: String,

    /// Optional body argument of the step.
    pub body: Body,

    /// Source line of the step.
    pub line: usize,
}

impl PickleStep {
    /// Creates a new [`PickleStep`] without a body.
    #[must_use]
    pub fn new(
        keyword: impl Into<String>,
        text: impl Into<String>,
        line: usize,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            text: text.into(),
            body: Body::None,
            line,
        }
    }
}

impl From<&gherkin::Step> for PickleStep {
    fn from(step: &gherkin::Step) -> Self {
        let body = match (&step.docstring, &step.table) {
            (Some(doc), _) => Body::DocString(doc_string_content(doc)),
            (None, Some(table)) => Body::Table(table.into()),
            (None, None) => Body::None,
        };
        Self {
            keyword: step.keyword.trim().to_owned(),
            text: step.value.clone(),
            body,
            line: step.position.line,
        }
    }
}

/// Strips the line breaks surrounding the content of a doc-string, kept by
/// the parser.
fn doc_string_content(raw: &str) -> String {
    let content = raw.strip_prefix('\n').unwrap_or(raw);
    content.strip_suffix('\n').unwrap_or(content).to_owned()
}

/// Body argument of a step.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Body {
    /// No body.
    #[default]
    None,

    /// Doc-string body.
    DocString(String),

    /// Data table body.
    Table(Table),
}

/// Formats a `path:line` reference, with the `path` relative to the current
/// directory when possible.
#[must_use]
pub fn source_ref(path: Option<&Path>, line: usize) -> String {
    let path = path.map(display_path).unwrap_or_default();
    format!("{path}:{line}")
}

fn display_path(path: &Path) -> String {
    env::current_dir()
        .ok()
        .and_then(|dir| path.strip_prefix(dir).ok())
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Helper methods to operate on [`gherkin::Feature`]s.
#[sealed]
pub trait Ext: Sized {
    /// Expands [`Scenario Outline`][1] [`Examples`][2].
    ///
    /// Every row of every [`Examples`][2] table becomes a separate scenario,
    /// with `<placeholder>`s in its name, step texts, doc-strings and tables
    /// replaced by the row values. Expanded scenarios keep the position of
    /// the outline.
    ///
    /// # Errors
    ///
    /// If a placeholder has no corresponding [`Examples`][2] column.
    ///
    /// [1]: https://cucumber.io/docs/gherkin/reference#scenario-outline
    /// [2]: https://cucumber.io/docs/gherkin/reference#examples
    fn expand_examples(self) -> Result<Self, ExpandExamplesError>;

    /// Counts all the [`Feature`]'s [`Scenario`]s, including [`Rule`]s inside.
    ///
    /// [`Feature`]: gherkin::Feature
    /// [`Rule`]: gherkin::Rule
    /// [`Scenario`]: gherkin::Scenario
    #[must_use]
    fn count_scenarios(&self) -> usize;
}

#[sealed]
impl Ext for gherkin::Feature {
    fn expand_examples(mut self) -> Result<Self, ExpandExamplesError> {
        let path = self.path.clone();
        let expand = |scenarios: Vec<gherkin::Scenario>| -> Result<_, _> {
            scenarios
                .into_iter()
                .flat_map(|s| expand_scenario(s, path.as_ref()))
                .collect()
        };

        for r in &mut self.rules {
            r.scenarios = expand(mem::take(&mut r.scenarios))?;
        }
        self.scenarios = expand(mem::take(&mut self.scenarios))?;

        Ok(self)
    }

    fn count_scenarios(&self) -> usize {
        self.scenarios.len()
            + self.rules.iter().map(|r| r.scenarios.len()).sum::<usize>()
    }
}

/// Expands [`Scenario`] [`Examples`], if any.
///
/// [`Examples`]: gherkin::Examples
/// [`Scenario`]: gherkin::Scenario
fn expand_scenario(
    scenario: gherkin::Scenario,
    path: Option<&PathBuf>,
) -> Vec<Result<gherkin::Scenario, ExpandExamplesError>> {
    if scenario.examples.is_empty() {
        return vec![Ok(scenario)];
    }

    scenario
        .examples
        .iter()
        .filter_map(|ex| {
            ex.table.as_ref()?.rows.split_first().map(|(h, v)| (h, v, ex))
        })
        .flat_map(|(header, vals, example)| {
            vals.iter()
                .map(move |v| header.iter().zip(v))
                .zip(iter::repeat(example.tags.iter()))
        })
        .map(|(row, tags)| {
            let replace_templates = |str: &str, pos| {
                let mut err = None;
                let replaced = regex!(r"<([^>\s]+)>")
                    .replace_all(str, |cap: &regex::Captures<'_>| {
                        let name = &cap[1];
                        row.clone()
                            .find_map(|(k, v)| (name == k).then_some(v.as_str()))
                            .unwrap_or_else(|| {
                                err = Some(ExpandExamplesError {
                                    pos,
                                    name: name.to_owned(),
                                    path: path.cloned(),
                                });
                                ""
                            })
                    })
                    .into_owned();

                err.map_or_else(|| Ok(replaced), Err)
            };

            let mut expanded = scenario.clone();
            expanded.examples.clear();
            expanded.tags.extend(tags.cloned());

            expanded.name =
                replace_templates(&expanded.name, expanded.position)?;
            for s in &mut expanded.steps {
                for value in iter::once(&mut s.value)
                    .chain(s.docstring.iter_mut())
                    .chain(s.table.iter_mut().flat_map(|t| {
                        t.rows.iter_mut().flat_map(|r| r.iter_mut())
                    }))
                {
                    *value = replace_templates(value, s.position)?;
                }
            }

            Ok(expanded)
        })
        .collect()
}

/// Error of [`Scenario Outline`][1] expansion encountering an unknown template.
///
/// [1]: https://cucumber.io/docs/gherkin/reference#scenario-outline
#[derive(Clone, Debug, Error)]
pub struct ExpandExamplesError {
    /// Position of the unknown template.
    pub pos: gherkin::LineCol,

    /// Name of the unknown template.
    pub name: String,

    /// [`Path`] to the `.feature` file, if present.
    pub path: Option<PathBuf>,
}

impl fmt::Display for ExpandExamplesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to resolve <{}> at {}:{}",
            self.name,
            source_ref(self.path.as_deref(), self.pos.line),
            self.pos.col,
        )
    }
}

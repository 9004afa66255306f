// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Stub step definitions for undefined steps.
//!
//! Every undefined text becomes a [`Snippet`]: quoted substrings turn into
//! [`String`] parameters, bare digit runs into [`i64`] ones, and the rest of
//! the text into an escaped literal pattern and a function name.

use std::{collections::HashSet, fmt::Write as _};

use itertools::Itertools as _;

use crate::{event::Undefined, step::ParamKind};

/// Pattern capturing a quoted substring.
const QUOTED: &str = r#""([^"]*)""#;

/// Pattern capturing a run of digits.
const NUMBER: &str = r"(\d+)";

/// Reserved words which cannot be used as function names.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const",
    "continue", "crate", "do", "dyn", "else", "enum", "extern", "false",
    "final", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "macro",
    "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Stub step definition of a single undefined step text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Snippet {
    /// Name of the stub function.
    pub name: String,

    /// Anchored pattern matching the original text.
    pub pattern: String,

    /// Kinds of the function parameters, following the `World` one.
    pub params: Vec<ParamKind>,
}

impl Snippet {
    /// Renders the stub function of this [`Snippet`].
    #[must_use]
    pub fn definition(&self, world: &str) -> String {
        let mut arg = 0;
        let params = self
            .params
            .iter()
            .map(|kind| match kind {
                ParamKind::String => {
                    arg += 1;
                    format!(", arg{arg}: String")
                }
                ParamKind::Int => {
                    arg += 1;
                    format!(", arg{arg}: i64")
                }
                ParamKind::Float => {
                    arg += 1;
                    format!(", arg{arg}: f64")
                }
                ParamKind::DocString => ", doc: DocString".to_owned(),
                ParamKind::Table => ", table: Table".to_owned(),
            })
            .join("");

        format!(
            "fn {}(world: &mut {world}{params}) -> Outcome {{\n    \
                 Outcome::Pending\n\
             }}",
            self.name,
        )
    }

    /// Renders the registration statement of this [`Snippet`].
    #[must_use]
    pub fn registration(&self) -> String {
        let hashes = "#".repeat(raw_hashes(&self.pattern));
        format!(
            "steps.step(r{hashes}\"{}\"{hashes}, {})?;",
            self.pattern, self.name,
        )
    }
}

/// Generator of [`Snippet`]s.
#[derive(Clone, Debug)]
pub struct Generator {
    world: String,
}

impl Default for Generator {
    fn default() -> Self {
        Self { world: "World".to_owned() }
    }
}

impl Generator {
    /// Creates a new [`Generator`] naming the world type `World`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name of the world type used in generated code.
    #[must_use]
    pub fn world(mut self, name: impl Into<String>) -> Self {
        self.world = name.into();
        self
    }

    /// Generates [`Snippet`]s for the given undefined texts, preserving their
    /// order.
    ///
    /// Texts resolving into the same pattern (like ones differing only in
    /// their numbers) produce a single [`Snippet`]. Distinct patterns
    /// resolving into the same function name get numeric suffixes: `_2`,
    /// `_3`, etc.
    #[must_use]
    pub fn generate(&self, undefined: &[Undefined]) -> Vec<Snippet> {
        let mut patterns = HashSet::new();
        let mut names = HashSet::new();
        let mut unnamed = 0;

        undefined
            .iter()
            .filter_map(|u| {
                let (pattern, mut params, words) = parse(&u.text);
                params.extend(u.body);
                patterns
                    .insert(pattern.clone())
                    .then_some((pattern, params, words))
            })
            .map(|(pattern, params, words)| {
                let base = if words.is_empty() {
                    unnamed += 1;
                    format!("step_definition_{unnamed}")
                } else if KEYWORDS.contains(&words.as_str()) {
                    format!("{words}_")
                } else {
                    words
                };
                let mut name = base.clone();
                let mut suffix = 1;
                while !names.insert(name.clone()) {
                    suffix += 1;
                    name = format!("{base}_{suffix}");
                }

                Snippet { name, pattern, params }
            })
            .collect()
    }

    /// Renders the given [`Snippet`]s followed by a registration function
    /// listing every one of them, each block followed by a blank line.
    #[must_use]
    pub fn render(&self, snippets: &[Snippet]) -> String {
        let mut out = String::new();
        for s in snippets {
            _ = writeln!(out, "{}\n", s.definition(&self.world));
        }
        _ = writeln!(
            out,
            "fn register_steps(\n    \
                 steps: &mut Collection<{}>,\n\
             ) -> Result<(), RegistrationError> {{",
            self.world,
        );
        for s in snippets {
            _ = writeln!(out, "    {}", s.registration());
        }
        out.push_str("    Ok(())\n}\n\n");
        out
    }
}

/// Splits the `text` into its anchored pattern, captured parameter kinds and
/// a snake_case name built of the remaining words.
fn parse(text: &str) -> (String, Vec<ParamKind>, String) {
    let mut pattern = String::from("^");
    let mut params = Vec::new();
    let mut words = String::new();
    let mut literal = String::new();

    fn flush(literal: &mut String, pattern: &mut String) {
        pattern.push_str(&regex::escape(literal));
        literal.clear();
    }

    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if c == '"' {
            if let Some(end) = rest[1..].find('"') {
                flush(&mut literal, &mut pattern);
                pattern.push_str(QUOTED);
                params.push(ParamKind::String);
                words.push(' ');
                rest = &rest[end + 2..];
                continue;
            }
        }
        if c.is_ascii_digit() {
            let end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            flush(&mut literal, &mut pattern);
            pattern.push_str(NUMBER);
            // Digit runs overflowing `i64` are bound as text.
            params.push(if rest[..end].parse::<i64>().is_ok() {
                ParamKind::Int
            } else {
                ParamKind::String
            });
            words.push(' ');
            rest = &rest[end..];
            continue;
        }

        literal.push(c);
        words.push(if c.is_ascii_alphabetic() || c == '_' { c } else { ' ' });
        rest = &rest[c.len_utf8()..];
    }
    flush(&mut literal, &mut pattern);
    pattern.push('$');

    let name = words
        .split(|c: char| c == ' ' || c == '_')
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_lowercase)
        .join("_");
    (pattern, params, name)
}

/// Returns the number of `#`s a raw string literal needs to contain `s`.
fn raw_hashes(s: &str) -> usize {
    s.split('"')
        .skip(1)
        .map(|after| after.chars().take_while(|c| *c == '#').count() + 1)
        .max()
        .unwrap_or(0)
        .max(1)
}

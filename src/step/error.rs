// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors of registering and matching [`Definition`]s.
//!
//! [`Definition`]: super::Definition

use std::fmt;

use derive_more::with_trait::{Display, Error};

use super::{location::Location, param::ParamKind, regex::AnchoredRegex};

/// Error of a step text matching multiple [`Definition`]s inside a
/// [`Collection`].
///
/// [`Collection`]: super::Collection
/// [`Definition`]: super::Definition
#[derive(Clone, Debug, Error)]
pub struct AmbiguousMatchError {
    /// Patterns the step text matches, in registration order.
    pub possible_matches: Vec<(AnchoredRegex, Location)>,
}

impl fmt::Display for AmbiguousMatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Possible matches:")?;
        for (re, loc) in &self.possible_matches {
            write!(f, "\n{re} --> {loc}")?;
        }
        Ok(())
    }
}

/// Error of registering a [`Definition`] in a [`Collection`].
///
/// [`Collection`]: super::Collection
/// [`Definition`]: super::Definition
#[derive(Debug, Display, Error)]
pub enum RegistrationError {
    /// Pattern is not a valid regular expression.
    #[display("`{pattern}` is not a valid regular expression: {source}")]
    InvalidPattern {
        /// Registered pattern.
        pattern: String,

        /// Compilation error.
        source: regex::Error,
    },

    /// Number of capturing groups doesn't match the number of the handler's
    /// captured parameters.
    #[display(
        "`{pattern}` has {captures} capturing groups, but its handler at \
         {location} expects {expected} captured arguments"
    )]
    ArityMismatch {
        /// Registered pattern.
        pattern: String,

        /// Number of capturing groups in the pattern.
        captures: usize,

        /// Number of captured parameters of the handler.
        expected: usize,

        /// Where the handler was registered.
        location: Location,
    },

    /// Handler declares a body parameter anywhere but last, or more than one.
    #[display(
        "handler of `{pattern}` at {location} must declare at most one {kind} \
         parameter, and only as the last one"
    )]
    MisplacedBody {
        /// Registered pattern.
        pattern: String,

        /// Offending body [`ParamKind`].
        kind: ParamKind,

        /// Where the handler was registered.
        location: Location,
    },

    /// The very same pattern is registered already.
    #[display("`{pattern}` is registered twice: at {first} and at {second}")]
    Duplicate {
        /// Registered pattern.
        pattern: String,

        /// Where the pattern was registered first.
        first: Location,

        /// Where the pattern was registered again.
        second: Location,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_match_lists_candidates() {
        let err = AmbiguousMatchError {
            possible_matches: vec![
                (
                    AnchoredRegex::new(r"I have (\d+) cucumbers").unwrap(),
                    Location::new("src/steps.rs", 10, 5),
                ),
                (
                    AnchoredRegex::new(r"I have .+").unwrap(),
                    Location::new("src/more_steps.rs", 20, 10),
                ),
            ],
        };

        assert_eq!(
            err.to_string(),
            "Possible matches:\n\
             I have (\\d+) cucumbers --> src/steps.rs:10:5\n\
             I have .+ --> src/more_steps.rs:20:10",
        );
    }

    #[test]
    fn arity_mismatch_names_pattern_and_location() {
        let err = RegistrationError::ArityMismatch {
            pattern: "^(t)wo$".into(),
            captures: 1,
            expected: 0,
            location: Location::new("tests/steps.rs", 3, 1),
        };

        assert_eq!(
            err.to_string(),
            "`^(t)wo$` has 1 capturing groups, but its handler at \
             tests/steps.rs:3:1 expects 0 captured arguments",
        );
    }
}

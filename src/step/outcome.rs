// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Results returned by step handlers.

use std::fmt::Display;

use derive_more::with_trait::{Deref, From};

/// Outcome of a single step handler invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Step passed.
    Passed,

    /// Step failed with the given message.
    Failed(String),

    /// Step is not implemented yet.
    Pending,

    /// Step expands into other steps, executed in its place.
    Nested(Steps),
}

/// Texts of nested steps returned by a step handler.
///
/// Each text is matched and executed exactly as a top-level step.
#[derive(Clone, Debug, Default, Deref, Eq, From, PartialEq)]
pub struct Steps(pub Vec<String>);

impl<'a> From<Vec<&'a str>> for Steps {
    fn from(texts: Vec<&'a str>) -> Self {
        texts.into_iter().collect()
    }
}

impl<'a, const N: usize> From<[&'a str; N]> for Steps {
    fn from(texts: [&'a str; N]) -> Self {
        texts.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Steps {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Conversion of a step handler's return value into an [`Outcome`].
pub trait IntoOutcome {
    /// Converts this value into an [`Outcome`].
    fn into_outcome(self) -> Outcome;
}

impl IntoOutcome for Outcome {
    fn into_outcome(self) -> Outcome {
        self
    }
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Outcome {
        Outcome::Passed
    }
}

impl IntoOutcome for Steps {
    fn into_outcome(self) -> Outcome {
        Outcome::Nested(self)
    }
}

impl<T: IntoOutcome, E: Display> IntoOutcome for Result<T, E> {
    fn into_outcome(self) -> Outcome {
        self.map_or_else(|e| Outcome::Failed(e.to_string()), T::into_outcome)
    }
}

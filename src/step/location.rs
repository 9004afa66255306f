// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Source location of a registered [`Definition`].
//!
//! [`Definition`]: super::Definition

use std::panic;

use derive_more::with_trait::{Debug, Display};

/// Location of a [`Collection::step()`] call registering a [`Definition`].
///
/// Captured automatically via `#[track_caller]`.
///
/// [`Collection::step()`]: super::Collection::step
/// [`Definition`]: super::Definition
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{path}:{line}:{column}")]
pub struct Location {
    /// Path to the file where the [`Definition`] was registered.
    ///
    /// [`Definition`]: super::Definition
    pub path: &'static str,

    /// Line of the file where the [`Definition`] was registered.
    ///
    /// [`Definition`]: super::Definition
    pub line: u32,

    /// Column of the file where the [`Definition`] was registered.
    ///
    /// [`Definition`]: super::Definition
    pub column: u32,
}

impl Location {
    /// Creates a new [`Location`] with the given path, line, and column.
    #[must_use]
    pub const fn new(path: &'static str, line: u32, column: u32) -> Self {
        Self { path, line, column }
    }

    /// Returns the [`Location`] of the caller of the function this is invoked
    /// in, following `#[track_caller]` annotations.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        panic::Location::caller().into()
    }
}

impl From<&'static panic::Location<'static>> for Location {
    fn from(loc: &'static panic::Location<'static>) -> Self {
        Self::new(loc.file(), loc.line(), loc.column())
    }
}

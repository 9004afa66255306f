// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Definitions for a [`Collection`] which is used to store step handlers and
//! corresponding [`Regex`] patterns.
//!
//! [`Regex`]: ::regex::Regex

pub mod collection;
pub mod error;
pub mod location;
pub mod outcome;
pub mod param;
pub mod regex;

pub use self::{
    collection::{Ambiguity, Collection, Definition, Handler, Match},
    error::{AmbiguousMatchError, RegistrationError},
    location::Location,
    outcome::{IntoOutcome, Outcome, Steps},
    param::{Argument, BindError, DocString, Param, ParamKind, Table},
    regex::AnchoredRegex,
};

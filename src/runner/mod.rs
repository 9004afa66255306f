// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for executing scenarios and their steps.
//!
//! # Order guarantees
//!
//! Steps of a single scenario are executed sequentially, on a single thread,
//! in order of declaration. Scenarios themselves may be executed
//! concurrently, so [`event::Cucumber::Step`]s of different scenarios may
//! interleave, while [`event::Cucumber::Scenario`] of a scenario always
//! follows all of its [`event::Cucumber::Step`]s. [`SuiteResult`] lists
//! scenarios in document order.
//!
//! [`event::Cucumber::Scenario`]: crate::event::Cucumber::Scenario
//! [`event::Cucumber::Step`]: crate::event::Cucumber::Step
//! [`SuiteResult`]: crate::event::SuiteResult

pub mod basic;
pub mod executor;
pub mod scenario;

#[doc(inline)]
pub use self::{
    basic::Basic,
    executor::{Executor, DEFAULT_MAX_NESTING_DEPTH},
    scenario::Scheduled,
};

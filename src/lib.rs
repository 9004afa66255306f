// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Synchronous [Cucumber] step execution engine.
//!
//! Steps of [Gherkin] scenarios are matched against a [`step::Collection`]
//! of regular expressions bound to handlers. A handler may pass, fail, be
//! pending or expand into further steps. Scenarios run on a bounded pool of
//! worker threads, and the whole execution is reported by a [`Writer`],
//! including stub definitions for the steps nothing matched.
//!
//! ```rust
//! use cucumber_engine::{step, writer, Cucumber, Feature, Outcome, Steps};
//!
//! #[derive(Debug, Default)]
//! struct Basket {
//!     cucumbers: u32,
//! }
//!
//! let mut steps = step::Collection::new();
//! steps
//!     .step(r"^I have (\d+) cucumbers$", |w: &mut Basket, n: u32| {
//!         w.cucumbers = n;
//!     })
//!     .unwrap()
//!     .step(r"^I eat (\d+) cucumbers$", |w: &mut Basket, n: u32| {
//!         match w.cucumbers.checked_sub(n) {
//!             Some(left) => {
//!                 w.cucumbers = left;
//!                 Outcome::Passed
//!             }
//!             None => Outcome::Failed("not enough cucumbers".into()),
//!         }
//!     })
//!     .unwrap()
//!     .step("^a snack$", |_: &mut Basket| {
//!         Steps::from(["I have 2 cucumbers", "I eat 1 cucumbers"])
//!     })
//!     .unwrap();
//!
//! let feature = Feature::parse(
//!     "eating.feature",
//!     "Feature: Eating\n  Scenario: snack\n    Given a snack\n",
//! )
//! .unwrap();
//!
//! let suite = Cucumber::new(steps)
//!     .with_writer(writer::Discard)
//!     .run(&[feature])
//!     .unwrap();
//! assert!(!suite.is_failed());
//! ```
//!
//! [Cucumber]: https://cucumber.io
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

#![deny(nonstandard_style, trivial_casts, trivial_numeric_casts)]
#![forbid(non_ascii_idents, unsafe_code)]
#![warn(
    clippy::as_conversions,
    clippy::dbg_macro,
    clippy::expect_used,
    clippy::str_to_string,
    clippy::todo,
    clippy::unwrap_used,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_results
)]
#![cfg_attr(test, allow(clippy::unwrap_used, unused_results))]

pub mod cli;
pub mod cucumber;
pub mod event;
pub mod feature;
pub mod panic_trap;
pub mod parser;
pub mod runner;
pub mod snippet;
pub mod step;
pub mod writer;

pub use gherkin;

#[doc(inline)]
pub use self::{
    cucumber::Cucumber,
    event::{Status, SuiteResult},
    feature::Feature,
    step::{DocString, Outcome, Steps, Table},
    writer::Writer,
};

// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for outputting [`Cucumber`] events.
//!
//! [`Cucumber`]: crate::event::Cucumber

pub mod out;
pub mod progress;
pub mod stats;

use std::str::FromStr;

use crate::event;

#[doc(inline)]
pub use self::{progress::Progress, stats::Stats};

/// Writer of [`Cucumber`] events to some output.
///
/// Events are handed to a [`Writer`] on a single thread, in the order they
/// were received from the running scenarios.
///
/// [`Cucumber`]: crate::event::Cucumber
pub trait Writer {
    /// Handles the given [`Cucumber`] event.
    ///
    /// [`Cucumber`]: crate::event::Cucumber
    fn handle_event(&mut self, event: &event::Cucumber);
}

impl<W: Writer + ?Sized> Writer for &mut W {
    fn handle_event(&mut self, event: &event::Cucumber) {
        (**self).handle_event(event);
    }
}

impl<W: Writer + ?Sized> Writer for Box<W> {
    fn handle_event(&mut self, event: &event::Cucumber) {
        (**self).handle_event(event);
    }
}

/// [`Writer`] ignoring all the events.
#[derive(Clone, Copy, Debug, Default)]
pub struct Discard;

impl Writer for Discard {
    fn handle_event(&mut self, _: &event::Cucumber) {}
}

/// Possible policies of a [`console`] output coloring.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Coloring {
    /// Letting [`console::colors_enabled()`] to decide, whether output should
    /// be colored.
    Auto,

    /// Forcing of a colored output.
    Always,

    /// Forcing of a non-colored output.
    Never,
}

impl FromStr for Coloring {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err("possible options: auto, always, never"),
        }
    }
}

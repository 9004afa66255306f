// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for writing output.

use std::{borrow::Cow, io};

use console::Style;

use crate::event::Status;

use super::Coloring;

/// [`Style`]s for terminal output.
#[derive(Clone, Debug)]
pub struct Styles {
    /// [`Style`] for rendering successful events.
    pub ok: Style,

    /// [`Style`] for rendering skipped events.
    pub skipped: Style,

    /// [`Style`] for rendering pending and undefined events.
    pub pending: Style,

    /// [`Style`] for rendering errors and failed events.
    pub err: Style,

    /// [`Style`] for rendering __bold__.
    pub bold: Style,

    /// Indicates whether the terminal was detected.
    pub is_present: bool,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            ok: Style::new().green(),
            skipped: Style::new().cyan(),
            pending: Style::new().yellow(),
            err: Style::new().red(),
            bold: Style::new().bold(),
            is_present: console::user_attended() && console::colors_enabled(),
        }
    }
}

impl Styles {
    /// Creates new [`Styles`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the given [`Coloring`] to these [`Styles`].
    pub fn apply_coloring(&mut self, color: Coloring) {
        match color {
            Coloring::Auto => {}
            Coloring::Always => self.is_present = true,
            Coloring::Never => self.is_present = false,
        }
    }

    /// If terminal is present colors `input` with [`Styles::ok`] color or
    /// leaves "as is" otherwise.
    #[must_use]
    pub fn ok(&self, input: impl Into<Cow<'static, str>>) -> Cow<'static, str> {
        self.apply(&self.ok, input)
    }

    /// If terminal is present colors `input` with [`Styles::skipped`] color or
    /// leaves "as is" otherwise.
    #[must_use]
    pub fn skipped(
        &self,
        input: impl Into<Cow<'static, str>>,
    ) -> Cow<'static, str> {
        self.apply(&self.skipped, input)
    }

    /// If terminal is present colors `input` with [`Styles::pending`] color or
    /// leaves "as is" otherwise.
    #[must_use]
    pub fn pending(
        &self,
        input: impl Into<Cow<'static, str>>,
    ) -> Cow<'static, str> {
        self.apply(&self.pending, input)
    }

    /// If terminal is present colors `input` with [`Styles::err`] color or
    /// leaves "as is" otherwise.
    #[must_use]
    pub fn err(
        &self,
        input: impl Into<Cow<'static, str>>,
    ) -> Cow<'static, str> {
        self.apply(&self.err, input)
    }

    /// If terminal is present makes `input` __bold__ or leaves "as is"
    /// otherwise.
    #[must_use]
    pub fn bold(
        &self,
        input: impl Into<Cow<'static, str>>,
    ) -> Cow<'static, str> {
        self.apply(&self.bold, input)
    }

    /// Colors `input` according to the given [`Status`].
    #[must_use]
    pub fn status(
        &self,
        status: Status,
        input: impl Into<Cow<'static, str>>,
    ) -> Cow<'static, str> {
        match status {
            Status::Passed => self.ok(input),
            Status::Failed => self.err(input),
            Status::Pending | Status::Undefined => self.pending(input),
            Status::Skipped => self.skipped(input),
        }
    }

    fn apply(
        &self,
        style: &Style,
        input: impl Into<Cow<'static, str>>,
    ) -> Cow<'static, str> {
        if self.is_present {
            style.apply_to(input.into()).to_string().into()
        } else {
            input.into()
        }
    }
}

/// [`io::Write`] extension for easier manipulation with strings.
pub trait WriteStrExt: io::Write {
    /// Writes the given `string` into this writer.
    ///
    /// # Errors
    ///
    /// If this writer fails to write the given `string`.
    fn write_str(&mut self, string: impl AsRef<str>) -> io::Result<()> {
        self.write_all(string.as_ref().as_bytes())
    }

    /// Writes the given `string` into this writer followed by a newline.
    ///
    /// # Errors
    ///
    /// If this writer fails to write the given `string`.
    fn write_line(&mut self, string: impl AsRef<str>) -> io::Result<()> {
        self.write_str(string.as_ref())
            .and_then(|()| self.write_str("\n"))
    }
}

impl<T: io::Write + ?Sized> WriteStrExt for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_coloring_leaves_input_as_is() {
        let mut styles = Styles::new();
        styles.apply_coloring(Coloring::Never);

        assert_eq!(styles.err("failed"), "failed");
        assert_eq!(styles.status(Status::Pending, "P"), "P");
    }

    #[test]
    fn always_coloring_adds_escapes() {
        let mut styles = Styles::new();
        styles.apply_coloring(Coloring::Always);
        console::set_colors_enabled(true);

        assert_ne!(styles.ok("ok"), "ok");
        assert!(styles.status(Status::Failed, "F").contains('F'));
    }

    #[test]
    fn writes_lines() {
        let mut out = Vec::new();

        out.write_str("a").unwrap();
        out.write_line("b").unwrap();

        assert_eq!(out, b"ab\n");
    }
}

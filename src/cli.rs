// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for composing CLI options.
//!
//! The main thing in this module is [`Opts`], which composes the
//! [`runner::basic::Cli`] and [`writer::progress::Cli`] option groups and
//! may be extended with custom options. Being [`clap::Args`], the groups can
//! also be flattened into a CLI of your own.
//!
//! [`runner::basic::Cli`]: crate::runner::basic::Cli
//! [`writer::progress::Cli`]: crate::writer::progress::Cli

use std::path::PathBuf;

pub use clap::{Args, Parser};

use crate::{runner, writer};

/// Root CLI (command line interface) of a top-level [`Cucumber`] executor.
///
/// # Example
///
/// ```rust
/// # use cucumber_engine::cli::{self, Parser as _};
/// #[derive(Clone, Debug, Default, clap::Args)]
/// struct CustomOpts {
///     /// Name of the environment to run against.
///     #[arg(long)]
///     env: Option<String>,
/// }
///
/// let opts = cli::Opts::<CustomOpts>::try_parse_from([
///     "cucumber", "-c", "4", "--env", "staging",
/// ])
/// .unwrap();
///
/// assert_eq!(opts.runner.concurrency, Some(4));
/// assert_eq!(opts.custom.env.as_deref(), Some("staging"));
/// ```
///
/// [`Cucumber`]: crate::Cucumber
#[derive(Clone, Debug, Default, Parser)]
#[command(
    name = "cucumber",
    about = "Run the tests, pet a dog!",
    long_about = "Run the tests, pet a dog!"
)]
pub struct Opts<Custom = Empty>
where
    Custom: Args,
{
    /// Path to a `.feature` file or a directory with them.
    #[arg(long, short, value_name = "path", global = true)]
    pub input: Option<PathBuf>,

    /// [`Runner`] CLI options.
    ///
    /// [`Runner`]: crate::runner::Basic
    #[command(flatten)]
    pub runner: runner::basic::Cli,

    /// [`Writer`] CLI options.
    ///
    /// [`Writer`]: crate::writer::Progress
    #[command(flatten)]
    pub writer: writer::progress::Cli,

    /// Additional custom CLI options.
    #[command(flatten)]
    pub custom: Custom,
}

impl<Custom: Args> Opts<Custom> {
    /// Shortcut for [`clap::Parser::parse()`], which doesn't require the trait
    /// being imported.
    #[must_use]
    pub fn parsed() -> Self {
        <Self as Parser>::parse()
    }
}

/// Empty CLI options.
#[derive(Args, Clone, Copy, Debug, Default)]
#[group(skip)]
pub struct Empty;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::Coloring;

    #[derive(Clone, Debug, Default, Args)]
    struct CustomOpts {
        #[arg(long)]
        custom_flag: bool,
    }

    #[test]
    fn parses_defaults() {
        let opts = Opts::<Empty>::try_parse_from(["cucumber"]).unwrap();

        assert_eq!(opts.input, None);
        assert_eq!(opts.runner.concurrency, None);
        assert_eq!(opts.runner.max_nesting_depth, None);
        assert_eq!(opts.writer.color, Coloring::Auto);
    }

    #[test]
    fn parses_all_groups() {
        let opts = Opts::<CustomOpts>::try_parse_from([
            "cucumber",
            "--input",
            "tests/features",
            "--concurrency",
            "8",
            "--max-nesting-depth",
            "4",
            "--color",
            "never",
            "--custom-flag",
        ])
        .unwrap();

        assert_eq!(opts.input, Some(PathBuf::from("tests/features")));
        assert_eq!(opts.runner.concurrency, Some(8));
        assert_eq!(opts.runner.max_nesting_depth, Some(4));
        assert_eq!(opts.writer.color, Coloring::Never);
        assert!(opts.custom.custom_flag);
    }

    #[test]
    fn rejects_unknown_coloring() {
        let res = Opts::<Empty>::try_parse_from(["cucumber", "--color", "pink"]);

        assert!(res.is_err());
    }
}

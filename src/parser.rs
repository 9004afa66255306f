// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Loading [`Feature`]s from the file system.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use derive_more::{Error, From};

use crate::feature::Feature;

/// Default loader of `.feature` files.
///
/// Blocking, as [`Feature`]s are loaded before any scenario is executed.
#[derive(Clone, Copy, Debug, Default)]
pub struct Basic;

impl Basic {
    /// Loads [`Feature`]s from the given `path`.
    ///
    /// If the `path` is a directory, every `*.feature` file inside it
    /// (recursively, case-insensitive) is loaded, ordered by path.
    ///
    /// # Errors
    ///
    /// If a file cannot be read or is not a valid Gherkin document.
    pub fn parse(self, path: impl AsRef<Path>) -> Result<Vec<Feature>, Error> {
        let path = path.as_ref();
        if path.is_dir() {
            let mut paths = globwalk::GlobWalkerBuilder::new(path, "*.feature")
                .case_insensitive(true)
                .build()?
                .filter_map(Result::ok)
                .map(|entry| entry.into_path())
                .filter(|p| p.is_file())
                .collect::<Vec<_>>();
            paths.sort();
            tracing::debug!(
                dir = %path.display(),
                files = paths.len(),
                "loading features",
            );
            paths.iter().map(|p| Self::parse_file(p)).collect()
        } else {
            Self::parse_file(path).map(|f| vec![f])
        }
    }

    fn parse_file(path: &Path) -> Result<Feature, Error> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;
        Feature::parse(path, content).map_err(|source| Error::Parse {
            path: path.to_owned(),
            source,
        })
    }
}

/// Error of loading [`Feature`]s.
#[derive(Debug, Error, From)]
pub enum Error {
    /// File cannot be read.
    #[from(ignore)]
    Io {
        /// Path to the file.
        path: PathBuf,

        /// Underlying error.
        source: io::Error,
    },

    /// Directory cannot be walked.
    Glob(globwalk::GlobError),

    /// File is not a valid Gherkin document.
    #[from(ignore)]
    Parse {
        /// Path to the file.
        path: PathBuf,

        /// Underlying error.
        source: gherkin::ParseError,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Failed to read `{}`: {source}", path.display())
            }
            Self::Glob(e) => write!(f, "Failed to walk features: {e}"),
            Self::Parse { path, source } => {
                write!(f, "Failed to parse `{}`: {source}", path.display())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const FEATURE: &str =
        "Feature: {name}\n\n  Scenario: one\n    Given a step\n";

    fn write(dir: &Path, file: &str, name: &str) -> PathBuf {
        let path = dir.join(file);
        fs::write(&path, FEATURE.replace("{name}", name)).unwrap();
        path
    }

    #[test]
    fn loads_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "single.feature", "single");

        let features = Basic.parse(&path).unwrap();

        assert_eq!(features.len(), 1);
        assert_eq!(features[0].name(), "single");
        assert_eq!(features[0].path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn loads_directory_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        _ = write(dir.path(), "b.feature", "b");
        _ = write(dir.path(), "a.FEATURE", "a");
        _ = write(&dir.path().join("nested"), "c.feature", "c");
        _ = write(dir.path(), "ignored.txt", "ignored");

        let features = Basic.parse(dir.path()).unwrap();

        let names = features.iter().map(Feature::name).collect::<Vec<_>>();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        let err = Basic.parse(dir.path().join("missing.feature")).unwrap_err();

        assert!(matches!(err, Error::Io { .. }), "{err}");
    }

    #[test]
    fn reports_invalid_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.feature");
        fs::write(&path, "this is not gherkin").unwrap();

        let err = Basic.parse(&path).unwrap_err();

        assert!(matches!(err, Error::Parse { .. }), "{err}");
        assert!(err.to_string().contains("broken.feature"));
    }
}

// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Anchored [`Regex`] patterns of [`Definition`]s.
//!
//! [`Definition`]: super::Definition

use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};

use derive_more::with_trait::{Debug, Deref, Display};
use regex::Regex;

/// [`Regex`] compiled from a user pattern and anchored at both ends, so it
/// always matches a whole step text.
///
/// Implements [`Eq`], [`Ord`] and [`Hash`] over the source pattern as written
/// by the user.
#[derive(Clone, Debug, Deref, Display)]
#[display("{source}")]
pub struct AnchoredRegex {
    /// Pattern as it was registered.
    source: String,

    /// Compiled anchored [`Regex`].
    #[deref]
    regex: Regex,
}

impl AnchoredRegex {
    /// Compiles the given `pattern`, adding `^` and `$` anchors around it.
    ///
    /// Anchors already present in the `pattern` are kept, so `^one$` and `one`
    /// compile to equivalent expressions.
    ///
    /// # Errors
    ///
    /// If the `pattern` is not a valid [`Regex`].
    pub fn new(pattern: impl Into<String>) -> Result<Self, regex::Error> {
        let source = pattern.into();
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self { source, regex })
    }

    /// Returns the pattern as it was registered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the number of capturing groups, excluding the implicit
    /// whole-match group.
    #[must_use]
    pub fn captures_count(&self) -> usize {
        self.regex.captures_len() - 1
    }

    /// Returns texts of all capturing groups if the whole `text` matches.
    ///
    /// Groups not participating in the match are returned as empty strings.
    #[must_use]
    pub fn capture_texts(&self, text: &str) -> Option<Vec<String>> {
        self.regex.captures(text).map(|caps| {
            caps.iter()
                .skip(1)
                .map(|m| m.map_or_else(String::new, |m| m.as_str().to_owned()))
                .collect()
        })
    }
}

impl Hash for AnchoredRegex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

impl PartialEq for AnchoredRegex {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for AnchoredRegex {}

impl PartialOrd for AnchoredRegex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AnchoredRegex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.source.cmp(&other.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_whole_text_only() {
        let re = AnchoredRegex::new("one").unwrap();

        assert!(re.is_match("one"));
        assert!(!re.is_match("one two"));
        assert!(!re.is_match("zero one"));
    }

    #[test]
    fn keeps_user_anchors() {
        let re = AnchoredRegex::new("^one$").unwrap();

        assert!(re.is_match("one"));
        assert_eq!(re.as_str(), "^one$");
        assert_eq!(re.to_string(), "^one$");
    }

    #[test]
    fn anchors_alternations_as_a_whole() {
        let re = AnchoredRegex::new("one|two").unwrap();

        assert!(re.is_match("two"));
        assert!(!re.is_match("one two"));
    }

    #[test]
    fn counts_only_explicit_groups() {
        let re = AnchoredRegex::new(r#"^"([^"]*)" costs (\d+)(?: coins)?$"#)
            .unwrap();

        assert_eq!(re.captures_count(), 2);
    }

    #[test]
    fn captures_texts_of_groups() {
        let re = AnchoredRegex::new(r"^I have (\d+) (\w+)( today)?$").unwrap();

        assert_eq!(
            re.capture_texts("I have 5 cucumbers"),
            Some(vec!["5".to_owned(), "cucumbers".to_owned(), String::new()]),
        );
        assert_eq!(re.capture_texts("I have none"), None);
    }

    #[test]
    fn compares_by_source() {
        let a = AnchoredRegex::new("a").unwrap();
        let b = AnchoredRegex::new("b").unwrap();

        assert_eq!(a, AnchoredRegex::new("a").unwrap());
        assert!(a < b);
    }

    #[test]
    fn rejects_invalid_patterns() {
        assert!(AnchoredRegex::new("(unclosed").is_err());
    }
}

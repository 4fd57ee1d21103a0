//! Query compilation: user query plus option flags into a [`Pattern`].
//!
//! Three query shapes are recognised:
//!
//! - **Regex** (`use_regex`): the query is the pattern source.
//! - **Exact phrase**: a query wrapped in double quotes matches the
//!   literal phrase between them.
//! - **Terms**: anything else is split on whitespace and any term may
//!   match (alternation).
//!
//! Matching is case-insensitive unless `case_sensitive` is set. With
//! `ignore_accents` the query is folded through [`normalize`] first and
//! the pattern is meant to run over folded text.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::normalize::normalize;

/// Option flags that shape how a query is compiled and applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub whole_word: bool,
    #[serde(default)]
    pub use_regex: bool,
    #[serde(default)]
    pub ignore_accents: bool,
}

/// A compiled matcher together with the pattern source it was built from.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    source: String,
}

impl Pattern {
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of non-overlapping matches in `text`.
    pub fn count(&self, text: &str) -> usize {
        self.regex.find_iter(text).count()
    }

    /// Byte ranges of the non-empty, non-overlapping matches in `text`.
    pub fn find_ranges(&self, text: &str) -> Vec<std::ops::Range<usize>> {
        self.regex
            .find_iter(text)
            .filter(|m| !m.is_empty())
            .map(|m| m.range())
            .collect()
    }
}

/// Compile `query` under `options`.
///
/// Fails with [`Error::EmptyQuery`] for a blank query and
/// [`Error::Pattern`] when the resulting expression does not parse.
pub fn compile(query: &str, options: &SearchOptions) -> Result<Pattern> {
    let query = if options.ignore_accents {
        normalize(query)
    } else {
        query.to_string()
    };
    if query.trim().is_empty() {
        return Err(Error::EmptyQuery);
    }

    let source = if options.use_regex {
        query
    } else if let Some(phrase) = exact_phrase(&query) {
        word_bounded(&regex::escape(phrase), options.whole_word)
    } else {
        query
            .split_whitespace()
            .map(|term| word_bounded(&regex::escape(term), options.whole_word))
            .collect::<Vec<_>>()
            .join("|")
    };

    let regex = RegexBuilder::new(&source)
        .case_insensitive(!options.case_sensitive)
        .build()?;
    Ok(Pattern { regex, source })
}

/// The phrase inside `"..."`, if the whole query is quoted.
fn exact_phrase(query: &str) -> Option<&str> {
    query
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .filter(|phrase| !phrase.is_empty())
}

fn word_bounded(pattern: &str, whole_word: bool) -> String {
    if whole_word {
        format!(r"\b{}\b", pattern)
    } else {
        pattern.to_string()
    }
}

//! Ranked paragraph search across loaded files.
//!
//! # Ranking
//!
//! 1. Compile the query into a [`Pattern`].
//! 2. For every file, for every paragraph: fold the text when
//!    `ignore_accents` is set, count non-overlapping matches.
//! 3. Keep paragraphs with at least one match; relevance = match count.
//! 4. Stable sort by relevance (desc), so ties keep file order, then
//!    paragraph order.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::models::{FileRecord, SearchResult};
use crate::normalize::normalize;
use crate::query::{compile, Pattern, SearchOptions};

/// Compile `query` and search every paragraph of `files`.
pub fn search(
    files: &[FileRecord],
    query: &str,
    options: &SearchOptions,
) -> Result<Vec<SearchResult>> {
    let pattern = compile(query, options)?;
    Ok(search_with(files, &pattern, options.ignore_accents))
}

/// Search with an already compiled pattern.
pub fn search_with(
    files: &[FileRecord],
    pattern: &Pattern,
    ignore_accents: bool,
) -> Vec<SearchResult> {
    let mut results = Vec::new();

    for file in files {
        let ids = file.locate_paragraphs();
        for (paragraph, id) in file.paragraphs.iter().zip(ids) {
            let relevance = if ignore_accents {
                pattern.count(&normalize(paragraph))
            } else {
                pattern.count(paragraph)
            };
            if relevance > 0 {
                results.push(SearchResult {
                    file: Some(file.name.clone()),
                    paragraph: paragraph.clone(),
                    paragraph_id: id,
                    relevance,
                });
            }
        }
    }

    results.sort_by(|a, b| b.relevance.cmp(&a.relevance));

    debug!(
        pattern = pattern.source(),
        files = files.len(),
        results = results.len(),
        "search complete"
    );
    results
}

/// Result filter by paragraph length in lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SizeFilter {
    #[default]
    All,
    /// Fewer than 5 lines.
    Small,
    /// 5 to 15 lines.
    Medium,
    /// More than 15 lines.
    Large,
}

impl SizeFilter {
    pub fn accepts(self, lines: usize) -> bool {
        match self {
            SizeFilter::All => true,
            SizeFilter::Small => lines < 5,
            SizeFilter::Medium => (5..=15).contains(&lines),
            SizeFilter::Large => lines > 15,
        }
    }
}

impl FromStr for SizeFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(SizeFilter::All),
            "small" => Ok(SizeFilter::Small),
            "medium" => Ok(SizeFilter::Medium),
            "large" => Ok(SizeFilter::Large),
            other => Err(format!(
                "unknown size filter: '{}'. Use all, small, medium, or large.",
                other
            )),
        }
    }
}

impl fmt::Display for SizeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SizeFilter::All => "all",
            SizeFilter::Small => "small",
            SizeFilter::Medium => "medium",
            SizeFilter::Large => "large",
        };
        f.write_str(name)
    }
}

/// Keep only the results whose paragraph length passes `filter`.
pub fn filter_by_size(results: &[SearchResult], filter: SizeFilter) -> Vec<SearchResult> {
    results
        .iter()
        .filter(|r| filter.accepts(r.line_count()))
        .cloned()
        .collect()
}

/// Keep the `limit` best-ranked results.
pub fn limit_results(mut results: Vec<SearchResult>, limit: usize) -> Vec<SearchResult> {
    results.truncate(limit);
    results
}

/// Per-file share of a result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub file: String,
    pub occurrences: usize,
    pub paragraphs: usize,
}

/// Totals over a result set, for the stats view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSummary {
    pub results: usize,
    pub occurrences: usize,
    /// Files in order of first appearance in the results.
    pub files: Vec<FileSummary>,
    pub elapsed_secs: f64,
}

impl SearchSummary {
    pub fn from_results(results: &[SearchResult], elapsed: Duration) -> Self {
        let mut files: Vec<FileSummary> = Vec::new();
        let mut occurrences = 0;
        let mut count = 0;

        for result in results {
            let Some(name) = &result.file else {
                continue;
            };
            count += 1;
            occurrences += result.relevance;
            match files.iter_mut().find(|f| &f.file == name) {
                Some(entry) => {
                    entry.occurrences += result.relevance;
                    entry.paragraphs += 1;
                }
                None => files.push(FileSummary {
                    file: name.clone(),
                    occurrences: result.relevance,
                    paragraphs: 1,
                }),
            }
        }

        Self {
            results: count,
            occurrences,
            files,
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }
}

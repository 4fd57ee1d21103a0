//! `paraseek search`: ranked paragraph search over every stored file.
//!
//! Runs the query through the library, then applies the size filter
//! and the result limit. Output is a numbered list, or JSON with
//! `--json`; `--highlight` adds the HTML-marked paragraph and `--stats`
//! appends per-file totals.

use anyhow::{bail, Result};
use serde::Serialize;
use std::time::Instant;

use paraseek_core::highlight::highlight_with;
use paraseek_core::models::SearchResult;
use paraseek_core::query::{compile, SearchOptions};
use paraseek_core::search::{filter_by_size, limit_results, SearchSummary, SizeFilter};

use crate::config::Config;
use crate::sqlite_store::open_library;

/// Command-line knobs for one search.
#[derive(Debug, Clone, Default)]
pub struct SearchArgs {
    pub query: String,
    /// Flags set on the command line; they override the `[search]` defaults.
    pub options: OptionOverrides,
    pub size: SizeFilter,
    pub limit: Option<usize>,
    pub highlight: bool,
    pub json: bool,
    pub stats: bool,
}

/// One printed hit.
#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    pub rank: usize,
    pub file: String,
    pub paragraph_id: Option<String>,
    pub relevance: usize,
    pub lines: usize,
    pub paragraph: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

#[derive(Debug, Serialize)]
struct SearchOutput<'a> {
    query: &'a str,
    results: Vec<ResultView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<SearchSummary>,
}

/// Per-run search switches. `None` keeps the config value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    pub case_sensitive: Option<bool>,
    pub whole_word: Option<bool>,
    pub use_regex: Option<bool>,
    pub ignore_accents: Option<bool>,
}

/// Combine config defaults with command-line flags. A flag set either
/// way wins over the config.
pub fn effective_options(config: &Config, flags: &OptionOverrides) -> SearchOptions {
    let defaults = config.search.options();
    SearchOptions {
        case_sensitive: flags.case_sensitive.unwrap_or(defaults.case_sensitive),
        whole_word: flags.whole_word.unwrap_or(defaults.whole_word),
        use_regex: flags.use_regex.unwrap_or(defaults.use_regex),
        ignore_accents: flags.ignore_accents.unwrap_or(defaults.ignore_accents),
    }
}

/// Run a search and return the filtered, limited result rows.
///
/// An invalid pattern is reported as an error rather than a result row.
pub async fn search_results(
    config: &Config,
    query: &str,
    options: &SearchOptions,
    size: SizeFilter,
    limit: Option<usize>,
) -> Result<Vec<SearchResult>> {
    let mut library = open_library(config).await?;
    let results = library.search(query, options).to_vec();

    if let Some(error) = results.iter().find(|r| r.is_error()) {
        bail!("{}", error.paragraph);
    }

    let results = filter_by_size(&results, size);
    Ok(match limit.or(config.search.limit) {
        Some(n) => limit_results(results, n),
        None => results,
    })
}

pub async fn run_search(config: &Config, args: &SearchArgs) -> Result<()> {
    let options = effective_options(config, &args.options);
    let started = Instant::now();
    let results = search_results(config, &args.query, &options, args.size, args.limit).await?;
    let elapsed = started.elapsed();

    let pattern = if args.highlight && !results.is_empty() {
        Some(compile(&args.query, &options)?)
    } else {
        None
    };

    let views: Vec<ResultView> = results
        .iter()
        .enumerate()
        .map(|(i, r)| ResultView {
            rank: i + 1,
            file: r.file.clone().unwrap_or_default(),
            paragraph_id: r.paragraph_id.map(|id| id.to_string()),
            relevance: r.relevance,
            lines: r.line_count(),
            paragraph: r.paragraph.clone(),
            html: pattern
                .as_ref()
                .map(|p| highlight_with(&r.paragraph, p, options.ignore_accents)),
        })
        .collect();
    let stats = args
        .stats
        .then(|| SearchSummary::from_results(&results, elapsed));

    if args.json {
        let output = SearchOutput {
            query: &args.query,
            results: views,
            stats,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if views.is_empty() {
        println!("No results.");
    }
    for view in &views {
        print_result(view);
    }
    if let Some(stats) = stats {
        print_summary(&stats);
    }
    Ok(())
}

fn print_result(view: &ResultView) {
    println!(
        "{}. [{}] {} / {} ({} line{})",
        view.rank,
        view.relevance,
        view.file,
        view.paragraph_id.as_deref().unwrap_or("-"),
        view.lines,
        if view.lines == 1 { "" } else { "s" }
    );
    let body = view.html.as_deref().unwrap_or(&view.paragraph);
    for line in body.lines() {
        println!("    {}", line);
    }
    println!();
}

fn print_summary(stats: &SearchSummary) {
    println!(
        "{} result(s), {} occurrence(s) in {} file(s) ({:.3}s)",
        stats.results,
        stats.occurrences,
        stats.files.len(),
        stats.elapsed_secs
    );
    for file in &stats.files {
        println!(
            "  {}: {} occurrence(s) in {} paragraph(s)",
            file.file, file.occurrences, file.paragraphs
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DbConfig, IngestConfig, SearchConfig};
    use std::path::PathBuf;

    fn config_with(search: SearchConfig) -> Config {
        Config {
            db: DbConfig {
                path: PathBuf::from("unused.sqlite"),
            },
            search,
            ingest: IngestConfig::default(),
        }
    }

    #[test]
    fn test_unset_flags_keep_config_defaults() {
        let config = config_with(SearchConfig {
            case_sensitive: true,
            ignore_accents: true,
            ..Default::default()
        });
        let options = effective_options(&config, &OptionOverrides::default());
        assert_eq!(options, config.search.options());
    }

    #[test]
    fn test_flags_override_config_both_ways() {
        let config = config_with(SearchConfig {
            case_sensitive: true,
            ..Default::default()
        });
        let flags = OptionOverrides {
            case_sensitive: Some(false),
            whole_word: Some(true),
            ..Default::default()
        };
        let options = effective_options(&config, &flags);
        assert!(!options.case_sensitive);
        assert!(options.whole_word);
        assert!(!options.use_regex);
        assert!(!options.ignore_accents);
    }
}

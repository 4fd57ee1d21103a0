//! Export search results or a stored file as plain text.
//!
//! Two result layouts are available:
//!
//! - `report`: a header (query, date, total) followed by one numbered
//!   block per result with file and relevance.
//! - `snippets`: each paragraph preceded by a `//` comment naming its
//!   rank and file, ready to paste into source code.
//!
//! With `output` set the text is written to that path (or, for a
//! directory, to a file named after the query), otherwise to stdout
//! for piping.

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::ValueEnum;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use paraseek_core::models::SearchResult;

use crate::config::Config;
use crate::search::{effective_options, search_results, SearchArgs};
use crate::sqlite_store::open_library;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Report,
    Snippets,
}

pub fn render_report(query: &str, date: NaiveDate, results: &[SearchResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Search results for: \"{}\"", query);
    let _ = writeln!(out, "Date: {}", date.format("%Y-%m-%d"));
    let _ = writeln!(out, "Total results: {}", results.len());
    out.push('\n');

    for (i, result) in results.iter().enumerate() {
        let _ = writeln!(out, "--- Result #{} ---", i + 1);
        let _ = writeln!(out, "File: {}", result.file.as_deref().unwrap_or("-"));
        let _ = writeln!(out, "Relevance: {} occurrence(s)", result.relevance);
        let _ = writeln!(out, "Content:\n{}\n", result.paragraph);
    }
    out
}

pub fn render_snippets(results: &[SearchResult]) -> String {
    let mut out = String::new();
    for (i, result) in results.iter().enumerate() {
        let _ = writeln!(
            out,
            "// Result #{} from file: {}",
            i + 1,
            result.file.as_deref().unwrap_or("-")
        );
        let _ = writeln!(out, "{}\n", result.paragraph);
    }
    out
}

/// File name suggested for a results export: non-alphanumerics become `-`.
pub fn default_file_name(query: &str) -> String {
    let slug: String = query
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("search-{}.txt", slug)
}

pub async fn run_export_results(
    config: &Config,
    args: &SearchArgs,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let options = effective_options(config, &args.options);
    let results = search_results(config, &args.query, &options, args.size, args.limit).await?;
    if results.is_empty() {
        bail!("No results to export for \"{}\"", args.query);
    }

    let text = match format {
        ExportFormat::Report => render_report(&args.query, Utc::now().date_naive(), &results),
        ExportFormat::Snippets => render_snippets(&results),
    };
    // A directory target gets a file name derived from the query.
    let target: Option<PathBuf> = output.map(|p| {
        if p.is_dir() {
            p.join(default_file_name(&args.query))
        } else {
            p.to_path_buf()
        }
    });
    write_output(&text, target.as_deref())
}

pub async fn run_export_file(config: &Config, name: &str, output: Option<&Path>) -> Result<()> {
    let library = open_library(config).await?;
    let Some(file) = library.file(name) else {
        bail!("file not found: {}", name);
    };
    write_output(&file.content, output)
}

fn write_output(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Exported to {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

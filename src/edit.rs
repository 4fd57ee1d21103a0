//! Paragraph edits from the command line: `edit`, `delete`, `insert`.
//!
//! Each command loads the library, applies one mutation through it (a
//! read-modify-write against SQLite), and reports the new paragraph
//! count. A stale paragraph reference aborts without writing.

use anyhow::Result;

use paraseek_core::models::{FileRecord, ParagraphId};
use paraseek_core::mutate::{InsertPosition, ParagraphLocator};

use crate::config::Config;
use crate::sqlite_store::open_library;

/// Build a locator from the mutually exclusive `--id` / `--paragraph` flags.
pub fn locator(id: Option<ParagraphId>, text: Option<String>) -> Option<ParagraphLocator> {
    match (id, text) {
        (Some(id), _) => Some(ParagraphLocator::Id(id)),
        (None, Some(text)) => Some(ParagraphLocator::Text(text)),
        (None, None) => None,
    }
}

pub async fn run_edit(
    config: &Config,
    file: &str,
    locator: &ParagraphLocator,
    replacement: &str,
) -> Result<()> {
    let mut library = open_library(config).await?;
    let record = library.edit_paragraph(file, locator, replacement).await?;
    report("Edited", record);
    Ok(())
}

pub async fn run_delete(config: &Config, file: &str, locator: &ParagraphLocator) -> Result<()> {
    let mut library = open_library(config).await?;
    let record = library.delete_paragraph(file, locator).await?;
    report("Deleted paragraph from", record);
    Ok(())
}

pub async fn run_insert(
    config: &Config,
    file: &str,
    position: InsertPosition,
    text: &str,
) -> Result<()> {
    let mut library = open_library(config).await?;
    let record = library.insert_paragraph(file, position, text).await?;
    report("Inserted paragraph into", record);
    Ok(())
}

fn report(action: &str, record: &FileRecord) {
    println!(
        "{} {} ({} paragraphs).",
        action,
        record.name,
        record.paragraphs.len()
    );
}

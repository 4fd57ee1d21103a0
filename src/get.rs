//! File retrieval: `paraseek get` and `paraseek context`.

use anyhow::{anyhow, Result};
use serde::Serialize;

use paraseek_core::context::{find_containing_context, identify_contexts, CodeContext};
use paraseek_core::models::{FileRecord, Paragraph, ParagraphId};

use crate::config::Config;
use crate::sqlite_store::open_library;

#[derive(Debug, Serialize)]
pub struct FileResponse {
    pub id: Option<String>,
    pub name: String,
    pub updated_at: String,
    pub content: String,
    pub paragraphs: Vec<Paragraph>,
}

impl From<&FileRecord> for FileResponse {
    fn from(record: &FileRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            updated_at: record.date.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            content: record.content.clone(),
            paragraphs: record.paragraph_spans(),
        }
    }
}

pub async fn get_file(config: &Config, name: &str) -> Result<FileResponse> {
    let library = open_library(config).await?;
    library
        .file(name)
        .map(FileResponse::from)
        .ok_or_else(|| anyhow!("file not found: {}", name))
}

pub async fn run_get(config: &Config, name: &str, json: bool) -> Result<()> {
    let file = get_file(config, name).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&file)?);
        return Ok(());
    }

    println!("--- File ---");
    println!("name:        {}", file.name);
    println!("id:          {}", file.id.as_deref().unwrap_or("-"));
    println!("updated_at:  {}", file.updated_at);
    println!("bytes:       {}", file.content.len());
    println!();

    println!("--- Paragraphs ({}) ---", file.paragraphs.len());
    for paragraph in &file.paragraphs {
        println!("[{}] ({} lines)", paragraph.id, paragraph.line_count());
        println!("{}", paragraph.text);
        println!();
    }
    Ok(())
}

/// The function or class body enclosing paragraph `id` of `name`, if any.
pub async fn containing_context(
    config: &Config,
    name: &str,
    id: ParagraphId,
) -> Result<(Paragraph, Option<CodeContext>)> {
    let library = open_library(config).await?;
    let record = library
        .file(name)
        .ok_or_else(|| anyhow!("file not found: {}", name))?;
    let paragraph = record
        .paragraph(id)
        .ok_or_else(|| anyhow!("paragraph {} not found in '{}'", id, name))?;

    let contexts = identify_contexts(&record.content);
    let context = find_containing_context(&paragraph.text, &contexts).cloned();
    Ok((paragraph, context))
}

pub async fn run_context(config: &Config, name: &str, id: ParagraphId) -> Result<()> {
    let (paragraph, context) = containing_context(config, name, id).await?;
    match context {
        Some(context) => {
            println!(
                "[{}] is part of a {} at bytes {}..{}:",
                paragraph.id, context.kind, context.range.start, context.range.end
            );
            println!();
            println!("{}", context.text);
        }
        None => println!("[{}] has no enclosing function or class.", paragraph.id),
    }
    Ok(())
}

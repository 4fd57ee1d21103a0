//! Library overview for `paraseek stats`: file and paragraph counts,
//! paragraph size classes, and the database footprint.

use anyhow::Result;
use serde::Serialize;

use paraseek_core::models::FileRecord;
use paraseek_core::search::SizeFilter;

use crate::config::Config;
use crate::sqlite_store::open_library;

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct LibraryStats {
    pub files: usize,
    pub paragraphs: usize,
    pub bytes: usize,
    /// Paragraph counts per size class (small, medium, large).
    pub small: usize,
    pub medium: usize,
    pub large: usize,
}

impl LibraryStats {
    pub fn collect(files: &[FileRecord]) -> Self {
        let mut stats = LibraryStats {
            files: files.len(),
            ..Default::default()
        };
        for file in files {
            stats.bytes += file.content.len();
            for paragraph in &file.paragraphs {
                stats.paragraphs += 1;
                let lines = paragraph.split('\n').count();
                if SizeFilter::Small.accepts(lines) {
                    stats.small += 1;
                } else if SizeFilter::Medium.accepts(lines) {
                    stats.medium += 1;
                } else {
                    stats.large += 1;
                }
            }
        }
        stats
    }
}

pub async fn run_stats(config: &Config) -> Result<()> {
    let library = open_library(config).await?;
    let stats = LibraryStats::collect(library.files());

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("paraseek library");
    println!("================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!();
    println!("  Files:       {}", stats.files);
    println!("  Content:     {}", format_bytes(stats.bytes as u64));
    println!("  Paragraphs:  {}", stats.paragraphs);
    println!("    small  (< 5 lines):   {}", stats.small);
    println!("    medium (5-15 lines):  {}", stats.medium);
    println!("    large  (> 15 lines):  {}", stats.large);

    if !library.files().is_empty() {
        println!();
        println!("  {:<40} {:>10}", "FILE", "PARAGRAPHS");
        for file in library.files() {
            println!("  {:<40} {:>10}", file.name, file.paragraphs.len());
        }
    }
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

//! Library housekeeping: `list`, `remove`, `clear`.

use anyhow::Result;

use crate::config::Config;
use crate::sqlite_store::open_library;

pub async fn run_list(config: &Config) -> Result<()> {
    let library = open_library(config).await?;
    if library.files().is_empty() {
        println!("No files.");
        return Ok(());
    }

    for file in library.files() {
        println!(
            "{:<40} {:>6} paragraphs  {:>9} bytes  {}",
            file.name,
            file.paragraphs.len(),
            file.content.len(),
            file.date.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

pub async fn run_remove(config: &Config, name: &str) -> Result<()> {
    let mut library = open_library(config).await?;
    library.remove_file(name).await?;
    println!("Removed {}.", name);
    Ok(())
}

pub async fn run_clear(config: &Config) -> Result<()> {
    let mut library = open_library(config).await?;
    let count = library.files().len();
    library.clear().await?;
    println!("Removed {} file(s).", count);
    Ok(())
}

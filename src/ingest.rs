//! Loading files from disk into the library.
//!
//! `paraseek add` accepts files and directories. Explicit file paths are
//! always loaded; directories are walked with `walkdir` and filtered by
//! the `[ingest]` include/exclude globs. Files are stored under their
//! path relative to the directory that was walked, or their file name
//! when passed directly.
//!
//! A file whose content hash matches the stored row is skipped, so
//! re-adding a tree only rewrites what changed.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::{Config, IngestConfig};
use crate::sqlite_store::{hash_content, open_library};

/// A file selected for loading, with the name it will be stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub name: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub added: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

pub async fn run_add(config: &Config, paths: &[PathBuf]) -> Result<()> {
    let candidates = collect_candidates(&config.ingest, paths)?;
    let mut library = open_library(config).await?;
    let mut stats = IngestStats::default();

    for candidate in candidates {
        let size = std::fs::metadata(&candidate.path)?.len();
        if size > config.ingest.max_file_bytes {
            warn!(
                path = %candidate.path.display(),
                size,
                "file exceeds ingest.max_file_bytes, skipping"
            );
            stats.skipped += 1;
            continue;
        }

        let content = match std::fs::read_to_string(&candidate.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %candidate.path.display(), error = %e, "unreadable file, skipping");
                stats.skipped += 1;
                continue;
            }
        };

        let stored_hash = library.store().content_hash(&candidate.name).await?;
        if stored_hash.as_deref() == Some(hash_content(&content).as_str()) {
            debug!(file = %candidate.name, "unchanged");
            stats.unchanged += 1;
            continue;
        }

        let record = library.add_file(&candidate.name, &content).await?;
        println!(
            "  + {} ({} paragraphs)",
            record.name,
            record.paragraphs.len()
        );
        stats.added += 1;
    }

    println!(
        "Added {} file(s), {} unchanged, {} skipped.",
        stats.added, stats.unchanged, stats.skipped
    );
    Ok(())
}

/// Expand `paths` into the files to load, sorted by stored name.
pub fn collect_candidates(ingest: &IngestConfig, paths: &[PathBuf]) -> Result<Vec<Candidate>> {
    let include_set = build_globset(&ingest.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
    ];
    default_excludes.extend(ingest.exclude_globs.iter().cloned());
    let exclude_set = build_globset(&default_excludes)?;

    let mut candidates = Vec::new();
    for path in paths {
        if path.is_file() {
            candidates.push(Candidate {
                path: path.clone(),
                name: file_name(path),
            });
        } else if path.is_dir() {
            walk_dir(path, ingest.follow_symlinks, &include_set, &exclude_set, &mut candidates)?;
        } else {
            bail!("Path does not exist: {}", path.display());
        }
    }

    candidates.sort_by(|a, b| a.name.cmp(&b.name));
    candidates.dedup_by(|a, b| a.name == b.name);
    Ok(candidates)
}

fn walk_dir(
    root: &Path,
    follow_symlinks: bool,
    include_set: &GlobSet,
    exclude_set: &GlobSet,
    out: &mut Vec<Candidate>,
) -> Result<()> {
    for entry in WalkDir::new(root).follow_links(follow_symlinks) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().replace('\\', "/");

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }

        out.push(Candidate {
            path: path.to_path_buf(),
            name: rel_str,
        });
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

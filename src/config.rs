use anyhow::{Context, Result};
use globset::Glob;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use paraseek_core::query::SearchOptions;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

/// Defaults for `paraseek search`; `--flag` / `--no-flag` override them
/// per run.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SearchConfig {
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub whole_word: bool,
    #[serde(default)]
    pub use_regex: bool,
    #[serde(default)]
    pub ignore_accents: bool,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SearchConfig {
    pub fn options(&self) -> SearchOptions {
        SearchOptions {
            case_sensitive: self.case_sensitive,
            whole_word: self.whole_word,
            use_regex: self.use_regex,
            ignore_accents: self.ignore_accents,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.txt".to_string(), "**/*.md".to_string()]
}
fn default_max_file_bytes() -> u64 {
    10 * 1024 * 1024
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.search.limit == Some(0) {
        anyhow::bail!("search.limit must be >= 1");
    }

    if config.ingest.max_file_bytes == 0 {
        anyhow::bail!("ingest.max_file_bytes must be > 0");
    }

    for pattern in config
        .ingest
        .include_globs
        .iter()
        .chain(&config.ingest.exclude_globs)
    {
        Glob::new(pattern).with_context(|| format!("Invalid ingest glob: '{}'", pattern))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let file = write_config("[db]\npath = \"./data/paraseek.sqlite\"\n");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.db.path, PathBuf::from("./data/paraseek.sqlite"));
        assert_eq!(config.search.options(), SearchOptions::default());
        assert_eq!(config.search.limit, None);
        assert_eq!(config.ingest.include_globs, vec!["**/*.txt", "**/*.md"]);
        assert_eq!(config.ingest.max_file_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_search_section() {
        let file = write_config(
            "[db]\npath = \"x.sqlite\"\n\n[search]\nwhole_word = true\nignore_accents = true\nlimit = 20\n",
        );
        let config = load_config(file.path()).unwrap();
        let options = config.search.options();

        assert!(options.whole_word);
        assert!(options.ignore_accents);
        assert!(!options.use_regex);
        assert_eq!(config.search.limit, Some(20));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let file = write_config("[db]\npath = \"x.sqlite\"\n\n[search]\nlimit = 0\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("search.limit"));
    }

    #[test]
    fn test_bad_glob_rejected() {
        let file = write_config("[db]\npath = \"x.sqlite\"\n\n[ingest]\ninclude_globs = [\"a/{b\"]\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_missing_db_section() {
        let file = write_config("[search]\nlimit = 5\n");
        assert!(load_config(file.path()).is_err());
    }
}

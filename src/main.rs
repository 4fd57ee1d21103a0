//! # paraseek CLI
//!
//! The `paraseek` binary loads text and source files into a SQLite
//! library, searches them paragraph by paragraph, and edits single
//! paragraphs in place.
//!
//! ## Usage
//!
//! ```bash
//! paraseek --config ./config/paraseek.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `paraseek init` | Create the SQLite database and schema |
//! | `paraseek add <paths..>` | Load files or directories |
//! | `paraseek list` | List stored files |
//! | `paraseek remove <name>` | Remove one file |
//! | `paraseek clear` | Remove every file |
//! | `paraseek search "<query>"` | Ranked paragraph search |
//! | `paraseek get <name>` | Show a file and its paragraph ids |
//! | `paraseek edit <name> --id <id> --with <text>` | Replace a paragraph |
//! | `paraseek delete <name> --id <id>` | Delete a paragraph |
//! | `paraseek insert <name> --at <index> <text>` | Insert a paragraph |
//! | `paraseek context <name> --id <id>` | Show the enclosing function or class |
//! | `paraseek export results "<query>"` | Export search results as text |
//! | `paraseek export file <name>` | Export a file's current content |
//! | `paraseek stats` | Library overview |

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use paraseek::{config, edit, export, files, get, ingest, logging, migrate, search, stats};
use paraseek_core::models::ParagraphId;
use paraseek_core::mutate::InsertPosition;
use paraseek_core::search::SizeFilter;

/// paraseek: paragraph-level search and editing for text and source files.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/paraseek.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "paraseek",
    about = "Paragraph-level search, highlighting, and editing for text and source files",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/paraseek.toml")]
    config: PathBuf,

    /// Log level when `RUST_LOG` is not set (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Query flags shared by `search` and `export results`.
#[derive(clap::Args, Clone)]
struct QueryArgs {
    /// The search query: terms, a "quoted phrase", or a regex with `--regex`.
    query: String,

    /// Match case exactly.
    #[arg(long, overrides_with = "no_case_sensitive")]
    case_sensitive: bool,

    /// Ignore case even if `search.case_sensitive` is set.
    #[arg(long, overrides_with = "case_sensitive")]
    no_case_sensitive: bool,

    /// Only match whole words.
    #[arg(long, overrides_with = "no_whole_word")]
    whole_word: bool,

    #[arg(long, overrides_with = "whole_word", hide = true)]
    no_whole_word: bool,

    /// Treat the query as a regular expression.
    #[arg(long, overrides_with = "no_regex")]
    regex: bool,

    #[arg(long, overrides_with = "regex", hide = true)]
    no_regex: bool,

    /// Match regardless of accents (`café` finds `cafe`).
    #[arg(long, overrides_with = "no_ignore_accents")]
    ignore_accents: bool,

    #[arg(long, overrides_with = "ignore_accents", hide = true)]
    no_ignore_accents: bool,

    /// Paragraph size filter: all, small (< 5 lines), medium (5-15), large (> 15).
    #[arg(long, default_value = "all")]
    size: SizeFilter,

    /// Maximum number of results. Overrides `search.limit`.
    #[arg(long)]
    limit: Option<usize>,
}

impl QueryArgs {
    fn into_search_args(self, highlight: bool, json: bool, stats: bool) -> search::SearchArgs {
        search::SearchArgs {
            query: self.query,
            options: search::OptionOverrides {
                case_sensitive: switch(self.case_sensitive, self.no_case_sensitive),
                whole_word: switch(self.whole_word, self.no_whole_word),
                use_regex: switch(self.regex, self.no_regex),
                ignore_accents: switch(self.ignore_accents, self.no_ignore_accents),
            },
            size: self.size,
            limit: self.limit,
            highlight,
            json,
            stats,
        }
    }
}

/// A `--flag` / `--no-flag` pair; neither leaves the config value alone.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// How a paragraph is targeted by `edit` and `delete`.
#[derive(clap::Args)]
#[group(required = true, multiple = false)]
struct Target {
    /// Paragraph id as shown by `get` or `search` (e.g. `p120`).
    #[arg(long)]
    id: Option<ParagraphId>,

    /// Exact paragraph text; the first occurrence is used.
    #[arg(long)]
    paragraph: Option<String>,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the `files` table. This
    /// command is idempotent.
    Init,

    /// Load files or directories into the library.
    ///
    /// Directories are walked recursively and filtered by the
    /// `[ingest]` globs. A file with the same name replaces the stored
    /// one; unchanged files are skipped.
    Add {
        /// Files or directories to load.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// List stored files.
    List,

    /// Remove a file from the library.
    Remove {
        /// Stored file name.
        name: String,
    },

    /// Remove every file from the library.
    Clear,

    /// Search paragraphs across all stored files.
    ///
    /// Results are ranked by the number of matches in each paragraph.
    Search {
        #[command(flatten)]
        query: QueryArgs,

        /// Mark matches with `<span class="highlight">` (HTML-escaped output).
        #[arg(long)]
        highlight: bool,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,

        /// Append per-file occurrence totals.
        #[arg(long)]
        stats: bool,
    },

    /// Show a stored file with its paragraph ids.
    Get {
        /// Stored file name.
        name: String,

        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Replace one paragraph of a file.
    Edit {
        /// Stored file name.
        file: String,

        #[command(flatten)]
        target: Target,

        /// Replacement text.
        #[arg(long = "with")]
        replacement: String,
    },

    /// Delete one paragraph of a file.
    Delete {
        /// Stored file name.
        file: String,

        #[command(flatten)]
        target: Target,
    },

    /// Insert a new paragraph into a file.
    Insert {
        /// Stored file name.
        file: String,

        /// `start`, `end`, `-1` (before all), or `N` (after paragraph N).
        #[arg(long, allow_hyphen_values = true)]
        at: InsertPosition,

        /// Paragraph text.
        text: String,
    },

    /// Show the function or class that encloses a paragraph.
    Context {
        /// Stored file name.
        file: String,

        /// Paragraph id.
        #[arg(long)]
        id: ParagraphId,
    },

    /// Export search results or a file as plain text.
    Export {
        #[command(subcommand)]
        what: ExportTarget,
    },

    /// Show library statistics.
    Stats,

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: clap_complete::Shell,
    },
}

/// Export subcommands.
#[derive(Subcommand)]
enum ExportTarget {
    /// Export the results of a search.
    Results {
        #[command(flatten)]
        query: QueryArgs,

        /// Layout: `report` (numbered blocks) or `snippets` (`//` headers).
        #[arg(long, value_enum, default_value_t = export::ExportFormat::Report)]
        format: export::ExportFormat,

        /// Output file or directory. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Export a stored file's current content.
    File {
        /// Stored file name.
        name: String,

        /// Output file. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level)?;

    if let Commands::Completions { shell } = &cli.command {
        clap_complete::generate(
            *shell,
            &mut Cli::command(),
            "paraseek",
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Add { paths } => {
            ingest::run_add(&cfg, &paths).await?;
        }
        Commands::List => {
            files::run_list(&cfg).await?;
        }
        Commands::Remove { name } => {
            files::run_remove(&cfg, &name).await?;
        }
        Commands::Clear => {
            files::run_clear(&cfg).await?;
        }
        Commands::Search {
            query,
            highlight,
            json,
            stats,
        } => {
            let args = query.into_search_args(highlight, json, stats);
            search::run_search(&cfg, &args).await?;
        }
        Commands::Get { name, json } => {
            get::run_get(&cfg, &name, json).await?;
        }
        Commands::Edit {
            file,
            target,
            replacement,
        } => {
            let locator = require_locator(target)?;
            edit::run_edit(&cfg, &file, &locator, &replacement).await?;
        }
        Commands::Delete { file, target } => {
            let locator = require_locator(target)?;
            edit::run_delete(&cfg, &file, &locator).await?;
        }
        Commands::Insert { file, at, text } => {
            edit::run_insert(&cfg, &file, at, &text).await?;
        }
        Commands::Context { file, id } => {
            get::run_context(&cfg, &file, id).await?;
        }
        Commands::Export { what } => match what {
            ExportTarget::Results {
                query,
                format,
                output,
            } => {
                let args = query.into_search_args(false, false, false);
                export::run_export_results(&cfg, &args, format, output.as_deref()).await?;
            }
            ExportTarget::File { name, output } => {
                export::run_export_file(&cfg, &name, output.as_deref()).await?;
            }
        },
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}

fn require_locator(target: Target) -> anyhow::Result<paraseek_core::mutate::ParagraphLocator> {
    edit::locator(target.id, target.paragraph)
        .ok_or_else(|| anyhow::anyhow!("one of --id or --paragraph is required"))
}

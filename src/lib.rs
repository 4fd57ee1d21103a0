//! # paraseek
//!
//! Paragraph-level search, highlighting, and editing for text and
//! source files, backed by SQLite.
//!
//! Files are split into paragraphs by [`paraseek_core::segment`]
//! (prose by sentence and length, code by brace-balanced structure),
//! searched with a regex-compiled query, and edited one paragraph at a
//! time with every change written back to the database.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌──────────┐
//! │  add       │──▶│   Segmenter  │──▶│  SQLite  │
//! │ files/dirs │   │ prose + code │   │  files   │
//! └────────────┘   └──────────────┘   └────┬─────┘
//!                                          │
//!                      ┌───────────────────┤
//!                      ▼                   ▼
//!                 ┌──────────┐       ┌──────────┐
//!                 │  search  │       │   edit   │
//!                 │ highlight│       │  delete  │
//!                 └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! paraseek init                          # create database
//! paraseek add ./docs ./src/app.js       # load files
//! paraseek search "deploy" --whole-word  # ranked paragraphs
//! paraseek edit app.js --id p120 --with "..."
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite `FileStore` backend |
//! | [`ingest`] | Loading files and directories |
//! | [`search`] | Search command and output |
//! | [`get`] | File and context retrieval |
//! | [`edit`] | Paragraph edit, delete, insert |
//! | [`export`] | Text export of results and files |
//! | [`stats`] | Library overview |

pub mod config;
pub mod db;
pub mod edit;
pub mod export;
pub mod files;
pub mod get;
pub mod ingest;
pub mod logging;
pub mod migrate;
pub mod search;
pub mod sqlite_store;
pub mod stats;

//! Storage abstraction for paraseek.
//!
//! The [`FileStore`] trait is the only seam between the core library
//! and persistence. Records are keyed by `name`; the store assigns an
//! opaque [`FileId`] on first save. Backends:
//!
//! - [`memory::InMemoryStore`] for tests and WASM targets.
//! - The SQLite store in the `paraseek` app crate.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.
//! Misses are `Ok(None)`, not errors.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{FileId, FileRecord};

/// Abstract persistence for file records.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`get`](FileStore::get) | Fetch a record by file name |
/// | [`get_by_id`](FileStore::get_by_id) | Fetch a record by storage id |
/// | [`put`](FileStore::put) | Insert or update a record |
/// | [`delete`](FileStore::delete) | Remove a record by id |
/// | [`clear`](FileStore::clear) | Remove every record |
/// | [`list_all`](FileStore::list_all) | Every stored record |
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<FileRecord>>;

    async fn get_by_id(&self, id: &str) -> Result<Option<FileRecord>>;

    /// Insert or update a record.
    ///
    /// A record without an id whose name is already stored updates the
    /// existing row. Returns the id the record is stored under.
    async fn put(&self, record: &FileRecord) -> Result<FileId>;

    /// Remove a record. Deleting an unknown id is not an error.
    async fn delete(&self, id: &str) -> Result<()>;

    async fn clear(&self) -> Result<()>;

    /// Every stored record, ordered by name.
    async fn list_all(&self) -> Result<Vec<FileRecord>>;
}

//! SQLite-backed [`FileStore`] implementation.
//!
//! Each record is one row of the `files` table. The paragraph cache is
//! stored as a JSON array next to the content so that loading a library
//! does not re-run the segmenter; a SHA-256 of the content lets `add`
//! skip files that did not change.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use paraseek_core::library::Library;
use paraseek_core::models::{FileId, FileRecord};
use paraseek_core::store::FileStore;

use crate::config::Config;
use crate::{db, migrate};

/// SQLite implementation of the [`FileStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Stored content hash for `name`, without loading the content.
    pub async fn content_hash(&self, name: &str) -> Result<Option<String>> {
        let hash: Option<String> =
            sqlx::query_scalar("SELECT content_hash FROM files WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(hash)
    }
}

/// Connect, make sure the schema exists, and load every stored file.
pub async fn open_library(config: &Config) -> Result<Library<SqliteStore>> {
    let pool = db::connect(config).await?;
    migrate::apply(&pool).await?;

    let mut library = Library::new(SqliteStore::new(pool));
    library.load().await?;
    Ok(library)
}

pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

const SELECT_FILES: &str =
    "SELECT id, name, content, paragraphs_json, updated_at FROM files";

fn row_to_record(row: &SqliteRow) -> Result<FileRecord> {
    let id: String = row.get("id");
    let paragraphs_json: String = row.get("paragraphs_json");
    let updated_at: i64 = row.get("updated_at");

    let paragraphs: Vec<String> = serde_json::from_str(&paragraphs_json)
        .with_context(|| format!("Corrupt paragraph cache for file {}", id))?;
    let date = DateTime::<Utc>::from_timestamp(updated_at, 0)
        .ok_or_else(|| anyhow!("Invalid updated_at {} for file {}", updated_at, id))?;

    Ok(FileRecord {
        id: Some(id),
        name: row.get("name"),
        content: row.get("content"),
        paragraphs,
        date,
    })
}

#[async_trait]
impl FileStore for SqliteStore {
    async fn get(&self, name: &str) -> Result<Option<FileRecord>> {
        let row = sqlx::query(&format!("{} WHERE name = ?", SELECT_FILES))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_record).transpose()
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<FileRecord>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_FILES))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_record).transpose()
    }

    async fn put(&self, record: &FileRecord) -> Result<FileId> {
        let mut tx = self.pool.begin().await?;

        let id = match &record.id {
            Some(id) => id.clone(),
            None => {
                let existing: Option<String> =
                    sqlx::query_scalar("SELECT id FROM files WHERE name = ?")
                        .bind(&record.name)
                        .fetch_optional(&mut *tx)
                        .await?;
                existing.unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
            }
        };

        let paragraphs_json = serde_json::to_string(&record.paragraphs)?;

        sqlx::query(
            r#"
            INSERT INTO files (id, name, content, paragraphs_json, content_hash, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                content = excluded.content,
                paragraphs_json = excluded.paragraphs_json,
                content_hash = excluded.content_hash,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(&record.name)
        .bind(&record.content)
        .bind(&paragraphs_json)
        .bind(hash_content(&record.content))
        .bind(record.date.timestamp())
        .execute(&mut *tx)
        .await
        .map_err(|e| anyhow!("Failed to store file '{}': {}", record.name, e))?;

        tx.commit().await?;
        Ok(id)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM files").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<FileRecord>> {
        let rows = sqlx::query(&format!("{} ORDER BY name", SELECT_FILES))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_record).collect()
    }
}

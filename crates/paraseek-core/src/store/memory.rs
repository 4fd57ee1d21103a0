//! In-memory [`FileStore`] implementation for testing and WASM targets.
//!
//! Records live in a `HashMap` keyed by id behind `std::sync::RwLock`.
//! Name lookups are a linear scan, which is fine at test scale.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{FileId, FileRecord};

use super::FileStore;

/// In-memory store for testing and WASM environments.
pub struct InMemoryStore {
    files: RwLock<HashMap<FileId, FileRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<FileId, FileRecord>>> {
        self.files.read().map_err(|_| anyhow!("in-memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<FileId, FileRecord>>> {
        self.files.write().map_err(|_| anyhow!("in-memory store lock poisoned"))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileStore for InMemoryStore {
    async fn get(&self, name: &str) -> Result<Option<FileRecord>> {
        let files = self.read()?;
        Ok(files.values().find(|f| f.name == name).cloned())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<FileRecord>> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn put(&self, record: &FileRecord) -> Result<FileId> {
        let mut files = self.write()?;

        let id = match &record.id {
            Some(id) => id.clone(),
            None => files
                .values()
                .find(|f| f.name == record.name)
                .and_then(|f| f.id.clone())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        };

        if files
            .values()
            .any(|f| f.name == record.name && f.id.as_deref() != Some(id.as_str()))
        {
            return Err(anyhow!("a different file named '{}' is already stored", record.name));
        }

        let mut stored = record.clone();
        stored.id = Some(id.clone());
        files.insert(id.clone(), stored);
        Ok(id)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.write()?.remove(id);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.write()?.clear();
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<FileRecord>> {
        let mut all: Vec<FileRecord> = self.read()?.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_assigns_id_and_get_by_name() {
        let store = InMemoryStore::new();
        let id = store.put(&FileRecord::new("a.txt", "alpha")).await.unwrap();

        let fetched = store.get("a.txt").await.unwrap().unwrap();
        assert_eq!(fetched.id.as_deref(), Some(id.as_str()));
        assert_eq!(fetched.content, "alpha");
        assert!(store.get("missing.txt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_same_name_updates_in_place() {
        let store = InMemoryStore::new();
        let first = store.put(&FileRecord::new("a.txt", "one")).await.unwrap();
        let second = store.put(&FileRecord::new("a.txt", "two")).await.unwrap();

        assert_eq!(first, second);
        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].content, "two");
    }

    #[tokio::test]
    async fn test_rename_collision_is_rejected() {
        let store = InMemoryStore::new();
        store.put(&FileRecord::new("a.txt", "one")).await.unwrap();
        let id_b = store.put(&FileRecord::new("b.txt", "two")).await.unwrap();

        let mut renamed = store.get_by_id(&id_b).await.unwrap().unwrap();
        renamed.name = "a.txt".to_string();
        assert!(store.put(&renamed).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let store = InMemoryStore::new();
        let id = store.put(&FileRecord::new("a.txt", "one")).await.unwrap();
        store.put(&FileRecord::new("b.txt", "two")).await.unwrap();

        store.delete(&id).await.unwrap();
        store.delete("unknown").await.unwrap();
        assert!(store.get_by_id(&id).await.unwrap().is_none());
        assert_eq!(store.list_all().await.unwrap().len(), 1);

        store.clear().await.unwrap();
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_all_sorted_by_name() {
        let store = InMemoryStore::new();
        for name in ["c.txt", "a.txt", "b.txt"] {
            store.put(&FileRecord::new(name, name)).await.unwrap();
        }
        let names: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }
}

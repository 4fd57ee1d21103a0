//! The library: loaded files, the live result list, and the store
//! they are persisted to.
//!
//! Every mutation is a read-modify-write round trip against the
//! [`FileStore`]:
//!
//! 1. `get` the current record by name (a miss aborts with
//!    [`Error::FileNotFound`]).
//! 2. Apply the [`mutate`] operation to the stored content.
//! 3. `put` the new content and re-derived paragraphs.
//! 4. Only after `put` succeeds, refresh the in-memory file and re-point
//!    the live results at the new paragraph ids.
//!
//! Mutating methods take `&mut self`, so one library never runs two
//! mutations at once. Concurrent writers through separate libraries
//! sharing one store are last-write-wins.

use std::ops::Range;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{FileRecord, Paragraph, SearchResult};
use crate::mutate::{self, InsertPosition, Mutation, ParagraphLocator};
use crate::query::{compile, SearchOptions};
use crate::search::search_with;
use crate::store::FileStore;

pub struct Library<S: FileStore> {
    store: S,
    files: Vec<FileRecord>,
    results: Vec<SearchResult>,
}

impl<S: FileStore> Library<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            files: Vec::new(),
            results: Vec::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace the in-memory file set with everything in the store.
    ///
    /// Records whose paragraph cache is missing are re-segmented.
    pub async fn load(&mut self) -> Result<usize> {
        let mut files = self.store.list_all().await.map_err(Error::Storage)?;
        for file in files.iter_mut().filter(|f| f.paragraphs.is_empty()) {
            file.resegment();
        }
        debug!(files = files.len(), "library loaded");
        self.files = files;
        self.results.clear();
        Ok(self.files.len())
    }

    /// Segment and store a file, replacing any file with the same name.
    pub async fn add_file(&mut self, name: &str, content: &str) -> Result<&FileRecord> {
        let mut record = FileRecord::new(name, content);
        if let Some(existing) = self.store.get(name).await.map_err(Error::Storage)? {
            record.id = existing.id;
        }
        let id = self.store.put(&record).await.map_err(Error::Storage)?;
        record.id = Some(id);

        info!(
            file = name,
            paragraphs = record.paragraphs.len(),
            "file stored"
        );
        self.results.retain(|r| r.file.as_deref() != Some(name));
        Ok(self.replace_loaded(record))
    }

    pub async fn remove_file(&mut self, name: &str) -> Result<()> {
        let record = self.fetch(name).await?;
        if let Some(id) = &record.id {
            self.store.delete(id).await.map_err(Error::Storage)?;
        }
        info!(file = name, "file removed");
        self.files.retain(|f| f.name != name);
        self.results.retain(|r| r.file.as_deref() != Some(name));
        Ok(())
    }

    pub async fn clear(&mut self) -> Result<()> {
        self.store.clear().await.map_err(Error::Storage)?;
        info!("library cleared");
        self.files.clear();
        self.results.clear();
        Ok(())
    }

    /// Run a query over every loaded file and keep the ranked results.
    ///
    /// An invalid pattern yields a single error row instead of failing.
    /// An empty query or an empty library yields no results.
    pub fn search(&mut self, query: &str, options: &SearchOptions) -> &[SearchResult] {
        self.results = if self.files.is_empty() {
            Vec::new()
        } else {
            match compile(query, options) {
                Ok(pattern) => search_with(&self.files, &pattern, options.ignore_accents),
                Err(Error::EmptyQuery) => Vec::new(),
                Err(err) => {
                    warn!(query, error = %err, "search pattern rejected");
                    vec![SearchResult::pattern_error(err)]
                }
            }
        };
        &self.results
    }

    /// Replace one paragraph of `file` with `replacement`.
    pub async fn edit_paragraph(
        &mut self,
        file: &str,
        locator: &ParagraphLocator,
        replacement: &str,
    ) -> Result<&FileRecord> {
        let record = self.fetch(file).await?;
        let mutation = mutate::replace_paragraph(&record, locator, replacement)?;
        self.commit(record, mutation).await
    }

    /// Remove one paragraph of `file`.
    pub async fn delete_paragraph(
        &mut self,
        file: &str,
        locator: &ParagraphLocator,
    ) -> Result<&FileRecord> {
        let record = self.fetch(file).await?;
        let mutation = mutate::delete_paragraph(&record, locator)?;
        self.commit(record, mutation).await
    }

    /// Insert a new paragraph into `file`.
    pub async fn insert_paragraph(
        &mut self,
        file: &str,
        position: InsertPosition,
        text: &str,
    ) -> Result<&FileRecord> {
        let record = self.fetch(file).await?;
        let mutation = mutate::insert_paragraph(&record, position, text)?;
        self.commit(record, mutation).await
    }

    pub fn file(&self, name: &str) -> Option<&FileRecord> {
        self.files.iter().find(|f| f.name == name)
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    async fn fetch(&self, name: &str) -> Result<FileRecord> {
        self.store
            .get(name)
            .await
            .map_err(Error::Storage)?
            .ok_or_else(|| Error::FileNotFound(name.to_string()))
    }

    async fn commit(&mut self, mut record: FileRecord, mutation: Mutation) -> Result<&FileRecord> {
        let Mutation {
            content,
            paragraphs,
            span,
            target,
        } = mutation;
        let target = target.and_then(|range| target_paragraph(&record, &range));
        record.content = content;
        record.paragraphs = paragraphs;
        record.date = chrono::Utc::now();

        let id = self.store.put(&record).await.map_err(Error::Storage)?;
        record.id = Some(id);
        info!(
            file = %record.name,
            paragraphs = record.paragraphs.len(),
            "file updated"
        );

        self.repoint_results(&record, target.as_ref(), span);
        Ok(self.replace_loaded(record))
    }

    /// Re-point the live results for `record` at its new paragraphs.
    ///
    /// The edited paragraph follows the mutated span; every other result
    /// is matched to an unclaimed paragraph with identical text. Results
    /// with no counterpart (deleted paragraphs) drop out.
    fn repoint_results(
        &mut self,
        record: &FileRecord,
        target: Option<&Paragraph>,
        span: Option<Range<usize>>,
    ) {
        let spans = record.paragraph_spans();
        let mut claimed = vec![false; spans.len()];

        let edited = span.and_then(|span| {
            spans
                .iter()
                .position(|p| span.contains(&p.id.offset()))
        });
        if let Some(i) = edited {
            claimed[i] = true;
        }

        let before = self.results.len();
        self.results.retain_mut(|result| {
            if result.file.as_deref() != Some(record.name.as_str()) {
                return true;
            }

            let is_target = target.is_some_and(|t| match result.paragraph_id {
                Some(id) => id == t.id,
                None => result.paragraph == t.text,
            });
            let found = if is_target {
                edited
            } else {
                let found = spans
                    .iter()
                    .enumerate()
                    .find(|(i, p)| !claimed[*i] && p.text == result.paragraph)
                    .map(|(i, _)| i);
                if let Some(i) = found {
                    claimed[i] = true;
                }
                found
            };

            match found {
                Some(i) => {
                    result.paragraph = spans[i].text.clone();
                    result.paragraph_id = Some(spans[i].id);
                    true
                }
                None => false,
            }
        });
        debug!(
            file = %record.name,
            dropped = before - self.results.len(),
            "results re-pointed"
        );
    }

    fn replace_loaded(&mut self, record: FileRecord) -> &FileRecord {
        let index = match self.files.iter().position(|f| f.name == record.name) {
            Some(i) => {
                self.files[i] = record;
                i
            }
            None => {
                self.files.push(record);
                self.files.len() - 1
            }
        };
        &self.files[index]
    }
}

/// The first paragraph overlapping the byte range a mutation matched.
fn target_paragraph(record: &FileRecord, range: &Range<usize>) -> Option<Paragraph> {
    record.paragraph_spans().into_iter().find(|p| {
        let own = p.range();
        own.start < range.end.max(range.start + 1) && range.start < own.end
    })
}

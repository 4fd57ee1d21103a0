//! Core data models: file records, paragraphs, and search results.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::segment;

/// Opaque storage identifier, assigned by the [`FileStore`](crate::store::FileStore)
/// on first save.
pub type FileId = String;

/// A loaded file and its derived paragraph cache.
///
/// `name` is the unique key: at most one record per name is live in
/// memory and in storage. `paragraphs` is never patched in place; it is
/// recomputed from `content` whenever the content changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: Option<FileId>,
    pub name: String,
    pub content: String,
    pub paragraphs: Vec<String>,
    pub date: DateTime<Utc>,
}

impl FileRecord {
    /// Build an unsaved record, segmenting `content` immediately.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let paragraphs = segment::segment(&content);
        Self {
            id: None,
            name: name.into(),
            content,
            paragraphs,
            date: Utc::now(),
        }
    }

    /// Replace the content and re-derive the paragraph cache.
    pub fn set_content(&mut self, content: String) {
        self.content = content;
        self.resegment();
    }

    pub fn resegment(&mut self) {
        self.paragraphs = segment::segment(&self.content);
    }

    /// Locate each cached paragraph in `content`.
    ///
    /// Each paragraph is searched for after the end of the previous one,
    /// so duplicates resolve to distinct positions. A cached paragraph
    /// that cannot be found (a stale cache) has no id.
    pub fn locate_paragraphs(&self) -> Vec<Option<ParagraphId>> {
        let mut cursor = 0;
        self.paragraphs
            .iter()
            .map(|text| {
                let offset = cursor + self.content.get(cursor..)?.find(text.as_str())?;
                cursor = offset + text.len();
                Some(ParagraphId(offset))
            })
            .collect()
    }

    /// The cached paragraphs that could be located, with their ids.
    pub fn paragraph_spans(&self) -> Vec<Paragraph> {
        self.paragraphs
            .iter()
            .zip(self.locate_paragraphs())
            .filter_map(|(text, id)| id.map(|id| (text, id)))
            .enumerate()
            .map(|(index, (text, id))| Paragraph {
                id,
                index,
                text: text.clone(),
            })
            .collect()
    }

    /// Look up a cached paragraph by id.
    pub fn paragraph(&self, id: ParagraphId) -> Option<Paragraph> {
        self.paragraph_spans().into_iter().find(|p| p.id == id)
    }
}

/// Stable identifier of a paragraph within one version of a file's content.
///
/// The id is the byte offset of the paragraph's first character. It is
/// rendered as `p<offset>` and changes whenever earlier content changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParagraphId(pub usize);

impl ParagraphId {
    pub fn offset(self) -> usize {
        self.0
    }
}

impl fmt::Display for ParagraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

impl FromStr for ParagraphId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('p').unwrap_or(s);
        digits
            .parse::<usize>()
            .map(ParagraphId)
            .map_err(|_| format!("invalid paragraph id: '{}' (expected p<offset>)", s))
    }
}

/// A paragraph as produced by the segmenter: trimmed text plus position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub id: ParagraphId,
    /// Position in the file's paragraph sequence.
    pub index: usize,
    pub text: String,
}

impl Paragraph {
    /// Byte range of the paragraph inside the content it was cut from.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.id.0..self.id.0 + self.text.len()
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }
}

/// One ranked hit: a paragraph and how many times the query matched in it.
///
/// `file == None` marks the synthetic row produced when the query could
/// not be compiled; its `paragraph` carries the error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub file: Option<String>,
    pub paragraph: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph_id: Option<ParagraphId>,
    pub relevance: usize,
}

impl SearchResult {
    pub fn pattern_error(message: impl fmt::Display) -> Self {
        Self {
            file: None,
            paragraph: format!("Invalid search expression: {}", message),
            paragraph_id: None,
            relevance: 0,
        }
    }

    pub fn is_error(&self) -> bool {
        self.file.is_none()
    }

    pub fn line_count(&self) -> usize {
        self.paragraph.split('\n').count()
    }
}

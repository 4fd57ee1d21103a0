//! Paragraph-level edits of a file's content.
//!
//! Every operation takes the current [`FileRecord`], produces the new
//! full content, and re-derives the paragraph sequence from it with the
//! segmenter. Nothing is written here; persisting the [`Mutation`] is
//! the caller's job (see [`Library`](crate::library::Library)).
//!
//! Replace and delete patch the located byte range and keep the rest
//! of the content byte-for-byte. Insert rebuilds the whole content from
//! the paragraph list joined by blank lines, so original inter-paragraph
//! formatting is not preserved on that path.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{FileRecord, ParagraphId};
use crate::segment::segment;

/// How a mutation finds its target paragraph.
///
/// Ids are exact. Text is the fallback for callers that only kept the
/// paragraph string; it matches the first verbatim occurrence, which
/// may be the wrong one when the text repeats in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParagraphLocator {
    Id(ParagraphId),
    Text(String),
}

impl From<ParagraphId> for ParagraphLocator {
    fn from(id: ParagraphId) -> Self {
        ParagraphLocator::Id(id)
    }
}

impl From<&str> for ParagraphLocator {
    fn from(text: &str) -> Self {
        ParagraphLocator::Text(text.to_string())
    }
}

impl From<String> for ParagraphLocator {
    fn from(text: String) -> Self {
        ParagraphLocator::Text(text)
    }
}

/// Where a new paragraph goes, relative to the current paragraph list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsertPosition {
    Start,
    /// After the paragraph at this index; past the end means append.
    After(usize),
    End,
}

impl InsertPosition {
    /// `-1` (or any negative index) inserts first, `n` after paragraph `n`.
    pub fn from_index(index: i64) -> Self {
        if index < 0 {
            InsertPosition::Start
        } else {
            InsertPosition::After(index as usize)
        }
    }

    fn slot(self, len: usize) -> usize {
        match self {
            InsertPosition::Start => 0,
            InsertPosition::After(n) if n < len => n + 1,
            InsertPosition::After(_) | InsertPosition::End => len,
        }
    }
}

impl FromStr for InsertPosition {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "start" => Ok(InsertPosition::Start),
            "end" => Ok(InsertPosition::End),
            other => other
                .parse::<i64>()
                .map(InsertPosition::from_index)
                .map_err(|_| format!("invalid position: '{}' (use start, end, or an index)", other)),
        }
    }
}

impl fmt::Display for InsertPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertPosition::Start => f.write_str("start"),
            InsertPosition::After(n) => write!(f, "after paragraph {}", n),
            InsertPosition::End => f.write_str("end"),
        }
    }
}

/// New content plus the paragraphs derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub content: String,
    pub paragraphs: Vec<String>,
    /// Where the replaced or inserted text sits in `content`. `None` for deletes.
    pub span: Option<Range<usize>>,
    /// The byte range the locator matched in the old content. `None` for inserts.
    pub target: Option<Range<usize>>,
}

impl Mutation {
    fn from_content(
        content: String,
        span: Option<Range<usize>>,
        target: Option<Range<usize>>,
    ) -> Self {
        let paragraphs = segment(&content);
        Self {
            content,
            paragraphs,
            span,
            target,
        }
    }
}

/// Replace the located paragraph with `replacement`.
pub fn replace_paragraph(
    record: &FileRecord,
    locator: &ParagraphLocator,
    replacement: &str,
) -> Result<Mutation> {
    let range = locate(record, locator)?;
    let mut content =
        String::with_capacity(record.content.len() - range.len() + replacement.len());
    content.push_str(&record.content[..range.start]);
    content.push_str(replacement);
    content.push_str(&record.content[range.end..]);
    let span = range.start..range.start + replacement.len();
    Ok(Mutation::from_content(content, Some(span), Some(range)))
}

/// Remove the located paragraph, leaving one blank line between the
/// surrounding text.
///
/// A paragraph preceded only by whitespace is cut together with the
/// whitespace that follows it; one followed only by whitespace is cut
/// together with the whitespace before it.
pub fn delete_paragraph(record: &FileRecord, locator: &ParagraphLocator) -> Result<Mutation> {
    let content = &record.content;
    let range = match locator {
        ParagraphLocator::Text(text) if !text.is_empty() && content.starts_with(text.as_str()) => {
            0..text.len()
        }
        ParagraphLocator::Text(text) if !text.is_empty() && content.ends_with(text.as_str()) => {
            content.len() - text.len()..content.len()
        }
        _ => locate(record, locator)?,
    };

    let before = &content[..range.start];
    let after = &content[range.end..];
    let remaining = match (before.trim().is_empty(), after.trim().is_empty()) {
        (true, true) => String::new(),
        (true, false) => after.trim_start().to_string(),
        (false, true) => before.trim_end().to_string(),
        (false, false) => format!("{}\n\n{}", before.trim_end(), after.trim_start()),
    };
    Ok(Mutation::from_content(remaining, None, Some(range)))
}

/// Insert `text` as a new paragraph and rebuild the content.
pub fn insert_paragraph(
    record: &FileRecord,
    position: InsertPosition,
    text: &str,
) -> Result<Mutation> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::EmptyParagraph);
    }

    let mut paragraphs = if record.paragraphs.is_empty() {
        segment(&record.content)
    } else {
        record.paragraphs.clone()
    };
    let slot = position.slot(paragraphs.len());
    let start: usize = paragraphs[..slot].iter().map(|p| p.len() + 2).sum();
    paragraphs.insert(slot, text.to_string());

    let span = start..start + text.len();
    Ok(Mutation::from_content(paragraphs.join("\n\n"), Some(span), None))
}

/// Byte range of the target paragraph in `record.content`.
fn locate(record: &FileRecord, locator: &ParagraphLocator) -> Result<Range<usize>> {
    let found = match locator {
        ParagraphLocator::Id(id) => record.paragraph(*id).map(|p| p.range()),
        ParagraphLocator::Text(text) if text.is_empty() => None,
        ParagraphLocator::Text(text) => record
            .content
            .find(text.as_str())
            .map(|start| start..start + text.len()),
    };
    found.ok_or_else(|| Error::ParagraphNotFound {
        file: record.name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(content: &str) -> FileRecord {
        FileRecord::new("doc.txt", content)
    }

    #[test]
    fn test_replace_by_text() {
        let rec = record("alpha\n\nbeta\n\ngamma");
        let m = replace_paragraph(&rec, &"beta".into(), "BETA two").unwrap();
        assert_eq!(m.content, "alpha\n\nBETA two\n\ngamma");
        assert_eq!(&m.content[m.span.clone().unwrap()], "BETA two");
        assert_eq!(m.target, Some(7..11));
        assert_eq!(m.paragraphs, vec!["alpha", "BETA two", "gamma"]);
    }

    #[test]
    fn test_replace_by_id_targets_the_right_duplicate() {
        let rec = record("same\n\nsame\n\nsame");
        let second = rec.paragraph_spans()[1].id;
        let m = replace_paragraph(&rec, &second.into(), "changed").unwrap();
        assert_eq!(m.content, "same\n\nchanged\n\nsame");
    }

    #[test]
    fn test_text_locator_reports_first_occurrence() {
        let rec = record("foo bar\n\nfoo");
        let m = replace_paragraph(&rec, &"foo".into(), "baz").unwrap();
        assert_eq!(m.content, "baz bar\n\nfoo");
        assert_eq!(m.target, Some(0..3));
    }

    #[test]
    fn test_replace_keeps_surrounding_formatting() {
        let rec = record("  intro\n\n\n\nbody text\n");
        let m = replace_paragraph(&rec, &"body text".into(), "new body").unwrap();
        assert_eq!(m.content, "  intro\n\n\n\nnew body\n");
    }

    #[test]
    fn test_replace_missing_paragraph() {
        let rec = record("alpha");
        let err = replace_paragraph(&rec, &"omega".into(), "x").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_whole_content() {
        let content = "Only paragraph here";
        let rec = record(content);
        let m = delete_paragraph(&rec, &content.into()).unwrap();
        assert_eq!(m.content, "");
        assert!(m.paragraphs.is_empty());
    }

    #[test]
    fn test_delete_first() {
        let rec = record("first\n\n\nsecond\n\nthird");
        let m = delete_paragraph(&rec, &"first".into()).unwrap();
        assert_eq!(m.content, "second\n\nthird");
    }

    #[test]
    fn test_delete_last() {
        let rec = record("first\n\nsecond\n\nthird\n");
        let m = delete_paragraph(&rec, &"third".into()).unwrap();
        assert_eq!(m.content, "first\n\nsecond");
    }

    #[test]
    fn test_delete_interior_normalizes_gap() {
        let rec = record("first\n\n\n\nsecond  \n\n\nthird");
        let m = delete_paragraph(&rec, &"second".into()).unwrap();
        assert_eq!(m.content, "first\n\nthird");
        assert_eq!(m.paragraphs, vec!["first", "third"]);
    }

    #[test]
    fn test_delete_by_id_after_leading_blank_lines() {
        let rec = record("\n\nfirst\n\nsecond");
        let first = rec.paragraph_spans()[0].id;
        let m = delete_paragraph(&rec, &first.into()).unwrap();
        assert_eq!(m.content, "second");
    }

    #[test]
    fn test_delete_stale_reference_aborts() {
        let rec = record("first\n\nsecond");
        let err = delete_paragraph(&rec, &"gone".into()).unwrap_err();
        assert!(matches!(err, Error::ParagraphNotFound { .. }));
        let err = delete_paragraph(&rec, &ParagraphId(3).into()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_deleted_text_is_gone() {
        let rec = record("Hello world.\nMore text here.\n\nfunction foo() {\n  return 1;\n}\n\nTail.");
        for paragraph in rec.paragraphs.clone() {
            let m = delete_paragraph(&rec, &paragraph.as_str().into()).unwrap();
            assert!(!m.content.contains(&paragraph));
        }
    }

    #[test]
    fn test_insert_positions() {
        let rec = record("a\n\nb");
        let start = insert_paragraph(&rec, InsertPosition::from_index(-1), "new").unwrap();
        assert_eq!(start.content, "new\n\na\n\nb");
        let middle = insert_paragraph(&rec, InsertPosition::from_index(0), "new").unwrap();
        assert_eq!(middle.content, "a\n\nnew\n\nb");
        assert_eq!(middle.span, Some(3..6));
        let end = insert_paragraph(&rec, InsertPosition::from_index(2), "new").unwrap();
        assert_eq!(end.content, "a\n\nb\n\nnew");
        let explicit_end = insert_paragraph(&rec, InsertPosition::End, "new").unwrap();
        assert_eq!(explicit_end.paragraphs, vec!["a", "b", "new"]);
    }

    #[test]
    fn test_insert_rebuilds_formatting() {
        let rec = record("a\n\n\n\nb\n");
        let m = insert_paragraph(&rec, InsertPosition::End, "  c  ").unwrap();
        assert_eq!(m.content, "a\n\nb\n\nc");
    }

    #[test]
    fn test_insert_into_empty_file() {
        let rec = record("");
        let m = insert_paragraph(&rec, InsertPosition::Start, "first").unwrap();
        assert_eq!(m.content, "first");
    }

    #[test]
    fn test_insert_rejects_blank_text() {
        let rec = record("a");
        assert!(matches!(
            insert_paragraph(&rec, InsertPosition::End, " \n "),
            Err(Error::EmptyParagraph)
        ));
    }

    #[test]
    fn test_position_parsing() {
        assert_eq!("start".parse::<InsertPosition>().unwrap(), InsertPosition::Start);
        assert_eq!("end".parse::<InsertPosition>().unwrap(), InsertPosition::End);
        assert_eq!("-1".parse::<InsertPosition>().unwrap(), InsertPosition::Start);
        assert_eq!("3".parse::<InsertPosition>().unwrap(), InsertPosition::After(3));
        assert!("middle".parse::<InsertPosition>().is_err());
    }
}

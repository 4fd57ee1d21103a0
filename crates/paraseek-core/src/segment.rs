//! Paragraph segmentation for prose and code.
//!
//! Splits file content into an ordered sequence of trimmed paragraphs.
//! Every paragraph is a contiguous substring of the content, so each one
//! carries a [`ParagraphId`] (its byte offset) alongside its text.
//!
//! # Algorithm
//!
//! 1. Split the content on blank-line boundaries into blocks.
//! 2. A single-line block becomes one paragraph.
//! 3. A multi-line block that looks like code goes through the code
//!    extractor: a running brace depth keeps function, class, and
//!    control-statement bodies together as one paragraph each.
//! 4. Any other multi-line block is prose: lines accumulate until ten
//!    lines have been collected, or until a line ends a sentence once the
//!    paragraph holds at least two lines.
//! 5. Paragraphs are trimmed; empty ones are dropped.
//!
//! # Code detection
//!
//! [`is_code_like`] is a deliberate sniff, not a parser. Keyword
//! fragments match anywhere, so prose containing words such as
//! `information` (`for`) or `life` (`if`) is treated as code. In that
//! case the block is normally emitted as a single paragraph because no
//! brace context ever opens. Indentation of two or more spaces, or a
//! tab, after a newline also marks a block as code.
//!
//! # Example
//!
//! ```rust
//! use paraseek_core::segment::segment;
//!
//! let paragraphs = segment("Hello world.\nMore text here.\n\nfunction foo() {\n  return 1;\n}\n");
//! assert_eq!(paragraphs, vec![
//!     "Hello world.\nMore text here.".to_string(),
//!     "function foo() {\n  return 1;\n}".to_string(),
//! ]);
//! ```

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::models::{Paragraph, ParagraphId};

/// A prose paragraph is cut after this many lines.
const MAX_PROSE_LINES: usize = 10;

/// A sentence ending only closes a prose paragraph holding at least this many lines.
const MIN_SENTENCE_LINES: usize = 2;

static BLOCK_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static CODE_INDICATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"function|class|if|for|while|switch|var |let |const |import |export |return |\{|\}|=>")
        .unwrap()
});
static INDENTED_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s{2,}|\n\t").unwrap());
static FUNCTION_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"function\s+\w+\s*\([^)]*\)\s*\{").unwrap());
static CLASS_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"class\s+\w+").unwrap());
static CONTROL_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(if|for|while|switch)\s*\([^)]*\)\s*\{").unwrap());
static CONTROL_KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"if|for|while|switch").unwrap());
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s*$").unwrap());

/// Split `content` into trimmed paragraph strings.
pub fn segment(content: &str) -> Vec<String> {
    segment_spans(content).into_iter().map(|p| p.text).collect()
}

/// Split `content` into paragraphs carrying their ids and positions.
pub fn segment_spans(content: &str) -> Vec<Paragraph> {
    let mut paragraphs = Vec::new();
    let mut block_start = 0;
    for sep in BLOCK_SEPARATOR.find_iter(content) {
        split_block(content, block_start..sep.start(), &mut paragraphs);
        block_start = sep.end();
    }
    split_block(content, block_start..content.len(), &mut paragraphs);

    debug!(
        bytes = content.len(),
        paragraphs = paragraphs.len(),
        "segmented content"
    );
    paragraphs
}

/// Heuristic code sniff: keyword fragments, braces, arrows, or indentation.
pub fn is_code_like(block: &str) -> bool {
    CODE_INDICATOR.is_match(block) || INDENTED_LINE.is_match(block)
}

fn split_block(content: &str, block: Range<usize>, out: &mut Vec<Paragraph>) {
    let text = &content[block.clone()];
    if !text.contains('\n') {
        push_trimmed(content, block, out);
        return;
    }

    let lines = line_ranges(text, block.start);
    let spans = if is_code_like(text) {
        extract_code_spans(content, &lines)
    } else {
        split_prose(content, &lines)
    };
    for span in spans {
        push_trimmed(content, span, out);
    }
}

fn line_ranges(block: &str, offset: usize) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut start = offset;
    for line in block.split('\n') {
        let end = start + line.len();
        lines.push(start..end);
        start = end + 1;
    }
    lines
}

fn push_trimmed(content: &str, span: Range<usize>, out: &mut Vec<Paragraph>) {
    let raw = &content[span.clone()];
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    let lead = raw.len() - raw.trim_start().len();
    out.push(Paragraph {
        id: ParagraphId(span.start + lead),
        index: out.len(),
        text: trimmed.to_string(),
    });
}

/// Accumulates consecutive lines as one byte span.
#[derive(Default)]
struct Buffer {
    span: Option<Range<usize>>,
}

impl Buffer {
    fn push(&mut self, line: &Range<usize>) {
        self.span = Some(match self.span.take() {
            Some(span) => span.start..line.end,
            None => line.clone(),
        });
    }

    fn take(&mut self) -> Option<Range<usize>> {
        self.span.take()
    }

    fn text<'a>(&self, content: &'a str) -> &'a str {
        self.span.clone().map(|s| &content[s]).unwrap_or("")
    }

    fn is_blank(&self, content: &str) -> bool {
        self.text(content).trim().is_empty()
    }
}

fn split_prose(content: &str, lines: &[Range<usize>]) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut buffer = Buffer::default();
    let mut count = 0;

    for line in lines {
        buffer.push(line);
        count += 1;

        let ends_sentence = SENTENCE_END.is_match(&content[line.clone()]);
        if count >= MAX_PROSE_LINES || (count >= MIN_SENTENCE_LINES && ends_sentence) {
            spans.extend(buffer.take());
            count = 0;
        }
    }
    spans.extend(buffer.take());
    spans
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Function,
    Class,
    Control,
}

impl Context {
    fn opened_by(line: &str) -> Option<Self> {
        if FUNCTION_HEADER.is_match(line) {
            Some(Context::Function)
        } else if CLASS_HEADER.is_match(line) {
            Some(Context::Class)
        } else if CONTROL_HEADER.is_match(line) {
            Some(Context::Control)
        } else {
            None
        }
    }

    /// Whether pending text already belongs with this context's header.
    fn related_to(self, text: &str) -> bool {
        match self {
            Context::Function => text.contains("function"),
            Context::Class => text.contains("class"),
            Context::Control => CONTROL_KEYWORD.is_match(text),
        }
    }
}

fn brace_delta(line: &str) -> i64 {
    line.matches('{').count() as i64 - line.matches('}').count() as i64
}

fn extract_code_spans(content: &str, lines: &[Range<usize>]) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut buffer = Buffer::default();
    let mut depth: i64 = 0;
    let mut context: Option<Context> = None;

    for (i, line) in lines.iter().enumerate() {
        let text = &content[line.clone()];
        depth += brace_delta(text);

        if context.is_none() && depth > 0 {
            if let Some(opened) = Context::opened_by(text) {
                if !buffer.is_blank(content) && !opened.related_to(buffer.text(content)) {
                    spans.extend(buffer.take());
                }
                context = Some(opened);
            }
        }

        buffer.push(line);

        if context.is_some() {
            if depth == 0 {
                spans.extend(buffer.take());
                context = None;
            }
        } else {
            let last = i + 1 == lines.len();
            let before_blank = !last
                && content[lines[i + 1].clone()].trim().is_empty()
                && !text.trim().is_empty();
            if (last || before_blank) && !buffer.is_blank(content) {
                spans.extend(buffer.take());
            }
        }
    }

    // Unbalanced braces leave a context open; keep its text anyway.
    spans.extend(buffer.take());
    spans
}

//! Enclosing code contexts.
//!
//! The segmenter can cut a function or class across several paragraphs
//! when its body contains blank lines. This module recovers the larger
//! structure so a search hit inside it can be shown with its enclosing
//! definition.
//!
//! # Algorithm
//!
//! 1. Function: a `function name(...) {` header, extended up to the next
//!    `function` keyword, the next blank line, or end of content.
//! 2. Class: a `class Name` header, its first `{`, then up to the first
//!    `}` that is followed by `class`, a blank line, or only trailing
//!    whitespace.
//! 3. Each span is trimmed. Functions are listed before classes.

use std::fmt;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static FUNCTION_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"function\s+\w+\s*\([^{]*\)\s*\{").unwrap());
static CLASS_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"class\s+\w+").unwrap());
static BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static LEADING_BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\n\s*\n").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    Function,
    Class,
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextKind::Function => f.write_str("function"),
            ContextKind::Class => f.write_str("class"),
        }
    }
}

/// A function or class body found in a file's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeContext {
    pub kind: ContextKind,
    /// Byte range of the trimmed text inside the content.
    pub range: Range<usize>,
    pub text: String,
}

/// Find every function and class context in `content`.
pub fn identify_contexts(content: &str) -> Vec<CodeContext> {
    let mut contexts = function_contexts(content);
    contexts.extend(class_contexts(content));
    contexts
}

/// The first context that contains `paragraph` and is strictly longer.
pub fn find_containing_context<'a>(
    paragraph: &str,
    contexts: &'a [CodeContext],
) -> Option<&'a CodeContext> {
    contexts
        .iter()
        .find(|c| c.text.len() > paragraph.len() && c.text.contains(paragraph))
}

fn function_contexts(content: &str) -> Vec<CodeContext> {
    let mut found = Vec::new();
    let mut pos = 0;
    while let Some(header) = FUNCTION_HEADER.find_at(content, pos) {
        let body_start = header.end();
        let next_function = content[body_start..]
            .find("function")
            .map(|i| body_start + i);
        let next_blank = BLANK_LINE.find_at(content, body_start).map(|m| m.start());
        let end = [next_function, next_blank]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(content.len());

        push_trimmed(&mut found, content, header.start()..end, ContextKind::Function);
        pos = end;
    }
    found
}

fn class_contexts(content: &str) -> Vec<CodeContext> {
    let mut found = Vec::new();
    let mut pos = 0;
    while let Some(header) = CLASS_HEADER.find_at(content, pos) {
        match class_end(content, header.end()) {
            Some(end) => {
                push_trimmed(&mut found, content, header.start()..end, ContextKind::Class);
                pos = end;
            }
            None => pos = header.start() + 1,
        }
        // `pos` may land inside a multi-byte char after `+ 1`.
        while !content.is_char_boundary(pos) {
            pos += 1;
        }
    }
    found
}

/// End (exclusive) of a class body whose header ends at `from`.
fn class_end(content: &str, from: usize) -> Option<usize> {
    let open = from + content[from..].find('{')?;
    let mut search = open + 1;
    while let Some(i) = content[search..].find('}') {
        let after = search + i + 1;
        let rest = &content[after..];
        if rest.trim().is_empty()
            || rest.starts_with("class")
            || LEADING_BLANK_LINE.is_match(rest)
        {
            return Some(after);
        }
        search = after;
    }
    None
}

fn push_trimmed(out: &mut Vec<CodeContext>, content: &str, span: Range<usize>, kind: ContextKind) {
    let raw = &content[span.clone()];
    let text = raw.trim();
    if text.is_empty() {
        return;
    }
    let start = span.start + (raw.len() - raw.trim_start().len());
    out.push(CodeContext {
        kind,
        range: start..start + text.len(),
        text: text.to_string(),
    });
}

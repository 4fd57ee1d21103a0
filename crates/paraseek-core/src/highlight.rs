//! HTML highlighting of query matches.
//!
//! Output is always HTML-escaped: matches are located on the raw text
//! and the escaped pieces are spliced together around
//! `<span class="highlight">` markers, so nothing from the input can
//! inject markup.
//!
//! With `ignore_accents`, matches are found on folded text and mapped
//! back through a per-byte index map to the original characters. The
//! map makes the mapping exact even when folding changes lengths
//! (decomposed input, multi-char lowercase expansions).

use std::ops::Range;

use tracing::warn;

use crate::normalize::fold_char;
use crate::query::{compile, Pattern, SearchOptions};

/// CSS class wrapped around query matches.
pub const HIGHLIGHT_CLASS: &str = "highlight";

/// Escape `& < > " '` for safe inclusion in HTML text or attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text);
    out
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// Highlight the matches of `query` in `text`.
///
/// An invalid pattern is not an error here: the text comes back escaped
/// and unmarked, so results can still be displayed.
pub fn highlight(text: &str, query: &str, options: &SearchOptions) -> String {
    match compile(query, options) {
        Ok(pattern) => highlight_with(text, &pattern, options.ignore_accents),
        Err(e) => {
            warn!(error = %e, "highlight skipped");
            escape_html(text)
        }
    }
}

/// Highlight with an already compiled pattern.
pub fn highlight_with(text: &str, pattern: &Pattern, ignore_accents: bool) -> String {
    let ranges = if ignore_accents {
        folded_match_ranges(text, pattern)
    } else {
        pattern.find_ranges(text)
    };
    mark(text, &ranges, HIGHLIGHT_CLASS)
}

/// Escape `text` and wrap each byte range in `<span class="{class}">`.
///
/// Ranges must be sorted; a range overlapping an earlier one is skipped.
pub fn mark(text: &str, ranges: &[Range<usize>], class: &str) -> String {
    let mut out = String::with_capacity(text.len() + ranges.len() * (class.len() + 22));
    let mut last = 0;
    for range in ranges {
        if range.start < last || range.start >= range.end {
            continue;
        }
        escape_into(&mut out, &text[last..range.start]);
        out.push_str("<span class=\"");
        out.push_str(class);
        out.push_str("\">");
        escape_into(&mut out, &text[range.clone()]);
        out.push_str("</span>");
        last = range.end;
    }
    escape_into(&mut out, &text[last..]);
    out
}

/// Match on folded text, report ranges in `text`.
fn folded_match_ranges(text: &str, pattern: &Pattern) -> Vec<Range<usize>> {
    let mut folded = String::with_capacity(text.len());
    // Original char span behind every byte of `folded`.
    let mut origin: Vec<Range<usize>> = Vec::with_capacity(text.len());

    for (start, c) in text.char_indices() {
        let span = start..start + c.len_utf8();
        for f in fold_char(c) {
            folded.push(f);
            origin.extend(std::iter::repeat(span.clone()).take(f.len_utf8()));
        }
    }

    pattern
        .find_ranges(&folded)
        .into_iter()
        .map(|m| {
            let start = origin[m.start].start;
            let mut end = origin[m.end - 1].end;
            // Pull trailing marks that fold away into the match.
            while let Some(c) = text[end..].chars().next() {
                if fold_char(c).next().is_some() {
                    break;
                }
                end += c.len_utf8();
            }
            start..end
        })
        .collect()
}

//! Accent- and case-insensitive text folding.
//!
//! The same folding is applied to queries and to candidate text so that
//! comparisons stay symmetric: `"Café"` and `"CAFE"` both fold to `"cafe"`.

use unicode_normalization::UnicodeNormalization;

/// Fold `text`: NFD decomposition, strip combining marks, lowercase.
pub fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Fold a single character.
///
/// Concatenating `fold_char` over the characters of a string gives the
/// same result as [`normalize`]: canonical reordering only moves
/// combining marks, and those are stripped. The highlighter relies on
/// this to map folded offsets back to the original text.
pub fn fold_char(c: char) -> impl Iterator<Item = char> {
    std::iter::once(c)
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn is_combining_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0300}'..='\u{036F}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{20D0}'..='\u{20FF}'
            | '\u{FE20}'..='\u{FE2F}'
    )
}

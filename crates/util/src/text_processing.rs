//! # Text Offset Utilities
//!
//! Mention ranges are expressed in Unicode scalar (char) offsets so that they
//! stay meaningful to hosts regardless of the underlying encoding. These
//! helpers translate between char offsets and the byte offsets `str` APIs use.

use std::ops::Range;

/// Number of chars in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Convert a char offset into a byte offset, clamping to the end of `text`.
///
/// # Example
/// ```rust
/// use mentions_util::text_processing::char_to_byte_index;
///
/// assert_eq!(char_to_byte_index("héllo", 2), 3);
/// assert_eq!(char_to_byte_index("héllo", 99), 6);
/// ```
pub fn char_to_byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices().nth(char_index).map(|(byte, _)| byte).unwrap_or(text.len())
}

/// Convert a byte offset (on a char boundary) into a char offset.
pub fn byte_to_char_index(text: &str, byte_index: usize) -> usize {
    let end = byte_index.min(text.len());
    text[..end].chars().count()
}

/// Char at the given char offset, if any.
pub fn char_at(text: &str, char_index: usize) -> Option<char> {
    text.chars().nth(char_index)
}

/// Substring covering the char range, clamped to the text bounds.
pub fn char_slice(text: &str, range: Range<usize>) -> &str {
    let start = char_to_byte_index(text, range.start);
    let end = char_to_byte_index(text, range.end.max(range.start));
    &text[start..end]
}

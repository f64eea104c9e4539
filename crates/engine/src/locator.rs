//! Occurrence locator.
//!
//! Finds the char offset of the Nth occurrence of a label in free-form text,
//! ignoring matches that sit inside a longer known label or that are glued to
//! the preceding word.

use std::borrow::Cow;

use mentions_util::{byte_to_char_index, char_len};
use tracing::trace;

/// Markup line break that counts as a boundary before a label.
pub const LINE_BREAK_MARKER: &str = "<br>";

const MASK_CHAR: char = '*';

/// Whether `preceding` may precede a label (or a trigger character).
///
/// Only labels preceded by nothing, a newline, a space, or an opening
/// parenthesis are treated as intentional mentions, so labels embedded in
/// e.g. links are not mistaken for choices.
pub fn preceding_char_valid(preceding: Option<char>) -> bool {
    matches!(preceding, None | Some('\n') | Some(' ') | Some('('))
}

/// Locate `label` in `text`, returning its char offset.
///
/// `occurrence` is the 1-based ordinal to look for (0 is treated as 1), and
/// `labels` are all labels currently known; those containing `label` are
/// masked out before searching.
///
/// # Example
/// ```rust
/// use mentions_engine::locator::locate;
///
/// let labels = ["@TED", "@TEDEducation"];
/// assert_eq!(locate("@TEDEducation and @TED", "@TED", 1, &labels), Some(18));
/// assert_eq!(locate("x@TED", "@TED", 1, &["@TED"]), None);
/// ```
pub fn locate<S: AsRef<str>>(text: &str, label: &str, occurrence: usize, labels: &[S]) -> Option<usize> {
    if label.is_empty() {
        return None;
    }

    let mut masked = Cow::Borrowed(text);
    for other in labels {
        let other: &str = other.as_ref();
        // e.g. searching '@TED' must not match inside '@TEDEducation'
        if other != label && other.contains(label) {
            let placeholder: String = std::iter::repeat_n(MASK_CHAR, char_len(other)).collect();
            masked = Cow::Owned(masked.replace(other, &placeholder));
        }
    }

    let chars: Vec<char> = masked.chars().collect();
    let index = find_string_index(&masked, label, occurrence, |start, _| boundary_before(&chars, start));
    trace!(label, occurrence, ?index, "located label");
    index
}

fn boundary_before(chars: &[char], start: usize) -> bool {
    let preceding = start.checked_sub(1).map(|index| chars[index]);
    if preceding_char_valid(preceding) {
        return true;
    }
    let marker_len = LINE_BREAK_MARKER.len();
    start >= marker_len && chars[start - marker_len..start].iter().copied().eq(LINE_BREAK_MARKER.chars())
}

/// Scan for the `occurrence`-th literal match of `value`, then keep moving
/// forward until `accept(start, end)` holds for a candidate char range.
///
/// Skipped candidates are not validated; only the landing candidate and those
/// after it are. Returns `None` once the text is exhausted.
pub fn find_string_index<F>(text: &str, value: &str, occurrence: usize, mut accept: F) -> Option<usize>
where
    F: FnMut(usize, usize) -> bool,
{
    if value.is_empty() {
        return None;
    }

    let mut byte_index = text.find(value)?;
    for _ in 1..occurrence.max(1) {
        byte_index = next_match(text, value, byte_index)?;
    }

    let value_len = char_len(value);
    loop {
        let start = byte_to_char_index(text, byte_index);
        if accept(start, start + value_len) {
            return Some(start);
        }
        byte_index = next_match(text, value, byte_index)?;
    }
}

/// Next match of `value` starting one char after `from`.
fn next_match(text: &str, value: &str, from: usize) -> Option<usize> {
    let step = text[from..].chars().next().map_or(1, char::len_utf8);
    let offset = from + step;
    text.get(offset..)?.find(value).map(|found| found + offset)
}

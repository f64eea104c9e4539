//! Reusable UTF-8 safe text buffer with a char-indexed caret.
//!
//! Hosts mirror their text control into this buffer; the mention engine reads
//! the value and caret from it and writes back inserted labels.

use std::ops::Range;

use crate::text_processing::{char_len, char_slice, char_to_byte_index};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextInputState {
    /// The underlying text buffer
    input: String,
    /// Caret as a char offset into `input`
    cursor: usize,
}

impl TextInputState {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            cursor: 0,
        }
    }

    // ----- Getters -----
    pub fn input(&self) -> &str {
        &self.input
    }
    pub fn cursor(&self) -> usize {
        self.cursor
    }
    pub fn char_len(&self) -> usize {
        char_len(&self.input)
    }
    pub fn is_empty(&self) -> bool {
        self.input.trim().is_empty()
    }

    /// Char immediately before the caret.
    pub fn preceding_char(&self) -> Option<char> {
        self.cursor.checked_sub(1).and_then(|index| self.input.chars().nth(index))
    }

    /// Text between two char offsets.
    pub fn slice(&self, range: Range<usize>) -> &str {
        char_slice(&self.input, range)
    }

    // ----- Setters -----
    pub fn set_input<S: Into<String>>(&mut self, s: S) {
        self.input = s.into();
        self.cursor = self.cursor.min(self.char_len());
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.char_len());
    }

    // ----- Editing primitives -----

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.set_cursor(self.cursor + 1);
    }

    /// Insert a char at the caret.
    pub fn insert_char(&mut self, c: char) {
        let byte = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte, c);
        self.cursor += 1;
    }

    /// Replace a char range with `text` and place the caret after the insertion.
    pub fn replace_range(&mut self, range: Range<usize>, text: &str) {
        let start = char_to_byte_index(&self.input, range.start);
        let end = char_to_byte_index(&self.input, range.end.max(range.start));
        self.input.replace_range(start..end, text);
        self.cursor = range.start.min(self.char_len()) + char_len(text);
    }

    /// Backspace the char immediately before the caret.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let start = char_to_byte_index(&self.input, self.cursor - 1);
        let end = char_to_byte_index(&self.input, self.cursor);
        self.input.drain(start..end);
        self.cursor -= 1;
    }

    /// Delete the char immediately after the caret.
    pub fn delete_forward(&mut self) {
        if self.cursor >= self.char_len() {
            return;
        }
        let start = char_to_byte_index(&self.input, self.cursor);
        let end = char_to_byte_index(&self.input, self.cursor + 1);
        self.input.drain(start..end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_move_insert_backspace() {
        let mut st = TextInputState::new();
        st.set_input("h🙂llo");
        st.set_cursor(1); // between h and 🙂
        st.insert_char('e');
        assert_eq!(st.input(), "he🙂llo");
        st.move_right(); // step over 🙂
        st.backspace(); // delete 🙂
        assert_eq!(st.input(), "hello");
        st.move_left();
        st.backspace();
        assert_eq!(st.input(), "ello");
        assert_eq!(st.cursor(), 0);
    }

    #[test]
    fn replace_range_moves_caret_after_insert() {
        let mut st = TextInputState::new();
        st.set_input("hi @jo there");
        st.replace_range(3..6, "@John ");
        assert_eq!(st.input(), "hi @John  there");
        assert_eq!(st.cursor(), 9);
        assert_eq!(st.preceding_char(), Some(' '));
    }

    #[test]
    fn delete_forward_keeps_caret() {
        let mut st = TextInputState::new();
        st.set_input("ab🙂c");
        st.set_cursor(2);
        st.delete_forward();
        assert_eq!(st.input(), "abc");
        assert_eq!(st.cursor(), 2);
        st.set_cursor(10);
        assert_eq!(st.cursor(), 3);
        st.delete_forward();
        assert_eq!(st.input(), "abc");
    }
}

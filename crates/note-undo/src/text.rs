#![forbid(unsafe_code)]

//! Editable text capability.
//!
//! Undo and redo only ever need to read a field and replace a range of it.
//! [`EditableText`] is that capability; every field kind of a document
//! exposes it, so the history code is written once against the trait.
//!
//! All offsets are char (Unicode scalar value) indices, the unit [`ropey`]
//! indexes by.

use std::fmt;

use ropey::Rope;

use crate::error::{UndoResult, check_range};

/// Text that undo/redo can read and mutate.
pub trait EditableText {
    /// Current text.
    fn text(&self) -> String;

    /// Length of the text in chars.
    fn len_chars(&self) -> usize;

    /// Append text at the end.
    fn append(&mut self, text: &str);

    /// Replace chars `start..end` with `text`.
    ///
    /// Fails with [`UndoError::InvalidRange`](crate::UndoError::InvalidRange)
    /// without mutating anything if the range is out of bounds.
    fn replace(&mut self, start: usize, end: usize, text: &str) -> UndoResult<()>;

    /// Replace the whole text.
    fn replace_all(&mut self, text: &str);
}

impl EditableText for String {
    fn text(&self) -> String {
        self.clone()
    }

    fn len_chars(&self) -> usize {
        char_len(self)
    }

    fn append(&mut self, text: &str) {
        self.push_str(text);
    }

    fn replace(&mut self, start: usize, end: usize, text: &str) -> UndoResult<()> {
        check_range(start, end, char_len(self))?;
        let from = byte_offset(self, start);
        let to = byte_offset(self, end);
        self.replace_range(from..to, text);
        Ok(())
    }

    fn replace_all(&mut self, text: &str) {
        self.clear();
        self.push_str(text);
    }
}

/// Rope-backed field text.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RopeText {
    rope: Rope,
}

impl RopeText {
    /// Create empty text.
    #[must_use]
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Create from a string.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Borrow the underlying rope.
    #[must_use]
    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Whether the text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }
}

impl EditableText for RopeText {
    fn text(&self) -> String {
        self.rope.to_string()
    }

    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn append(&mut self, text: &str) {
        let end = self.rope.len_chars();
        self.rope.insert(end, text);
    }

    fn replace(&mut self, start: usize, end: usize, text: &str) -> UndoResult<()> {
        check_range(start, end, self.rope.len_chars())?;
        self.rope.remove(start..end);
        self.rope.insert(start, text);
        Ok(())
    }

    fn replace_all(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }
}

impl fmt::Debug for RopeText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RopeText").field(&self.rope.to_string()).finish()
    }
}

impl fmt::Display for RopeText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rope)
    }
}

impl From<&str> for RopeText {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

impl PartialEq<&str> for RopeText {
    fn eq(&self, other: &&str) -> bool {
        self.rope == *other
    }
}

// ---------------------------------------------------------------------------
// Char-indexed string helpers
// ---------------------------------------------------------------------------

/// Number of chars in `s`.
#[inline]
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of char index `idx`, clamped to `s.len()`.
#[inline]
pub(crate) fn byte_offset(s: &str, idx: usize) -> usize {
    s.char_indices().nth(idx).map_or(s.len(), |(b, _)| b)
}

/// First `n` chars of `s`.
pub(crate) fn head(s: &str, n: usize) -> &str {
    &s[..byte_offset(s, n)]
}

/// Chars of `s` from index `n` on.
pub(crate) fn tail(s: &str, n: usize) -> &str {
    &s[byte_offset(s, n)..]
}

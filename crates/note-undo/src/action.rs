#![forbid(unsafe_code)]

//! Text edit actions.
//!
//! A [`TextEditAction`] records that the text of one field changed in
//! `[start, end)` from `old_text` to `new_text`. Actions are immutable and
//! always kept in canonical form: `old_text` and `new_text` never share a
//! leading or trailing sequence. Canonical form is what lets
//! [`merge_with`](TextEditAction::merge_with) reason about ranges alone.
//!
//! # Invariants
//!
//! - Replacing `[start, end)` of the pre-edit text with `new_text` yields the
//!   post-edit text.
//! - Replacing `[start, start + len(new_text))` of the post-edit text with
//!   `old_text` yields the pre-edit text.
//! - If `a.merge_with(&b)` returns `m`, applying `a` then `b` to a text is
//!   the same as applying `m` alone.
//!
//! # Merge cases
//!
//! The newer action is located relative to the span the older one produced
//! (`[a.start, a.start + len(a.new_text))`, in post-edit coordinates):
//!
//! ```text
//!                 older span
//!               |==========|
//! Outside    |-----------------|
//! Inside          |----|
//! Before     |-------|
//! After                |-------|
//! Disjoint                       |--|     (no merge)
//! ```
//!
//! Touching at a single boundary point counts as overlap, which is what
//! typing and backspacing produce.

use std::fmt;

use crate::document::EditDocument;
use crate::error::{UndoResult, check_range};
use crate::text::{char_len, head, tail};

/// Kind of an editable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Note title.
    Title,
    /// Note body.
    Content,
    /// Text of one checklist item.
    ListItem,
}

impl FieldKind {
    /// Short lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
            Self::ListItem => "list_item",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of a field in a document: item position plus kind.
///
/// Two fields can share a position only if they are of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId {
    /// Position of the item in the document.
    pub pos: usize,
    /// Kind of the field.
    pub kind: FieldKind,
}

impl FieldId {
    /// Field of `kind` at item position `pos`.
    #[must_use]
    pub const fn new(pos: usize, kind: FieldKind) -> Self {
        Self { pos, kind }
    }

    /// Title field at `pos`.
    #[must_use]
    pub const fn title(pos: usize) -> Self {
        Self::new(pos, FieldKind::Title)
    }

    /// Body field at `pos`.
    #[must_use]
    pub const fn content(pos: usize) -> Self {
        Self::new(pos, FieldKind::Content)
    }

    /// Checklist item at `pos`.
    #[must_use]
    pub const fn list_item(pos: usize) -> Self {
        Self::new(pos, FieldKind::ListItem)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.pos)
    }
}

/// Where the caller should move focus after an undo or redo.
///
/// The engine never touches focus itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusChange {
    /// Position of the item to focus.
    pub item_pos: usize,
    /// Cursor offset in the item text (chars).
    pub cursor: usize,
    /// Whether the field should request input focus.
    pub refocus: bool,
}

impl FocusChange {
    /// Focus item `item_pos` with the cursor at `cursor`, requesting focus.
    #[must_use]
    pub const fn new(item_pos: usize, cursor: usize) -> Self {
        Self {
            item_pos,
            cursor,
            refocus: true,
        }
    }
}

/// Position of a newer action relative to an older action's span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeCase {
    /// Newer action covers the whole older span.
    Outside,
    /// Older span covers the whole newer action.
    Inside,
    /// Newer action overlaps the left edge of the older span.
    Before,
    /// Newer action overlaps the right edge of the older span.
    After,
}

/// Text in `[start, end)` of a field changed from `old_text` to `new_text`.
///
/// Construct with [`TextEditAction::create`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextEditAction {
    field: FieldId,
    start: usize,
    end: usize,
    old_text: String,
    new_text: String,
}

impl TextEditAction {
    /// Create an action, trimming any common prefix and suffix of
    /// `old_text` and `new_text`.
    ///
    /// The suffix is never trimmed past the prefix. When both texts are equal
    /// the result is an empty no-op at `start + len(old_text)`.
    #[must_use]
    pub fn create(
        field: FieldId,
        start: usize,
        end: usize,
        old_text: impl Into<String>,
        new_text: impl Into<String>,
    ) -> Self {
        let old_text = old_text.into();
        let new_text = new_text.into();

        let prefix = old_text
            .chars()
            .zip(new_text.chars())
            .take_while(|(a, b)| a == b)
            .count();
        let old_rest = tail(&old_text, prefix);
        let new_rest = tail(&new_text, prefix);

        let suffix = old_rest
            .chars()
            .rev()
            .zip(new_rest.chars().rev())
            .take_while(|(a, b)| a == b)
            .count();
        let old_trimmed = head(old_rest, char_len(old_rest) - suffix);
        let new_trimmed = head(new_rest, char_len(new_rest) - suffix);

        let start = start + prefix;
        Self {
            field,
            start,
            end: end.saturating_sub(suffix).max(start),
            old_text: old_trimmed.to_owned(),
            new_text: new_trimmed.to_owned(),
        }
    }

    /// Field the edit applies to.
    #[must_use]
    pub fn field(&self) -> FieldId {
        self.field
    }

    /// Start offset in the pre-edit text.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// End offset (exclusive) in the pre-edit text.
    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Text removed by the edit.
    #[must_use]
    pub fn old_text(&self) -> &str {
        &self.old_text
    }

    /// Text inserted by the edit.
    #[must_use]
    pub fn new_text(&self) -> &str {
        &self.new_text
    }

    /// End of the inserted text in the post-edit text.
    #[must_use]
    pub fn new_end(&self) -> usize {
        self.start + char_len(&self.new_text)
    }

    /// Whether the action changes nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.old_text.is_empty() && self.new_text.is_empty()
    }

    /// Human-readable description for menus.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match (self.old_text.is_empty(), self.new_text.is_empty()) {
            (true, false) => "Insert text",
            (false, true) => "Delete text",
            _ => "Replace text",
        }
    }

    /// Size of this action in bytes for memory budgeting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.old_text.len() + self.new_text.len()
    }

    // ========================================================================
    // Merging
    // ========================================================================

    /// Classify `newer` against the span produced by `self`.
    ///
    /// Returns `None` if the actions target different fields or do not
    /// overlap.
    #[must_use]
    pub fn merge_case(&self, newer: &Self) -> Option<MergeCase> {
        if self.field != newer.field {
            return None;
        }
        let span_end = self.new_end();
        if newer.start <= self.start && newer.end >= span_end {
            Some(MergeCase::Outside)
        } else if newer.start >= self.start && newer.end <= span_end {
            Some(MergeCase::Inside)
        } else if newer.start <= self.start && newer.end >= self.start {
            Some(MergeCase::Before)
        } else if newer.start >= self.start && newer.start <= span_end {
            Some(MergeCase::After)
        } else {
            None
        }
    }

    /// Combine `self` with the action that chronologically follows it.
    ///
    /// `newer` offsets are positions in the text produced by `self`. Returns
    /// `None` when the two cannot be merged; the caller then commits `self`
    /// and continues with `newer`.
    #[must_use]
    pub fn merge_with(&self, newer: &Self) -> Option<Self> {
        let case = self.merge_case(newer)?;
        tracing::trace!(
            target: "note_undo.action",
            field = %self.field,
            case = ?case,
            "merging edit actions"
        );

        let span_end = self.new_end();
        let (start, old_text, new_text) = match case {
            MergeCase::Outside => {
                let old_text = [
                    head(&newer.old_text, self.start - newer.start),
                    self.old_text.as_str(),
                    tail(&newer.old_text, span_end - newer.start),
                ]
                .concat();
                (newer.start, old_text, newer.new_text.clone())
            }
            MergeCase::Inside => {
                let new_text = [
                    head(&self.new_text, newer.start - self.start),
                    newer.new_text.as_str(),
                    tail(&self.new_text, newer.end - self.start),
                ]
                .concat();
                (self.start, self.old_text.clone(), new_text)
            }
            MergeCase::Before => {
                let old_text = [
                    head(&newer.old_text, self.start - newer.start),
                    self.old_text.as_str(),
                ]
                .concat();
                let new_text = [
                    newer.new_text.as_str(),
                    tail(&self.new_text, newer.end - self.start),
                ]
                .concat();
                (newer.start, old_text, new_text)
            }
            MergeCase::After => {
                let old_text = [
                    self.old_text.as_str(),
                    tail(&newer.old_text, span_end - newer.start),
                ]
                .concat();
                let new_text = [
                    head(&self.new_text, newer.start - self.start),
                    newer.new_text.as_str(),
                ]
                .concat();
                (self.start, old_text, new_text)
            }
        };

        let end = start + char_len(&old_text);
        Some(Self::create(self.field, start, end, old_text, new_text))
    }

    // ========================================================================
    // Applying
    // ========================================================================

    /// Revert the edit in `doc`.
    ///
    /// Focus goes to `end`, the end of the restored text.
    pub fn undo<D>(&self, doc: &mut D) -> UndoResult<FocusChange>
    where
        D: EditDocument + ?Sized,
    {
        let target = doc.field_mut(self.field)?;
        target.replace(self.start, self.new_end(), &self.old_text)?;
        Ok(FocusChange::new(self.field.pos, self.end))
    }

    /// Reapply the edit in `doc`.
    ///
    /// Focus goes to the end of the inserted text.
    pub fn redo<D>(&self, doc: &mut D) -> UndoResult<FocusChange>
    where
        D: EditDocument + ?Sized,
    {
        let target = doc.field_mut(self.field)?;
        target.replace(self.start, self.end, &self.new_text)?;
        Ok(FocusChange::new(self.field.pos, self.new_end()))
    }

    /// Text obtained by applying the edit to `text`.
    pub fn apply_to(&self, text: &str) -> UndoResult<String> {
        check_range(self.start, self.end, char_len(text))?;
        Ok([head(text, self.start), self.new_text.as_str(), tail(text, self.end)].concat())
    }

    /// Text obtained by reverting the edit from `text`.
    pub fn revert_from(&self, text: &str) -> UndoResult<String> {
        let new_end = self.new_end();
        check_range(self.start, new_end, char_len(text))?;
        Ok([head(text, self.start), self.old_text.as_str(), tail(text, new_end)].concat())
    }
}

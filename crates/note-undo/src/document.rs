#![forbid(unsafe_code)]

//! Documents made of independently addressable text fields.
//!
//! [`EditDocument`] is the lookup the history needs: given a [`FieldId`],
//! hand back the field's [`EditableText`]. [`NoteDocument`] is the concrete
//! note model: an ordered list of [`NoteItem`]s, one per editable field.

use crate::action::{FieldId, FieldKind};
use crate::error::{UndoError, UndoResult};
use crate::text::{EditableText, RopeText};

/// Collection of editable fields addressed by [`FieldId`].
pub trait EditDocument {
    /// Borrow the text of a field.
    fn field(&self, field: FieldId) -> UndoResult<&dyn EditableText>;

    /// Mutably borrow the text of a field.
    fn field_mut(&mut self, field: FieldId) -> UndoResult<&mut dyn EditableText>;
}

/// One item of a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteItem {
    /// Note title.
    Title(RopeText),
    /// Note body.
    Content(RopeText),
    /// Checklist entry with its check state.
    ListItem { text: RopeText, checked: bool },
}

impl NoteItem {
    /// Field kind this item exposes.
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Title(_) => FieldKind::Title,
            Self::Content(_) => FieldKind::Content,
            Self::ListItem { .. } => FieldKind::ListItem,
        }
    }

    /// Text of the item.
    #[must_use]
    pub fn text(&self) -> &RopeText {
        match self {
            Self::Title(text) | Self::Content(text) | Self::ListItem { text, .. } => text,
        }
    }

    /// Mutable text of the item.
    pub fn text_mut(&mut self) -> &mut RopeText {
        match self {
            Self::Title(text) | Self::Content(text) | Self::ListItem { text, .. } => text,
        }
    }
}

/// In-memory note: title, then either a body or checklist items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDocument {
    items: Vec<NoteItem>,
}

impl NoteDocument {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Text note: title at position 0, body at position 1.
    #[must_use]
    pub fn text_note(title: &str, content: &str) -> Self {
        Self {
            items: vec![
                NoteItem::Title(RopeText::from_text(title)),
                NoteItem::Content(RopeText::from_text(content)),
            ],
        }
    }

    /// Checklist note: title at position 0, items from position 1.
    #[must_use]
    pub fn checklist<'a>(title: &str, items: impl IntoIterator<Item = (&'a str, bool)>) -> Self {
        let mut doc = Self {
            items: vec![NoteItem::Title(RopeText::from_text(title))],
        };
        doc.items
            .extend(items.into_iter().map(|(text, checked)| NoteItem::ListItem {
                text: RopeText::from_text(text),
                checked,
            }));
        doc
    }

    /// Append an item.
    pub fn push(&mut self, item: NoteItem) {
        self.items.push(item);
    }

    /// Items in position order.
    #[must_use]
    pub fn items(&self) -> &[NoteItem] {
        &self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the document has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current text of a field.
    pub fn text_of(&self, field: FieldId) -> UndoResult<String> {
        self.field(field).map(|text| text.text())
    }

    fn item(&self, field: FieldId) -> UndoResult<&NoteItem> {
        let item = self
            .items
            .get(field.pos)
            .ok_or(UndoError::FieldNotFound(field))?;
        if item.kind() != field.kind {
            return Err(UndoError::KindMismatch {
                field,
                actual: item.kind(),
            });
        }
        Ok(item)
    }
}

impl EditDocument for NoteDocument {
    fn field(&self, field: FieldId) -> UndoResult<&dyn EditableText> {
        Ok(self.item(field)?.text())
    }

    fn field_mut(&mut self, field: FieldId) -> UndoResult<&mut dyn EditableText> {
        self.item(field)?;
        match self.items.get_mut(field.pos) {
            Some(item) => Ok(item.text_mut()),
            None => Err(UndoError::FieldNotFound(field)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_note_layout() {
        let doc = NoteDocument::text_note("Groceries", "milk");
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.text_of(FieldId::title(0)).unwrap(), "Groceries");
        assert_eq!(doc.text_of(FieldId::content(1)).unwrap(), "milk");
    }

    #[test]
    fn checklist_layout() {
        let doc = NoteDocument::checklist("Todo", [("eggs", false), ("bread", true)]);
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.text_of(FieldId::list_item(2)).unwrap(), "bread");
        assert!(matches!(
            doc.items()[2],
            NoteItem::ListItem { checked: true, .. }
        ));
    }

    #[test]
    fn lookup_checks_kind() {
        let mut doc = NoteDocument::text_note("a", "b");
        assert_eq!(
            doc.field_mut(FieldId::list_item(1)).err(),
            Some(UndoError::KindMismatch {
                field: FieldId::list_item(1),
                actual: FieldKind::Content,
            })
        );
    }

    #[test]
    fn lookup_missing_item() {
        let doc = NoteDocument::new();
        assert!(doc.is_empty());
        assert_eq!(
            doc.text_of(FieldId::title(0)),
            Err(UndoError::FieldNotFound(FieldId::title(0)))
        );
    }

    #[test]
    fn field_mut_edits_in_place() {
        let mut doc = NoteDocument::checklist("t", [("one", false)]);
        doc.field_mut(FieldId::list_item(1))
            .unwrap()
            .replace(0, 3, "two")
            .unwrap();
        assert_eq!(doc.text_of(FieldId::list_item(1)).unwrap(), "two");
    }
}

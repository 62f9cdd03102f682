#![forbid(unsafe_code)]

//! Editing session: a document, its history and the change watcher.
//!
//! [`EditSession`] is the glue an input surface talks to. User edits go
//! through [`edit`](EditSession::edit), which mutates the field and records
//! the resulting action. Focus moves go through
//! [`focus_changed`](EditSession::focus_changed), which commits the pending
//! action so edits never merge across fields. Undo and redo run with the
//! watcher suppressed so their mutations are not recorded again.
//!
//! The session mutates fields directly, so nothing echoes back into the
//! watcher here. The guard matters for adapters whose widgets report
//! programmatic changes through the watcher callbacks; those drive a
//! [`ChangeWatcher`] of their own the same way.

use crate::action::{FieldId, FocusChange};
use crate::config::HistoryConfig;
use crate::document::EditDocument;
use crate::error::{UndoResult, check_range};
use crate::history::UndoHistory;
use crate::text::char_len;
use crate::watcher::ChangeWatcher;

/// A document being edited together with its undo history.
#[derive(Debug)]
pub struct EditSession<D> {
    document: D,
    history: UndoHistory,
    watcher: ChangeWatcher,
    focused: Option<FieldId>,
}

impl<D: EditDocument> EditSession<D> {
    /// Start a session on `document` with empty history.
    #[must_use]
    pub fn new(document: D, config: HistoryConfig) -> Self {
        Self {
            document,
            history: UndoHistory::new(config),
            watcher: ChangeWatcher::new(),
            focused: None,
        }
    }

    /// The document being edited.
    #[must_use]
    pub fn document(&self) -> &D {
        &self.document
    }

    /// The undo history.
    #[must_use]
    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    /// Mutable access to the undo history.
    pub fn history_mut(&mut self) -> &mut UndoHistory {
        &mut self.history
    }

    /// Field that last received input, if any.
    #[must_use]
    pub fn focused(&self) -> Option<FieldId> {
        self.focused
    }

    /// End the session, returning the document.
    pub fn into_document(self) -> D {
        self.document
    }

    /// Replace chars `start..end` of `field` with `text` as user input.
    ///
    /// A rejected edit leaves the document, the history and the focus
    /// untouched.
    pub fn edit(&mut self, field: FieldId, start: usize, end: usize, text: &str) -> UndoResult<()> {
        let len = self.document.field(field)?.len_chars();
        check_range(start, end, len)?;
        self.focus_changed(field);

        let target = self.document.field_mut(field)?;

        let before = target.text();
        self.watcher.before_text_changed(&before, start, end - start);
        target.replace(start, end, text)?;
        let after = target.text();

        if let Some(action) =
            self.watcher
                .on_text_changed(field, &after, start, end - start, char_len(text))
        {
            self.history.record(action);
        }
        Ok(())
    }

    /// Input focus moved to `field`.
    ///
    /// Commits the pending action when the field differs from the last one.
    pub fn focus_changed(&mut self, field: FieldId) {
        if self.focused != Some(field) {
            tracing::trace!(
                target: "note_undo.session",
                from = ?self.focused,
                to = %field,
                "focus changed"
            );
            self.history.flush();
            self.focused = Some(field);
        }
    }

    /// Input focus left the document.
    pub fn focus_lost(&mut self) {
        self.history.flush();
        self.focused = None;
    }

    /// Undo the most recent edit.
    pub fn undo(&mut self) -> UndoResult<FocusChange> {
        let Self {
            document,
            history,
            watcher,
            ..
        } = self;
        watcher.suppressed(|_| history.undo(document))
    }

    /// Redo the most recently undone edit.
    pub fn redo(&mut self) -> UndoResult<FocusChange> {
        let Self {
            document,
            history,
            watcher,
            ..
        } = self;
        watcher.suppressed(|_| history.redo(document))
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Set the text of `field` programmatically.
    ///
    /// The change is not recorded. Offsets held by the history would no
    /// longer match the document, so the history is cleared.
    pub fn reset_text(&mut self, field: FieldId, text: &str) -> UndoResult<()> {
        let target = self.document.field_mut(field)?;
        self.watcher.bind(target, text);
        self.history.clear();
        tracing::debug!(
            target: "note_undo.session",
            field = %field,
            "field text reset, history cleared"
        );
        Ok(())
    }
}

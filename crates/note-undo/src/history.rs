#![forbid(unsafe_code)]

//! Linear undo/redo history with a pending merge slot.
//!
//! [`UndoHistory`] keeps committed actions in a bounded stack plus one
//! pending action that is still eligible for merging. Keystrokes arrive
//! through [`record`](UndoHistory::record) and fuse into the pending action
//! until a merge boundary: an unmergeable action, a field switch or an
//! explicit [`flush`](UndoHistory::flush).
//!
//! # Invariants
//!
//! 1. `position <= entries.len()`
//! 2. `entries.len() <= config.max_depth` (after any operation)
//! 3. `total_bytes` always equals the sum of `size_bytes()` over `entries`
//! 4. Entries at or after `position` are discarded when a new action arrives
//! 5. The pending action is never a no-op
//!
//! # Memory Model
//!
//! ```text
//! record(a) record(b)          a and b merge into pending
//! ┌───────────────────────────────────────────────┐
//! │ Entries: [e1, e2, e3]   position: 3           │
//! │ Pending: ab                                    │
//! └───────────────────────────────────────────────┘
//!
//! undo() x2                    pending committed first
//! ┌───────────────────────────────────────────────┐
//! │ Entries: [e1, e2, e3, ab]   position: 2       │
//! │ Pending: -                                     │
//! └───────────────────────────────────────────────┘
//!
//! record(c)                    new branch, redo discarded
//! ┌───────────────────────────────────────────────┐
//! │ Entries: [e1, e2]   position: 2               │
//! │ Pending: c                                     │
//! └───────────────────────────────────────────────┘
//! ```

use std::collections::VecDeque;
use std::fmt;

use crate::action::{FocusChange, TextEditAction};
use crate::config::HistoryConfig;
use crate::document::EditDocument;
use crate::error::{UndoError, UndoResult};

/// Undo/redo history for the text fields of one document.
pub struct UndoHistory {
    /// Committed actions, oldest first.
    entries: VecDeque<TextEditAction>,
    /// Index of the next redo slot.
    position: usize,
    /// Uncommitted action still eligible for merging.
    pending: Option<TextEditAction>,
    /// Limits.
    config: HistoryConfig,
    /// Total bytes used by committed actions.
    total_bytes: usize,
}

impl fmt::Debug for UndoHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoHistory")
            .field("undo_depth", &self.undo_depth())
            .field("redo_depth", &self.redo_depth())
            .field("pending", &self.pending)
            .field("total_bytes", &self.total_bytes)
            .field("config", &self.config)
            .finish()
    }
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl UndoHistory {
    /// Create an empty history with the given limits.
    ///
    /// A `max_depth` of 0 is raised to 1 so the latest action stays undoable.
    #[must_use]
    pub fn new(mut config: HistoryConfig) -> Self {
        if config.max_depth == 0 {
            tracing::warn!(
                target: "note_undo.history",
                "max_depth of 0 raised to 1"
            );
            config.max_depth = 1;
        }
        Self {
            entries: VecDeque::new(),
            position: 0,
            pending: None,
            config,
            total_bytes: 0,
        }
    }

    // ========================================================================
    // Core Operations
    // ========================================================================

    /// Record an action that was just applied to the document.
    ///
    /// The action merges into the pending one when possible. Otherwise the
    /// pending action is committed and `action` becomes pending.
    pub fn record(&mut self, action: TextEditAction) {
        if action.is_noop() {
            return;
        }
        self.truncate_redo();

        let Some(pending) = self.pending.take() else {
            self.pending = Some(action);
            return;
        };

        match pending.merge_with(&action) {
            Some(merged) if merged.is_noop() => {
                tracing::trace!(
                    target: "note_undo.history",
                    field = %merged.field(),
                    "pending action cancelled out"
                );
            }
            Some(merged) => self.pending = Some(merged),
            None => {
                self.push(pending);
                self.pending = Some(action);
            }
        }
    }

    /// Commit the pending action, if any.
    pub fn flush(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.push(pending);
        }
    }

    /// Commit an action directly, bypassing the pending slot.
    ///
    /// Entries after the current position are discarded and the oldest
    /// entries are evicted if limits are exceeded. Does not flush: callers
    /// mixing `push` with `record` should flush first to keep order.
    pub fn push(&mut self, action: TextEditAction) {
        if action.is_noop() {
            return;
        }
        self.truncate_redo();

        tracing::debug!(
            target: "note_undo.history",
            field = %action.field(),
            start = action.start(),
            end = action.end(),
            description = action.description(),
            "commit edit action"
        );

        self.total_bytes += action.size_bytes();
        self.entries.push_back(action);
        self.position = self.entries.len();

        self.enforce_limits();
    }

    /// Undo the most recent action.
    ///
    /// The pending action is committed first. On failure the position is
    /// left unchanged.
    pub fn undo<D>(&mut self, doc: &mut D) -> UndoResult<FocusChange>
    where
        D: EditDocument + ?Sized,
    {
        self.flush();
        let index = self.position.checked_sub(1).ok_or(UndoError::NothingToUndo)?;
        let action = self.entries.get(index).ok_or(UndoError::NothingToUndo)?;

        let focus = action.undo(doc)?;
        self.position = index;

        tracing::debug!(
            target: "note_undo.history",
            field = %action.field(),
            position = self.position,
            cursor = focus.cursor,
            "undo"
        );
        Ok(focus)
    }

    /// Redo the most recently undone action.
    ///
    /// On failure the position is left unchanged.
    pub fn redo<D>(&mut self, doc: &mut D) -> UndoResult<FocusChange>
    where
        D: EditDocument + ?Sized,
    {
        self.flush();
        let action = self
            .entries
            .get(self.position)
            .ok_or(UndoError::NothingToRedo)?;

        let focus = action.redo(doc)?;
        self.position += 1;

        tracing::debug!(
            target: "note_undo.history",
            field = %action.field(),
            position = self.position,
            cursor = focus.cursor,
            "redo"
        );
        Ok(focus)
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.pending.is_some() || self.position > 0
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.pending.is_none() && self.position < self.entries.len()
    }

    // ========================================================================
    // Info
    // ========================================================================

    /// Number of committed actions that can be undone.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.position
    }

    /// Number of committed actions that can be redone.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.entries.len() - self.position
    }

    /// The action still eligible for merging.
    #[must_use]
    pub fn pending(&self) -> Option<&TextEditAction> {
        self.pending.as_ref()
    }

    /// Committed actions, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &TextEditAction> {
        self.entries.iter()
    }

    /// Descriptions of undoable actions (most recent first).
    #[must_use]
    pub fn undo_descriptions(&self, limit: usize) -> Vec<&'static str> {
        self.pending
            .iter()
            .chain(self.entries.range(..self.position).rev())
            .take(limit)
            .map(TextEditAction::description)
            .collect()
    }

    /// Descriptions of redoable actions (next redo first).
    #[must_use]
    pub fn redo_descriptions(&self, limit: usize) -> Vec<&'static str> {
        if self.pending.is_some() {
            return Vec::new();
        }
        self.entries
            .range(self.position..)
            .take(limit)
            .map(TextEditAction::description)
            .collect()
    }

    /// Description of the next undo.
    #[must_use]
    pub fn next_undo_description(&self) -> Option<&'static str> {
        self.undo_descriptions(1).first().copied()
    }

    /// Description of the next redo.
    #[must_use]
    pub fn next_redo_description(&self) -> Option<&'static str> {
        self.redo_descriptions(1).first().copied()
    }

    /// Total bytes used by committed actions.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.total_bytes
    }

    /// Get the current configuration.
    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Clear all history, including the pending action.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.pending = None;
        self.position = 0;
        self.total_bytes = 0;
    }

    /// Drop entries after the current position.
    fn truncate_redo(&mut self) {
        while self.entries.len() > self.position {
            if let Some(action) = self.entries.pop_back() {
                self.total_bytes = self.total_bytes.saturating_sub(action.size_bytes());
            }
        }
    }

    /// Evict oldest entries until depth and memory limits hold.
    ///
    /// The newest entry is never evicted for memory alone.
    fn enforce_limits(&mut self) {
        while self.entries.len() > self.config.max_depth {
            self.evict_oldest();
        }

        if self.config.max_bytes > 0 {
            while self.total_bytes > self.config.max_bytes && self.entries.len() > 1 {
                self.evict_oldest();
            }
        }
    }

    fn evict_oldest(&mut self) {
        if let Some(action) = self.entries.pop_front() {
            self.total_bytes = self.total_bytes.saturating_sub(action.size_bytes());
            self.position = self.position.saturating_sub(1);
            tracing::debug!(
                target: "note_undo.history",
                field = %action.field(),
                remaining = self.entries.len(),
                "evict oldest edit action"
            );
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::FieldId;
    use crate::document::NoteDocument;
    use crate::text::EditableText;

    const BODY: FieldId = FieldId::content(1);
    const TITLE: FieldId = FieldId::title(0);

    /// Apply an edit to the document and build the matching action.
    fn type_in(
        doc: &mut NoteDocument,
        field: FieldId,
        start: usize,
        end: usize,
        text: &str,
    ) -> TextEditAction {
        let target = doc.field_mut(field).unwrap();
        let before = target.text();
        let old: String = before.chars().skip(start).take(end - start).collect();
        target.replace(start, end, text).unwrap();
        TextEditAction::create(field, start, end, old, text)
    }

    fn body(doc: &NoteDocument) -> String {
        doc.text_of(BODY).unwrap()
    }

    #[test]
    fn new_history() {
        let history = UndoHistory::default();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo_depth(), 0);
        assert_eq!(history.redo_depth(), 0);
        assert!(history.pending().is_none());
    }

    #[test]
    fn record_keeps_action_pending() {
        let mut doc = NoteDocument::text_note("", "");
        let mut history = UndoHistory::default();
        history.record(type_in(&mut doc, BODY, 0, 0, "a"));

        assert!(history.can_undo());
        assert_eq!(history.undo_depth(), 0);
        assert_eq!(history.pending().map(|a| a.new_text()), Some("a"));
    }

    #[test]
    fn typing_merges_into_one_entry() {
        let mut doc = NoteDocument::text_note("", "");
        let mut history = UndoHistory::default();
        for (i, c) in ["h", "e", "l", "l", "o"].into_iter().enumerate() {
            history.record(type_in(&mut doc, BODY, i, i, c));
        }
        history.flush();

        assert_eq!(history.undo_depth(), 1);
        assert_eq!(body(&doc), "hello");
        history.undo(&mut doc).unwrap();
        assert_eq!(body(&doc), "");
    }

    #[test]
    fn unmergeable_action_commits_pending() {
        let mut doc = NoteDocument::text_note("", "abcdef");
        let mut history = UndoHistory::default();
        history.record(type_in(&mut doc, BODY, 0, 0, "x"));
        history.record(type_in(&mut doc, BODY, 6, 6, "y"));

        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.pending().map(|a| a.new_text()), Some("y"));
    }

    #[test]
    fn field_switch_commits_pending() {
        let mut doc = NoteDocument::text_note("", "");
        let mut history = UndoHistory::default();
        history.record(type_in(&mut doc, TITLE, 0, 0, "T"));
        history.record(type_in(&mut doc, BODY, 0, 0, "B"));
        history.flush();

        assert_eq!(history.undo_depth(), 2);
        let focus = history.undo(&mut doc).unwrap();
        assert_eq!(focus.item_pos, 1);
        let focus = history.undo(&mut doc).unwrap();
        assert_eq!(focus.item_pos, 0);
        assert_eq!(doc.text_of(TITLE).unwrap(), "");
    }

    #[test]
    fn flush_is_idempotent() {
        let mut doc = NoteDocument::text_note("", "");
        let mut history = UndoHistory::default();
        history.record(type_in(&mut doc, BODY, 0, 0, "a"));
        history.flush();
        history.flush();
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn undo_flushes_pending() {
        let mut doc = NoteDocument::text_note("", "abc");
        let mut history = UndoHistory::default();
        history.record(type_in(&mut doc, BODY, 3, 3, "d"));

        let focus = history.undo(&mut doc).unwrap();
        assert_eq!(body(&doc), "abc");
        assert_eq!(focus, FocusChange::new(1, 3));
        assert!(history.can_redo());
    }

    #[test]
    fn undo_redo_cycle() {
        let mut doc = NoteDocument::text_note("", "abcdef");
        let mut history = UndoHistory::default();
        history.push(type_in(&mut doc, BODY, 4, 6, ""));
        assert_eq!(body(&doc), "abcd");

        let focus = history.undo(&mut doc).unwrap();
        assert_eq!(body(&doc), "abcdef");
        assert_eq!(focus.cursor, 6);

        let focus = history.redo(&mut doc).unwrap();
        assert_eq!(body(&doc), "abcd");
        assert_eq!(focus.cursor, 4);
    }

    #[test]
    fn undo_without_actions() {
        let mut doc = NoteDocument::new();
        let mut history = UndoHistory::default();
        assert_eq!(history.undo(&mut doc), Err(UndoError::NothingToUndo));
    }

    #[test]
    fn redo_without_actions() {
        let mut doc = NoteDocument::new();
        let mut history = UndoHistory::default();
        assert_eq!(history.redo(&mut doc), Err(UndoError::NothingToRedo));
    }

    #[test]
    fn record_after_undo_discards_redo() {
        let mut doc = NoteDocument::text_note("", "");
        let mut history = UndoHistory::default();
        history.push(type_in(&mut doc, BODY, 0, 0, "a"));
        history.push(type_in(&mut doc, BODY, 1, 1, " b"));
        history.undo(&mut doc).unwrap();
        assert_eq!(history.redo_depth(), 1);

        history.record(type_in(&mut doc, BODY, 1, 1, "c"));
        assert!(!history.can_redo());
        assert_eq!(history.redo_depth(), 0);
        assert_eq!(history.redo(&mut doc), Err(UndoError::NothingToRedo));
        assert_eq!(body(&doc), "ac");
    }

    #[test]
    fn failed_undo_keeps_position() {
        let mut doc = NoteDocument::text_note("", "abc");
        let mut history = UndoHistory::default();
        history.push(TextEditAction::create(BODY, 5, 5, "", "xyz"));

        assert!(matches!(
            history.undo(&mut doc),
            Err(UndoError::InvalidRange { .. })
        ));
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(body(&doc), "abc");
    }

    #[test]
    fn failed_redo_keeps_position() {
        let mut doc = NoteDocument::text_note("", "abc");
        let mut history = UndoHistory::default();
        history.push(type_in(&mut doc, BODY, 3, 3, "d"));
        history.undo(&mut doc).unwrap();

        // Field cleared out of band.
        doc.field_mut(BODY).unwrap().replace_all("");
        assert_eq!(
            history.redo(&mut doc),
            Err(UndoError::InvalidRange {
                start: 3,
                end: 3,
                len: 0
            })
        );
        assert_eq!(history.undo_depth(), 0);
        assert_eq!(history.redo_depth(), 1);
        assert_eq!(body(&doc), "");
    }

    #[test]
    fn undo_on_wrong_kind_keeps_position() {
        let mut doc = NoteDocument::text_note("", "abc");
        let mut history = UndoHistory::default();
        let item = FieldId::list_item(1);
        history.push(TextEditAction::create(item, 0, 0, "", "x"));

        assert_eq!(
            history.undo(&mut doc),
            Err(UndoError::KindMismatch {
                field: item,
                actual: crate::action::FieldKind::Content,
            })
        );
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.redo_depth(), 0);
        assert_eq!(body(&doc), "abc");
    }

    #[test]
    fn zero_max_depth_is_raised_to_one() {
        let mut doc = NoteDocument::text_note("", "");
        let mut history = UndoHistory::new(HistoryConfig::new(0, 0));
        assert_eq!(history.config().max_depth, 1);

        history.push(type_in(&mut doc, BODY, 0, 0, "a"));
        history.push(type_in(&mut doc, BODY, 1, 1, "b"));
        assert_eq!(history.undo_depth(), 1);
        history.undo(&mut doc).unwrap();
        assert_eq!(body(&doc), "a");
    }

    #[test]
    fn max_depth_enforced() {
        let mut doc = NoteDocument::text_note("", "");
        let mut history = UndoHistory::new(HistoryConfig::new(3, 0));
        for i in 0..5 {
            history.push(type_in(&mut doc, BODY, i, i, "x"));
        }
        assert_eq!(history.undo_depth(), 3);

        for _ in 0..3 {
            history.undo(&mut doc).unwrap();
        }
        assert_eq!(body(&doc), "xx");
        assert_eq!(history.undo(&mut doc), Err(UndoError::NothingToUndo));
    }

    #[test]
    fn memory_limit_evicts_oldest_but_keeps_newest() {
        let mut doc = NoteDocument::text_note("", "");
        let mut history = UndoHistory::new(HistoryConfig::new(100, 1));
        for i in 0..5 {
            history.push(type_in(&mut doc, BODY, i, i, "x"));
        }
        assert_eq!(history.undo_depth(), 1);
        assert!(history.memory_usage() > 0);
    }

    #[test]
    fn memory_tracking() {
        let mut doc = NoteDocument::text_note("", "");
        let mut history = UndoHistory::new(HistoryConfig::unlimited());
        assert_eq!(history.memory_usage(), 0);

        history.push(type_in(&mut doc, BODY, 0, 0, "hello"));
        let after_push = history.memory_usage();
        assert!(after_push > 0);

        history.undo(&mut doc).unwrap();
        assert_eq!(history.memory_usage(), after_push);

        history.push(type_in(&mut doc, BODY, 0, 0, "a"));
        assert!(history.memory_usage() < after_push);
    }

    #[test]
    fn noop_actions_are_ignored() {
        let mut history = UndoHistory::default();
        history.record(TextEditAction::create(BODY, 0, 3, "abc", "abc"));
        history.push(TextEditAction::create(BODY, 0, 0, "", ""));
        assert!(!history.can_undo());
    }

    #[test]
    fn cancelled_out_typing_leaves_nothing_pending() {
        let mut doc = NoteDocument::text_note("", "ab");
        let mut history = UndoHistory::default();
        history.record(type_in(&mut doc, BODY, 2, 2, "c"));
        history.record(type_in(&mut doc, BODY, 2, 3, ""));
        assert!(history.pending().is_none());
        assert!(!history.can_undo());
    }

    #[test]
    fn descriptions() {
        let mut doc = NoteDocument::text_note("", "abc");
        let mut history = UndoHistory::default();
        history.push(type_in(&mut doc, BODY, 3, 3, "d"));
        history.push(type_in(&mut doc, BODY, 0, 1, ""));
        history.record(type_in(&mut doc, TITLE, 0, 0, "t"));

        assert_eq!(
            history.undo_descriptions(5),
            vec!["Insert text", "Delete text", "Insert text"]
        );
        assert_eq!(history.undo_descriptions(2).len(), 2);
        assert!(history.redo_descriptions(5).is_empty());

        history.undo(&mut doc).unwrap();
        history.undo(&mut doc).unwrap();
        assert_eq!(history.next_undo_description(), Some("Insert text"));
        assert_eq!(history.next_redo_description(), Some("Delete text"));
        assert_eq!(history.redo_descriptions(5).len(), 2);
    }

    #[test]
    fn clear_resets_everything() {
        let mut doc = NoteDocument::text_note("", "");
        let mut history = UndoHistory::default();
        history.push(type_in(&mut doc, BODY, 0, 0, "a"));
        history.record(type_in(&mut doc, BODY, 0, 0, "b"));
        history.clear();

        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.memory_usage(), 0);
    }

    #[test]
    fn debug_impl() {
        let history = UndoHistory::default();
        let debug_str = format!("{:?}", history);
        assert!(debug_str.contains("UndoHistory"));
        assert!(debug_str.contains("undo_depth"));
    }
}

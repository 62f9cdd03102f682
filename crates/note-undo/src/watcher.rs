#![forbid(unsafe_code)]

//! Change notifications to edit actions.
//!
//! Input surfaces report changes as a pair of callbacks: one before the text
//! changes, naming the range about to be replaced, and one after, naming the
//! range that replaced it. [`ChangeWatcher`] turns each pair into a
//! [`TextEditAction`].
//!
//! Undo and redo mutate the very fields the watcher observes. Those
//! programmatic mutations must not be recorded again, so the watcher carries
//! an `ignore_changes` guard that is raised around them with
//! [`suppressed`](ChangeWatcher::suppressed).

use crate::action::{FieldId, TextEditAction};
use crate::text::{EditableText, char_len, head, tail};

/// Builds edit actions from before/after change notifications.
#[derive(Debug, Clone, Default)]
pub struct ChangeWatcher {
    /// Text about to be replaced, captured by `before_text_changed`.
    old_text: String,
    ignore_changes: bool,
}

impl ChangeWatcher {
    /// Create a watcher that records changes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `count` chars starting at `start` of `text` are about to be replaced.
    pub fn before_text_changed(&mut self, text: &str, start: usize, count: usize) {
        self.old_text = head(tail(text, start), count).to_owned();
    }

    /// `before` chars starting at `start` were replaced by `count` chars;
    /// `text` is the text after the change.
    ///
    /// Returns `None` while changes are ignored or if nothing changed.
    pub fn on_text_changed(
        &mut self,
        field: FieldId,
        text: &str,
        start: usize,
        before: usize,
        count: usize,
    ) -> Option<TextEditAction> {
        let old_text = std::mem::take(&mut self.old_text);
        if self.ignore_changes {
            return None;
        }
        let new_text = head(tail(text, start), count);
        let action = TextEditAction::create(field, start, start + before, old_text, new_text);
        (!action.is_noop()).then_some(action)
    }

    /// Action turning `before` into `after`, from whole-text snapshots.
    ///
    /// Canonical trimming reduces the full replacement to the changed range.
    #[must_use]
    pub fn diff(&self, field: FieldId, before: &str, after: &str) -> Option<TextEditAction> {
        if self.ignore_changes {
            return None;
        }
        let action = TextEditAction::create(field, 0, char_len(before), before, after);
        (!action.is_noop()).then_some(action)
    }

    /// Whether changes are currently ignored.
    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.ignore_changes
    }

    /// Run `f` with changes ignored.
    ///
    /// `f` receives the watcher, so a surface that reports the programmatic
    /// mutation back through `before_text_changed`/`on_text_changed` while
    /// `f` runs gets `None` instead of an action.
    pub fn suppressed<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = std::mem::replace(&mut self.ignore_changes, true);
        let result = f(self);
        self.ignore_changes = previous;
        result
    }

    /// Set the text of a field without recording it.
    pub fn bind(&mut self, target: &mut dyn EditableText, text: &str) {
        self.suppressed(|_| target.replace_all(text));
    }
}

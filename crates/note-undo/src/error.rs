#![forbid(unsafe_code)]

//! Error type shared by actions, documents and the history manager.

use std::fmt;

use crate::action::{FieldId, FieldKind};

/// Result of an undo/redo step.
pub type UndoResult<T> = Result<T, UndoError>;

/// Errors that can occur while applying or navigating edit history.
///
/// `NothingToUndo` and `NothingToRedo` are boundary signals; callers usually
/// disable the matching UI affordance instead of showing them. The remaining
/// variants mean the document and the history went out of sync, which is a
/// caller bug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoError {
    /// History position is at the start of the stack.
    NothingToUndo,
    /// History position is at the end of the stack.
    NothingToRedo,
    /// Offsets fall outside the current text of the field.
    InvalidRange {
        start: usize,
        end: usize,
        len: usize,
    },
    /// No item exists at the field position.
    FieldNotFound(FieldId),
    /// The item at the field position is of another kind.
    KindMismatch { field: FieldId, actual: FieldKind },
}

impl fmt::Display for UndoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToUndo => write!(f, "nothing to undo"),
            Self::NothingToRedo => write!(f, "nothing to redo"),
            Self::InvalidRange { start, end, len } => {
                write!(f, "range {}..{} out of bounds (length {})", start, end, len)
            }
            Self::FieldNotFound(field) => write!(f, "field {} not found", field),
            Self::KindMismatch { field, actual } => {
                write!(f, "kind mismatch for {}: found {}", field, actual)
            }
        }
    }
}

impl std::error::Error for UndoError {}

/// Check that `start..end` is a valid range into text of `len` chars.
pub(crate) fn check_range(start: usize, end: usize, len: usize) -> UndoResult<()> {
    if start > end || end > len {
        tracing::error!(
            target: "note_undo.text",
            start,
            end,
            len,
            "edit range out of bounds"
        );
        return Err(UndoError::InvalidRange { start, end, len });
    }
    Ok(())
}

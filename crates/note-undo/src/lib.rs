#![forbid(unsafe_code)]

//! Undo/redo engine for multi-field note editing.
//!
//! Input surfaces report every text change of a note title, body or
//! checklist item. Storing one undo step per keystroke would be useless, so
//! consecutive changes to the same field are merged into a single
//! [`TextEditAction`] before being committed to the [`UndoHistory`].
//!
//! # Key Components
//!
//! - [`TextEditAction`] - Canonical, mergeable record of one text replacement
//! - [`UndoHistory`] - Bounded linear history with a pending merge slot
//! - [`EditableText`] / [`EditDocument`] - What undo/redo needs from fields
//! - [`NoteDocument`] - Title, body and checklist items backed by ropes
//! - [`ChangeWatcher`] - Change notifications to actions, with a re-entrancy guard
//! - [`EditSession`] - Glue between an input surface, a document and its history
//!
//! # Example
//!
//! ```
//! use note_undo::{EditSession, FieldId, HistoryConfig, NoteDocument};
//!
//! let doc = NoteDocument::text_note("Groceries", "milk");
//! let mut session = EditSession::new(doc, HistoryConfig::default());
//! let body = FieldId::content(1);
//!
//! for (i, c) in ", eggs".chars().enumerate() {
//!     session.edit(body, 4 + i, 4 + i, &c.to_string()).unwrap();
//! }
//! assert_eq!(session.document().text_of(body).unwrap(), "milk, eggs");
//!
//! // All six keystrokes undo as one step.
//! let focus = session.undo().unwrap();
//! assert_eq!(session.document().text_of(body).unwrap(), "milk");
//! assert_eq!((focus.item_pos, focus.cursor), (1, 4));
//! ```
//!
//! # Threading
//!
//! Everything runs on the thread that owns the document. There is no
//! background work and no locking; all mutation goes through `&mut self`.

pub mod action;
pub mod config;
pub mod document;
pub mod error;
pub mod history;
pub mod session;
pub mod text;
pub mod watcher;

pub use action::{FieldId, FieldKind, FocusChange, MergeCase, TextEditAction};
pub use config::{ConfigError, HistoryConfig};
pub use document::{EditDocument, NoteDocument, NoteItem};
pub use error::{UndoError, UndoResult};
pub use history::UndoHistory;
pub use session::EditSession;
pub use text::{EditableText, RopeText};
pub use watcher::ChangeWatcher;

//! Change-history domain module.
//!
//! # Module Structure
//!
//! - `model`: `HistoryEntry` and the `ChangeRecord` tagged union, with their
//!   stored wire shapes
//! - `builder`: summary templating and the append-only history log builder

pub mod builder;
mod model;

pub use builder::{
    DEFAULT_AUTHOR, append_history, creation_entry, images_title, next_entry, note_entry,
    push_entry, summarize,
};
pub use model::{ChangeRecord, HistoryEntry, IMAGES_FIELD, ImageChangeKind, UNSPECIFIED};

//! History Log Builder.
//!
//! Turns a list of change records into the next history entry of an entity
//! and returns the updated entity value. Inputs are never mutated in place.

use chrono::{DateTime, Utc};

use super::model::{ChangeRecord, HistoryEntry, ImageChangeKind};
use crate::entity::{Entity, field_label};

/// Author recorded when the acting user supplied no identifier.
pub const DEFAULT_AUTHOR: &str = "autor";

fn author_or_default(author: &str) -> String {
    if author.trim().is_empty() {
        DEFAULT_AUTHOR.to_string()
    } else {
        author.to_string()
    }
}

fn images_phrase(kind: ImageChangeKind, count: usize) -> String {
    match kind {
        ImageChangeKind::Added => format!("{} imagen(es) agregada(s)", count),
        ImageChangeKind::Removed => format!("{} imagen(es) eliminada(s)", count),
    }
}

/// Title of an attach/detach shortcut entry, singular for one image.
pub fn images_title(kind: ImageChangeKind, count: usize) -> &'static str {
    match (kind, count == 1) {
        (ImageChangeKind::Added, true) => "Imagen agregada",
        (ImageChangeKind::Added, false) => "Imágenes agregadas",
        (ImageChangeKind::Removed, true) => "Imagen eliminada",
        (ImageChangeKind::Removed, false) => "Imágenes eliminadas",
    }
}

/// Joins one short phrase per change: `"<Field> actualizado"` for field
/// changes, `"<n> imagen(es) agregada(s)"` / `"... eliminada(s)"` for image
/// set changes.
pub fn summarize(changes: &[ChangeRecord]) -> String {
    changes
        .iter()
        .map(|change| match change {
            ChangeRecord::Field { field, .. } => format!("{} actualizado", field_label(field)),
            ChangeRecord::Images { kind, image_ids } => images_phrase(*kind, image_ids.len()),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds the entry that would follow the entity's current history.
///
/// Callers must not pass an empty change list: an empty diff means there is
/// nothing to record.
pub fn next_entry<E: Entity>(
    entity: &E,
    changes: Vec<ChangeRecord>,
    title: &str,
    author: &str,
    now: DateTime<Utc>,
) -> HistoryEntry {
    HistoryEntry {
        id: entity.history().len() as u32 + 1,
        title: title.to_string(),
        summary: summarize(&changes),
        author: author_or_default(author),
        timestamp: now,
        changes,
        url: None,
    }
}

/// Returns a copy of `entity` with `entry` appended and `modifiedAt` moved to
/// the entry's timestamp. The entry id is re-derived from the history length.
pub fn push_entry<E: Entity>(entity: &E, mut entry: HistoryEntry) -> E {
    let mut next = entity.clone();
    entry.id = next.history().len() as u32 + 1;
    next.set_modified_at(entry.timestamp);
    next.history_mut().push(entry);
    next
}

/// Appends a history entry for `changes` and returns the new entity value.
pub fn append_history<E: Entity>(
    entity: &E,
    changes: Vec<ChangeRecord>,
    title: &str,
    author: &str,
) -> E {
    let entry = next_entry(entity, changes, title, author, Utc::now());
    push_entry(entity, entry)
}

/// Entry #1 of a freshly created entity: its initial field values and any
/// images attached at creation.
pub fn creation_entry<E: Entity>(entity: &E, author: &str, now: DateTime<Utc>) -> HistoryEntry {
    let mut phrases: Vec<String> = entity
        .describe()
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(field, value)| format!("{}: \"{}\"", field_label(field), value))
        .collect();

    let mut changes = Vec::new();
    let images = entity.image_refs();
    if !images.is_empty() {
        phrases.push(images_phrase(ImageChangeKind::Added, images.len()));
        changes.push(ChangeRecord::images_added(images.to_vec()));
    }

    HistoryEntry {
        id: 1,
        title: E::KIND.created_title().to_string(),
        summary: phrases.join(", "),
        author: author_or_default(author),
        timestamp: now,
        changes,
        url: None,
    }
}

/// A one-line entry whose summary repeats its title (status flips).
pub fn note_entry<E: Entity>(
    entity: &E,
    title: &str,
    author: &str,
    now: DateTime<Utc>,
) -> HistoryEntry {
    HistoryEntry {
        id: entity.history().len() as u32 + 1,
        title: title.to_string(),
        summary: title.to_string(),
        author: author_or_default(author),
        timestamp: now,
        changes: Vec::new(),
        url: None,
    }
}

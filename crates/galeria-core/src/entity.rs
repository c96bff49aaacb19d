//! The generic entity shape shared by images, tasks, segments and flyers.

use std::fmt::{self, Debug};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::history::HistoryEntry;

/// Integer identifier, unique within its collection and never reused.
pub type EntityId = u64;

/// Status marker of an entity that is visible in default views.
pub const STATUS_ACTIVE: &str = "activo";

/// Status marker of a soft-deleted entity.
pub const STATUS_REMOVED: &str = "eliminado";

pub(crate) fn default_status() -> String {
    STATUS_ACTIVE.to_string()
}

/// The versioned record kinds managed by entity stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Image,
    Task,
    Segment,
    Flyer,
}

impl EntityKind {
    /// Key of the document holding the whole collection.
    pub fn collection_key(self) -> &'static str {
        match self {
            EntityKind::Image => "images",
            EntityKind::Task => "tareas",
            EntityKind::Segment => "segmentaciones",
            EntityKind::Flyer => "volantes",
        }
    }

    pub fn created_title(self) -> &'static str {
        match self {
            EntityKind::Image => "Imagen creada",
            EntityKind::Task => "Tarea creada",
            EntityKind::Segment => "Segmentación creada",
            EntityKind::Flyer => "Volante creado",
        }
    }

    pub fn edited_title(self) -> &'static str {
        match self {
            EntityKind::Segment => "Datos actualizados",
            _ => "Edición realizada",
        }
    }

    pub fn removed_title(self) -> &'static str {
        match self {
            EntityKind::Image => "Se eliminó imagen",
            EntityKind::Task => "Se eliminó tarea",
            EntityKind::Segment => "Se eliminó segmentación",
            EntityKind::Flyer => "Se eliminó volante",
        }
    }

    pub fn restored_title(self) -> &'static str {
        match self {
            EntityKind::Image => "Se restauró imagen",
            EntityKind::Task => "Se restauró tarea",
            EntityKind::Segment => "Se restauró segmentación",
            EntityKind::Flyer => "Se restauró volante",
        }
    }

    /// Media-host folder holding the assets of entity `id`, for kinds that
    /// own hosted files. Only images upload under `app/<id>`.
    pub fn media_prefix(self, id: EntityId) -> Option<String> {
        match self {
            EntityKind::Image => Some(crate::repository::media_path(id, None)),
            _ => None,
        }
    }

    /// Name used in `NotFound` errors and log lines.
    pub fn type_name(self) -> &'static str {
        match self {
            EntityKind::Image => "Image",
            EntityKind::Task => "Task",
            EntityKind::Segment => "Segment",
            EntityKind::Flyer => "Flyer",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A partial set of proposed field values for an entity.
///
/// `proposed` lists the fields that are present, keyed by their stored wire
/// name and stringified the same way `Entity::field_value` stringifies them.
pub trait EntityPatch<E>: Clone + Debug + Default + Send + Sync + 'static {
    fn proposed(&self) -> Vec<(&'static str, String)>;

    /// Merges the present fields into `entity`.
    fn apply_to(self, entity: &mut E);
}

/// A versioned record with an append-only history.
pub trait Entity:
    Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: EntityKind;

    /// Whether the kind carries an `imagenes` reference set.
    const HAS_IMAGE_REFS: bool;

    /// Initial field values supplied to `create`.
    type Draft: Debug + Send + 'static;

    type Patch: EntityPatch<Self>;

    /// Builds a fresh entity with an empty history.
    fn from_draft(id: EntityId, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    fn id(&self) -> EntityId;

    /// Current value of the field stored under `field`, stringified.
    fn field_value(&self, field: &str) -> Option<String>;

    /// Fields summarised by the creation history entry, in display order.
    fn describe(&self) -> Vec<(&'static str, String)>;

    /// Text matched by free-text search.
    fn search_text(&self) -> Vec<&str>;

    fn status(&self) -> &str;
    fn set_status(&mut self, status: &str);

    fn image_refs(&self) -> &[EntityId] {
        &[]
    }

    fn set_image_refs(&mut self, _refs: Vec<EntityId>) {}

    fn history(&self) -> &[HistoryEntry];
    fn history_mut(&mut self) -> &mut Vec<HistoryEntry>;

    fn created_at(&self) -> DateTime<Utc>;
    fn modified_at(&self) -> DateTime<Utc>;
    fn set_modified_at(&mut self, at: DateTime<Utc>);

    fn is_removed(&self) -> bool {
        self.status() == STATUS_REMOVED
    }

    /// Case-insensitive substring match over `search_text`. An empty query
    /// matches everything.
    fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.search_text()
            .iter()
            .any(|text| text.to_lowercase().contains(&needle))
    }
}

/// Upper-cases the first character of a wire field name for display.
pub fn field_label(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Splits a patch value into "present" or "absent", treating blank text as
/// absent. Form-driven kinds use this so an untouched input never clears a
/// stored value.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_label() {
        assert_eq!(field_label("nombre"), "Nombre");
        assert_eq!(field_label("campaña"), "Campaña");
        assert_eq!(field_label("costoPorVenta"), "CostoPorVenta");
        assert_eq!(field_label(""), "");
    }

    #[test]
    fn test_media_prefix_only_for_images() {
        assert_eq!(EntityKind::Image.media_prefix(7).as_deref(), Some("app/7"));
        assert_eq!(EntityKind::Task.media_prefix(7), None);
    }
}

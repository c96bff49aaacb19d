//! History entry and change record models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Field name recorded on image-set change records.
pub const IMAGES_FIELD: &str = "Imágenes";

/// Placeholder recorded as the "before" value of a field that was empty.
pub const UNSPECIFIED: &str = "No especificado";

/// Direction of an image-set change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageChangeKind {
    #[serde(rename = "agregadas")]
    Added,
    #[serde(rename = "eliminadas")]
    Removed,
}

/// A single structured change carried by a history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ChangeRecordRepr", into = "ChangeRecordRepr")]
pub enum ChangeRecord {
    /// A scalar field went from `before` to `after` (both stringified).
    Field {
        field: String,
        before: String,
        after: String,
    },
    /// Image references were attached to or detached from the entity.
    Images {
        kind: ImageChangeKind,
        image_ids: Vec<EntityId>,
    },
}

impl ChangeRecord {
    pub fn field(
        field: impl Into<String>,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> Self {
        Self::Field {
            field: field.into(),
            before: before.into(),
            after: after.into(),
        }
    }

    pub fn images_added(image_ids: Vec<EntityId>) -> Self {
        Self::Images {
            kind: ImageChangeKind::Added,
            image_ids,
        }
    }

    pub fn images_removed(image_ids: Vec<EntityId>) -> Self {
        Self::Images {
            kind: ImageChangeKind::Removed,
            image_ids,
        }
    }
}

/// Stored shape of a change record: one flat object whose optional keys tell
/// the two variants apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChangeRecordRepr {
    campo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    anterior: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nuevo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tipo: Option<ImageChangeKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    imagenes: Option<Vec<EntityId>>,
}

impl From<ChangeRecordRepr> for ChangeRecord {
    fn from(repr: ChangeRecordRepr) -> Self {
        match repr.tipo {
            Some(kind) => ChangeRecord::Images {
                kind,
                image_ids: repr.imagenes.unwrap_or_default(),
            },
            None => ChangeRecord::Field {
                field: repr.campo,
                before: repr.anterior.unwrap_or_default(),
                after: repr.nuevo.unwrap_or_default(),
            },
        }
    }
}

impl From<ChangeRecord> for ChangeRecordRepr {
    fn from(record: ChangeRecord) -> Self {
        match record {
            ChangeRecord::Field {
                field,
                before,
                after,
            } => ChangeRecordRepr {
                campo: field,
                anterior: Some(before),
                nuevo: Some(after),
                tipo: None,
                imagenes: None,
            },
            ChangeRecord::Images { kind, image_ids } => ChangeRecordRepr {
                campo: IMAGES_FIELD.to_string(),
                anterior: None,
                nuevo: None,
                tipo: Some(kind),
                imagenes: Some(image_ids),
            },
        }
    }
}

/// One audit-log record: what changed, who changed it, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// 1-based sequence number, contiguous within the owning entity.
    pub id: u32,
    #[serde(rename = "titulo")]
    pub title: String,
    /// Comma-joined human-readable description of `changes`.
    #[serde(rename = "descripcion", default)]
    pub summary: String,
    #[serde(rename = "autor", default)]
    pub author: String,
    #[serde(
        rename = "fechaModificacion",
        with = "crate::timestamp",
        default = "Utc::now"
    )]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "cambios", default)]
    pub changes: Vec<ChangeRecord>,
    /// Hosted file that this entry introduced, when the edit replaced it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

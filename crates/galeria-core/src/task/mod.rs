//! Task domain model.
//!
//! Tasks are the calendar entries of the scheduling board. Each one is pinned
//! to a day (`fecha`) and references the images it needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, EntityKind, EntityPatch, STATUS_ACTIVE, default_status};
use crate::history::HistoryEntry;

/// Task status used for urgent work.
pub const STATUS_URGENT: &str = "urgente";

/// Task status used for finished work.
pub const STATUS_DONE: &str = "terminado";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "estado", default = "default_status")]
    pub status: String,
    #[serde(rename = "fecha", with = "crate::timestamp", default = "Utc::now")]
    pub date: DateTime<Utc>,
    #[serde(rename = "imagenes", default)]
    pub images: Vec<EntityId>,
    #[serde(
        rename = "fechaCreacion",
        with = "crate::timestamp",
        default = "Utc::now"
    )]
    pub created_at: DateTime<Utc>,
    #[serde(
        rename = "fechaModificacion",
        with = "crate::timestamp",
        default = "Utc::now"
    )]
    pub modified_at: DateTime<Utc>,
    #[serde(rename = "historial", default)]
    pub history: Vec<HistoryEntry>,
}

/// Day-granularity rendering used both for diffing and for change records.
pub fn format_day(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    /// Blank means `"activo"`.
    pub status: String,
    pub date: DateTime<Utc>,
    pub images: Vec<EntityId>,
}

impl NewTask {
    /// An untitled active task on `date` with no images.
    pub fn on(date: DateTime<Utc>) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: STATUS_ACTIVE.to_string(),
            date,
            images: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl EntityPatch<Task> for TaskPatch {
    fn proposed(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(title) = &self.title {
            fields.push(("titulo", title.clone()));
        }
        if let Some(description) = &self.description {
            fields.push(("descripcion", description.clone()));
        }
        if let Some(status) = &self.status {
            fields.push(("estado", status.clone()));
        }
        if let Some(date) = &self.date {
            fields.push(("fecha", format_day(date)));
        }
        fields
    }

    fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(date) = self.date {
            task.date = date;
        }
    }
}

impl Entity for Task {
    const KIND: EntityKind = EntityKind::Task;
    const HAS_IMAGE_REFS: bool = true;

    type Draft = NewTask;
    type Patch = TaskPatch;

    fn from_draft(id: EntityId, draft: NewTask, now: DateTime<Utc>) -> Self {
        let status = if draft.status.trim().is_empty() {
            default_status()
        } else {
            draft.status
        };
        let mut images = Vec::with_capacity(draft.images.len());
        for image in draft.images {
            if !images.contains(&image) {
                images.push(image);
            }
        }
        Task {
            id,
            title: draft.title,
            description: draft.description,
            status,
            date: draft.date,
            images,
            created_at: now,
            modified_at: now,
            history: Vec::new(),
        }
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn field_value(&self, field: &str) -> Option<String> {
        match field {
            "titulo" => Some(self.title.clone()),
            "descripcion" => Some(self.description.clone()),
            "estado" => Some(self.status.clone()),
            "fecha" => Some(format_day(&self.date)),
            _ => None,
        }
    }

    fn describe(&self) -> Vec<(&'static str, String)> {
        vec![
            ("titulo", self.title.clone()),
            ("descripcion", self.description.clone()),
            ("estado", self.status.clone()),
        ]
    }

    fn search_text(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_str()]
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    fn image_refs(&self) -> &[EntityId] {
        &self.images
    }

    fn set_image_refs(&mut self, refs: Vec<EntityId>) {
        self.images = refs;
    }

    fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    fn history_mut(&mut self) -> &mut Vec<HistoryEntry> {
        &mut self.history
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    fn set_modified_at(&mut self, at: DateTime<Utc>) {
        self.modified_at = at;
    }
}

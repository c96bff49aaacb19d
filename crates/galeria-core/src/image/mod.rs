//! Image domain model.
//!
//! Images are the media-library records. Their hosted file lives under
//! `app/<id>` on the media host; `url` points at the current version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, EntityKind, EntityPatch, default_status, non_blank};
use crate::history::HistoryEntry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: EntityId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "categoria", default)]
    pub category: String,
    #[serde(rename = "campaña", default)]
    pub campaign: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "autor", default)]
    pub author: String,
    #[serde(rename = "estado", default = "default_status")]
    pub status: String,
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

/// Upload form of a new image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewImage {
    pub name: String,
    pub description: String,
    pub category: String,
    pub campaign: String,
    pub url: String,
    pub author: String,
}

/// Edit form of an image. Blank values leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImagePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub campaign: Option<String>,
    pub url: Option<String>,
}

impl EntityPatch<Image> for ImagePatch {
    fn proposed(&self) -> Vec<(&'static str, String)> {
        [
            ("nombre", &self.name),
            ("descripcion", &self.description),
            ("categoria", &self.category),
            ("campaña", &self.campaign),
            ("url", &self.url),
        ]
        .into_iter()
        .filter_map(|(field, value)| non_blank(value).map(|v| (field, v.to_string())))
        .collect()
    }

    fn apply_to(self, image: &mut Image) {
        let assign = |target: &mut String, value: Option<String>| {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                *target = value;
            }
        };
        assign(&mut image.name, self.name);
        assign(&mut image.description, self.description);
        assign(&mut image.category, self.category);
        assign(&mut image.campaign, self.campaign);
        assign(&mut image.url, self.url);
    }
}

impl Entity for Image {
    const KIND: EntityKind = EntityKind::Image;
    const HAS_IMAGE_REFS: bool = false;

    type Draft = NewImage;
    type Patch = ImagePatch;

    fn from_draft(id: EntityId, draft: NewImage, now: DateTime<Utc>) -> Self {
        Image {
            id,
            name: draft.name,
            description: draft.description,
            category: draft.category,
            campaign: draft.campaign,
            url: draft.url,
            author: draft.author,
            status: default_status(),
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
            "nombre" => Some(self.name.clone()),
            "descripcion" => Some(self.description.clone()),
            "categoria" => Some(self.category.clone()),
            "campaña" => Some(self.campaign.clone()),
            "url" => Some(self.url.clone()),
            "autor" => Some(self.author.clone()),
            "estado" => Some(self.status.clone()),
            _ => None,
        }
    }

    fn describe(&self) -> Vec<(&'static str, String)> {
        vec![
            ("nombre", self.name.clone()),
            ("descripcion", self.description.clone()),
            ("categoria", self.category.clone()),
            ("campaña", self.campaign.clone()),
        ]
    }

    fn search_text(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.description.as_str(),
            self.category.as_str(),
            self.campaign.as_str(),
            self.status.as_str(),
        ]
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
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

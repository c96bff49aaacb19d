//! Flyer domain model: a printed piece composed from library images.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, EntityKind, EntityPatch, default_status};
use crate::history::HistoryEntry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flyer {
    pub id: EntityId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "campaña", default)]
    pub campaign: String,
    #[serde(rename = "autor", default)]
    pub author: String,
    #[serde(rename = "estado", default = "default_status")]
    pub status: String,
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

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewFlyer {
    pub name: String,
    pub description: String,
    pub campaign: String,
    pub author: String,
    pub images: Vec<EntityId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlyerPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub campaign: Option<String>,
}

impl EntityPatch<Flyer> for FlyerPatch {
    fn proposed(&self) -> Vec<(&'static str, String)> {
        [
            ("nombre", &self.name),
            ("descripcion", &self.description),
            ("campaña", &self.campaign),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.clone().map(|v| (field, v)))
        .collect()
    }

    fn apply_to(self, flyer: &mut Flyer) {
        if let Some(name) = self.name {
            flyer.name = name;
        }
        if let Some(description) = self.description {
            flyer.description = description;
        }
        if let Some(campaign) = self.campaign {
            flyer.campaign = campaign;
        }
    }
}

impl Entity for Flyer {
    const KIND: EntityKind = EntityKind::Flyer;
    const HAS_IMAGE_REFS: bool = true;

    type Draft = NewFlyer;
    type Patch = FlyerPatch;

    fn from_draft(id: EntityId, draft: NewFlyer, now: DateTime<Utc>) -> Self {
        let mut images: Vec<EntityId> = Vec::with_capacity(draft.images.len());
        for image in draft.images {
            if !images.contains(&image) {
                images.push(image);
            }
        }
        Flyer {
            id,
            name: draft.name,
            description: draft.description,
            campaign: draft.campaign,
            author: draft.author,
            status: default_status(),
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
            "nombre" => Some(self.name.clone()),
            "descripcion" => Some(self.description.clone()),
            "campaña" => Some(self.campaign.clone()),
            "autor" => Some(self.author.clone()),
            "estado" => Some(self.status.clone()),
            _ => None,
        }
    }

    fn describe(&self) -> Vec<(&'static str, String)> {
        vec![
            ("nombre", self.name.clone()),
            ("descripcion", self.description.clone()),
            ("campaña", self.campaign.clone()),
        ]
    }

    fn search_text(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.description.as_str(),
            self.campaign.as_str(),
        ]
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

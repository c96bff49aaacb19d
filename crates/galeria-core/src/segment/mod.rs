//! Campaign segments and the campaigns that group them.
//!
//! Segments live in their own flat collection and point at their campaign
//! through `campañaId`. Campaigns are plain grouping records without history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, EntityKind, EntityPatch, default_status};
use crate::history::HistoryEntry;

/// Collection key of the campaign directory.
pub const CAMPAIGNS_KEY: &str = "campañas";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: EntityId,
    #[serde(rename = "nombre")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: EntityId,
    #[serde(rename = "campañaId")]
    pub campaign_id: EntityId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "lugares", default)]
    pub places: String,
    #[serde(rename = "edad", default)]
    pub age: String,
    #[serde(rename = "segmentacionDetallada", default)]
    pub detailed_targeting: String,
    #[serde(rename = "inversion", default)]
    pub investment: String,
    #[serde(rename = "costoPorVenta", default)]
    pub cost_per_sale: String,
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

/// A new segment starts with only a name; targeting data is filled in later.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewSegment {
    pub campaign_id: EntityId,
    pub name: String,
    pub images: Vec<EntityId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentPatch {
    pub name: Option<String>,
    pub places: Option<String>,
    pub age: Option<String>,
    pub detailed_targeting: Option<String>,
    pub investment: Option<String>,
    pub cost_per_sale: Option<String>,
}

impl EntityPatch<Segment> for SegmentPatch {
    fn proposed(&self) -> Vec<(&'static str, String)> {
        [
            ("nombre", &self.name),
            ("lugares", &self.places),
            ("edad", &self.age),
            ("segmentacionDetallada", &self.detailed_targeting),
            ("inversion", &self.investment),
            ("costoPorVenta", &self.cost_per_sale),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.clone().map(|v| (field, v)))
        .collect()
    }

    fn apply_to(self, segment: &mut Segment) {
        if let Some(name) = self.name {
            segment.name = name;
        }
        if let Some(places) = self.places {
            segment.places = places;
        }
        if let Some(age) = self.age {
            segment.age = age;
        }
        if let Some(detailed) = self.detailed_targeting {
            segment.detailed_targeting = detailed;
        }
        if let Some(investment) = self.investment {
            segment.investment = investment;
        }
        if let Some(cost) = self.cost_per_sale {
            segment.cost_per_sale = cost;
        }
    }
}

impl Entity for Segment {
    const KIND: EntityKind = EntityKind::Segment;
    const HAS_IMAGE_REFS: bool = true;

    type Draft = NewSegment;
    type Patch = SegmentPatch;

    fn from_draft(id: EntityId, draft: NewSegment, now: DateTime<Utc>) -> Self {
        let mut images: Vec<EntityId> = Vec::with_capacity(draft.images.len());
        for image in draft.images {
            if !images.contains(&image) {
                images.push(image);
            }
        }
        Segment {
            id,
            campaign_id: draft.campaign_id,
            name: draft.name,
            places: String::new(),
            age: String::new(),
            detailed_targeting: String::new(),
            investment: String::new(),
            cost_per_sale: String::new(),
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
        let value = match field {
            "nombre" => &self.name,
            "lugares" => &self.places,
            "edad" => &self.age,
            "segmentacionDetallada" => &self.detailed_targeting,
            "inversion" => &self.investment,
            "costoPorVenta" => &self.cost_per_sale,
            "estado" => &self.status,
            "campañaId" => return Some(self.campaign_id.to_string()),
            _ => return None,
        };
        Some(value.clone())
    }

    fn describe(&self) -> Vec<(&'static str, String)> {
        vec![("nombre", self.name.clone())]
    }

    fn search_text(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.places.as_str(),
            self.detailed_targeting.as_str(),
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

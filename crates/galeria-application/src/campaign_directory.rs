//! Campaign directory: the grouping records segments hang off.
//!
//! Campaigns carry no history. Deleting one hard-destroys its segments.

use std::sync::Arc;

use async_trait::async_trait;
use galeria_core::repository::{CollectionDocument, DocumentStore};
use galeria_core::segment::{CAMPAIGNS_KEY, Campaign, NewSegment, Segment};
use galeria_core::{Entity, EntityId, GaleriaError, Result};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::entity_store::EntityStore;
use crate::observer::{ChangeKind, Observers, StoreEvent, StoreObserver};
use crate::sync::{SnapshotTarget, spawn_snapshot_listener};

#[derive(Default)]
struct CampaignState {
    campaigns: Vec<Campaign>,
    last_id: EntityId,
}

impl CampaignState {
    fn next_id(&self) -> EntityId {
        let max_existing = self.campaigns.iter().map(|c| c.id).max().unwrap_or(0);
        self.last_id.max(max_existing) + 1
    }
}

pub struct CampaignDirectory {
    documents: Arc<dyn DocumentStore>,
    segments: Arc<EntityStore<Segment>>,
    state: RwLock<CampaignState>,
    observers: Observers,
}

impl CampaignDirectory {
    pub async fn open(
        documents: Arc<dyn DocumentStore>,
        segments: Arc<EntityStore<Segment>>,
    ) -> Result<Arc<Self>> {
        let state = match documents.load(CAMPAIGNS_KEY).await? {
            Some(document) => CampaignState {
                campaigns: document.decode()?,
                last_id: document.last_id,
            },
            None => CampaignState::default(),
        };
        tracing::debug!(
            "[CampaignDirectory] Opened with {} campaigns",
            state.campaigns.len()
        );

        Ok(Arc::new(Self {
            documents,
            segments,
            state: RwLock::new(state),
            observers: Observers::default(),
        }))
    }

    pub fn subscribe(&self, observer: Arc<dyn StoreObserver>) {
        self.observers.add(observer);
    }

    pub fn segments(&self) -> &Arc<EntityStore<Segment>> {
        &self.segments
    }

    /// Every campaign in creation order.
    pub async fn list(&self) -> Vec<Campaign> {
        let mut campaigns = self.state.read().await.campaigns.clone();
        campaigns.sort_by_key(|c| c.id);
        campaigns
    }

    pub async fn get(&self, id: EntityId) -> Result<Campaign> {
        self.state
            .read()
            .await
            .campaigns
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| GaleriaError::not_found("Campaign", id))
    }

    pub async fn add_campaign(&self, name: &str) -> Result<Campaign> {
        let mut state = self.state.write().await;
        let campaign = Campaign {
            id: state.next_id(),
            name: name.to_string(),
        };
        state.last_id = campaign.id;
        state.campaigns.push(campaign.clone());
        tracing::info!("[CampaignDirectory] Added campaign {}", campaign.id);

        let failure = self.persist(&state).await;
        drop(state);
        self.finish(campaign.id, ChangeKind::Created, failure);
        Ok(campaign)
    }

    pub async fn rename(&self, id: EntityId, name: &str) -> Result<Campaign> {
        let mut state = self.state.write().await;
        let campaign = state
            .campaigns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| GaleriaError::not_found("Campaign", id))?;
        if campaign.name == name {
            return Ok(campaign.clone());
        }
        campaign.name = name.to_string();
        let renamed = campaign.clone();

        let failure = self.persist(&state).await;
        drop(state);
        self.finish(id, ChangeKind::Updated, failure);
        Ok(renamed)
    }

    /// Removes the campaign and hard-destroys every segment pointing at it.
    /// Absent ids are not an error.
    pub async fn delete_campaign(&self, id: EntityId) -> Result<()> {
        let mut state = self.state.write().await;
        let before = state.campaigns.len();
        state.campaigns.retain(|c| c.id != id);
        let removed = state.campaigns.len() != before;

        let failure = self.persist(&state).await;
        drop(state);

        for segment in self.segments_of(id).await {
            self.segments.hard_destroy(segment.id()).await?;
        }

        if removed {
            self.finish(id, ChangeKind::Destroyed, failure);
        } else if let Some(message) = failure {
            self.notify_persist_failed(message);
        }
        Ok(())
    }

    /// Segments of campaign `id`, newest first, removed ones included.
    pub async fn segments_of(&self, id: EntityId) -> Vec<Segment> {
        let mut segments = self.segments.list().await;
        segments.retain(|segment| segment.campaign_id == id);
        segments
    }

    /// Creates a segment under an existing campaign.
    pub async fn add_segment(
        &self,
        campaign_id: EntityId,
        name: &str,
        author: &str,
    ) -> Result<Segment> {
        self.get(campaign_id).await?;
        self.segments
            .create(
                NewSegment {
                    campaign_id,
                    name: name.to_string(),
                    images: Vec::new(),
                },
                author,
            )
            .await
    }

    pub fn spawn_sync(self: &Arc<Self>) -> JoinHandle<()> {
        spawn_snapshot_listener(self)
    }

    pub async fn apply_snapshot(&self, document: CollectionDocument) -> Result<()> {
        let campaigns: Vec<Campaign> = document.decode()?;
        let count = campaigns.len();
        {
            let mut state = self.state.write().await;
            state.last_id = state.last_id.max(document.last_id);
            state.campaigns = campaigns;
        }
        tracing::debug!("[CampaignDirectory] Applied snapshot ({} campaigns)", count);
        self.observers.notify(StoreEvent::SnapshotApplied {
            collection: CAMPAIGNS_KEY,
            items: count,
        });
        Ok(())
    }

    async fn persist(&self, state: &CampaignState) -> Option<String> {
        let result = match CollectionDocument::encode(&state.campaigns, state.last_id) {
            Ok(document) => self.documents.replace(CAMPAIGNS_KEY, &document).await,
            Err(e) => Err(e),
        };
        result
            .inspect_err(|e| {
                tracing::error!("[CampaignDirectory] Failed to persist campaigns: {}", e);
            })
            .err()
            .map(|e| e.to_string())
    }

    fn finish(&self, id: EntityId, change: ChangeKind, persist_failure: Option<String>) {
        self.observers.notify(StoreEvent::Changed {
            collection: CAMPAIGNS_KEY,
            id,
            change,
        });
        if let Some(message) = persist_failure {
            self.notify_persist_failed(message);
        }
    }

    fn notify_persist_failed(&self, message: String) {
        self.observers.notify(StoreEvent::PersistFailed {
            collection: CAMPAIGNS_KEY,
            message,
        });
    }
}

#[async_trait]
impl SnapshotTarget for CampaignDirectory {
    fn collection_key(&self) -> &'static str {
        CAMPAIGNS_KEY
    }

    fn document_store(&self) -> Arc<dyn DocumentStore> {
        self.documents.clone()
    }

    async fn apply_snapshot(&self, document: CollectionDocument) -> Result<()> {
        CampaignDirectory::apply_snapshot(self, document).await
    }
}

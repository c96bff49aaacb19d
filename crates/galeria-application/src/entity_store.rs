//! Entity Store: the in-memory collection of one entity kind.
//!
//! Every accepted mutation diffs against the current value, appends a history
//! entry and re-persists the whole collection as `{items, lastId}`. A rejected
//! write is logged and reported to observers; the local change is kept.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use galeria_core::diff::{diff, effective_image_changes, merge_image_refs};
use galeria_core::history::{
    ChangeRecord, ImageChangeKind, append_history, creation_entry, images_title, next_entry,
    note_entry, push_entry,
};
use galeria_core::repository::{CollectionDocument, DocumentStore, MediaStore};
use galeria_core::{
    Entity, EntityId, EntityPatch, GaleriaError, Result, STATUS_ACTIVE, STATUS_REMOVED,
};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::observer::{ChangeKind, Observers, StoreEvent, StoreObserver};
use crate::sync::{SnapshotTarget, spawn_snapshot_listener};

/// Own writes remembered so their pushed echoes are not re-applied.
const MAX_PENDING_ECHOES: usize = 16;

/// Outcome of a mutation that may turn out to change nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<E> {
    /// The entity after the change was recorded.
    Applied(E),
    /// Nothing differed; no history entry and no write.
    Unchanged,
}

impl<E> Mutation<E> {
    pub fn applied(self) -> Option<E> {
        match self {
            Mutation::Applied(entity) => Some(entity),
            Mutation::Unchanged => None,
        }
    }
}

struct CollectionState<E> {
    items: Vec<E>,
    last_id: EntityId,
    pending_echoes: VecDeque<CollectionDocument>,
}

impl<E: Entity> CollectionState<E> {
    fn position(&self, id: EntityId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    fn next_id(&self) -> EntityId {
        let max_existing = self.items.iter().map(Entity::id).max().unwrap_or(0);
        self.last_id.max(max_existing) + 1
    }
}

pub struct EntityStore<E: Entity> {
    documents: Arc<dyn DocumentStore>,
    media: Arc<dyn MediaStore>,
    state: RwLock<CollectionState<E>>,
    observers: Observers,
}

impl<E: Entity> EntityStore<E> {
    /// Loads the current collection before accepting any mutation.
    pub async fn open(
        documents: Arc<dyn DocumentStore>,
        media: Arc<dyn MediaStore>,
    ) -> Result<Arc<Self>> {
        let key = E::KIND.collection_key();
        let (items, last_id) = match documents.load(key).await? {
            Some(document) => {
                let items: Vec<E> = document.decode()?;
                (items, document.last_id)
            }
            None => (Vec::new(), 0),
        };
        tracing::debug!(
            "[EntityStore] Opened '{}' with {} items (lastId {})",
            key,
            items.len(),
            last_id
        );

        Ok(Arc::new(Self {
            documents,
            media,
            state: RwLock::new(CollectionState {
                items,
                last_id,
                pending_echoes: VecDeque::new(),
            }),
            observers: Observers::default(),
        }))
    }

    pub fn subscribe(&self, observer: Arc<dyn StoreObserver>) {
        self.observers.add(observer);
    }

    pub fn media_store(&self) -> Arc<dyn MediaStore> {
        self.media.clone()
    }

    pub async fn get(&self, id: EntityId) -> Result<E> {
        self.find(id)
            .await
            .ok_or_else(|| GaleriaError::not_found(E::KIND.type_name(), id))
    }

    pub async fn find(&self, id: EntityId) -> Option<E> {
        let state = self.state.read().await;
        state.position(id).map(|index| state.items[index].clone())
    }

    /// Every entity, newest id first.
    pub async fn list(&self) -> Vec<E> {
        let mut items = self.state.read().await.items.clone();
        items.sort_by(|a, b| b.id().cmp(&a.id()));
        items
    }

    pub async fn list_active(&self) -> Vec<E> {
        let mut items = self.list().await;
        items.retain(|item| !item.is_removed());
        items
    }

    /// The trash view.
    pub async fn list_removed(&self) -> Vec<E> {
        let mut items = self.list().await;
        items.retain(|item| item.is_removed());
        items
    }

    /// Case-insensitive substring search over the kind's text fields.
    pub async fn search(&self, query: &str) -> Vec<E> {
        let mut items = self.list().await;
        items.retain(|item| item.matches(query));
        items
    }

    /// The id the next `create` will assign.
    pub async fn next_id(&self) -> EntityId {
        self.state.read().await.next_id()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Creates an entity under the next id, with its creation history entry.
    pub async fn create(&self, draft: E::Draft, author: &str) -> Result<E> {
        let mut state = self.state.write().await;
        let id = state.next_id();
        let (entity, failure) = self.insert_new(&mut state, id, draft, author).await;
        drop(state);
        self.finish(id, ChangeKind::Created, failure);
        Ok(entity)
    }

    /// Creates an entity under an id obtained earlier from `next_id`, for
    /// flows that must know the id before the record exists.
    pub async fn create_at(&self, id: EntityId, draft: E::Draft, author: &str) -> Result<E> {
        let mut state = self.state.write().await;
        if id == 0 || state.position(id).is_some() || id <= state.last_id {
            return Err(GaleriaError::internal(format!(
                "{} id {} is already assigned",
                E::KIND,
                id
            )));
        }
        let (entity, failure) = self.insert_new(&mut state, id, draft, author).await;
        drop(state);
        self.finish(id, ChangeKind::Created, failure);
        Ok(entity)
    }

    async fn insert_new(
        &self,
        state: &mut CollectionState<E>,
        id: EntityId,
        draft: E::Draft,
        author: &str,
    ) -> (E, Option<String>) {
        let now = Utc::now();
        let fresh = E::from_draft(id, draft, now);
        let entry = creation_entry(&fresh, author, now);
        let entity = push_entry(&fresh, entry);

        state.items.push(entity.clone());
        state.last_id = state.last_id.max(id);
        tracing::info!("[EntityStore] Created {} {}", E::KIND, id);

        let failure = self.persist(state).await;
        (entity, failure)
    }

    /// Applies `patch` and the caller-computed image changes to entity `id`.
    ///
    /// Returns `Mutation::Unchanged` without writing when nothing differs.
    pub async fn update(
        &self,
        id: EntityId,
        patch: E::Patch,
        added: &[EntityId],
        removed: &[EntityId],
        author: &str,
    ) -> Result<Mutation<E>> {
        self.update_recorded(id, patch, added, removed, author, None)
            .await
    }

    /// `update` for a requested image selection change: only additions not
    /// referenced yet and removals currently referenced are recorded.
    pub async fn update_selection(
        &self,
        id: EntityId,
        patch: E::Patch,
        requested_added: &[EntityId],
        requested_removed: &[EntityId],
        author: &str,
    ) -> Result<Mutation<E>> {
        let current = self.get(id).await?;
        let (added, removed) =
            effective_image_changes(current.image_refs(), requested_added, requested_removed);
        self.update(id, patch, &added, &removed, author).await
    }

    /// `update` whose history entry also records the URL of a file uploaded
    /// for this edit.
    pub async fn update_recorded(
        &self,
        id: EntityId,
        patch: E::Patch,
        added: &[EntityId],
        removed: &[EntityId],
        author: &str,
        url: Option<String>,
    ) -> Result<Mutation<E>> {
        let (added, removed) = if E::HAS_IMAGE_REFS {
            (added, removed)
        } else {
            if !added.is_empty() || !removed.is_empty() {
                tracing::warn!(
                    "[EntityStore] {} has no image references; ignoring image changes",
                    E::KIND
                );
            }
            (&[][..], &[][..])
        };

        let mut state = self.state.write().await;
        let index = state
            .position(id)
            .ok_or_else(|| GaleriaError::not_found(E::KIND.type_name(), id))?;
        let current = &state.items[index];

        let changes = diff(current, &patch, added, removed);
        if changes.is_empty() {
            tracing::debug!("[EntityStore] No changes for {} {}", E::KIND, id);
            return Ok(Mutation::Unchanged);
        }

        let mut next = current.clone();
        patch.apply_to(&mut next);
        if !added.is_empty() || !removed.is_empty() {
            next.set_image_refs(merge_image_refs(current.image_refs(), added, removed));
        }
        let mut entry = next_entry(current, changes, E::KIND.edited_title(), author, Utc::now());
        entry.url = url;
        let next = push_entry(&next, entry);

        state.items[index] = next.clone();
        tracing::info!("[EntityStore] Updated {} {}", E::KIND, id);

        let failure = self.persist(&mut state).await;
        drop(state);
        self.finish(id, ChangeKind::Updated, failure);
        Ok(Mutation::Applied(next))
    }

    /// Flips the status to the removed marker and records it.
    pub async fn soft_delete(&self, id: EntityId, author: &str) -> Result<Mutation<E>> {
        self.set_status(id, STATUS_REMOVED, author).await
    }

    /// Flips the status back to the active marker and records it.
    pub async fn restore(&self, id: EntityId, author: &str) -> Result<Mutation<E>> {
        self.set_status(id, STATUS_ACTIVE, author).await
    }

    async fn set_status(&self, id: EntityId, status: &str, author: &str) -> Result<Mutation<E>> {
        let (title, change) = if status == STATUS_REMOVED {
            (E::KIND.removed_title(), ChangeKind::SoftDeleted)
        } else {
            (E::KIND.restored_title(), ChangeKind::Restored)
        };

        let mut state = self.state.write().await;
        let index = state
            .position(id)
            .ok_or_else(|| GaleriaError::not_found(E::KIND.type_name(), id))?;
        let current = &state.items[index];
        if current.status() == status {
            tracing::debug!("[EntityStore] {} {} is already '{}'", E::KIND, id, status);
            return Ok(Mutation::Unchanged);
        }

        let mut next = current.clone();
        next.set_status(status);
        let entry = note_entry(current, title, author, Utc::now());
        let next = push_entry(&next, entry);

        state.items[index] = next.clone();
        tracing::info!("[EntityStore] {} {} is now '{}'", E::KIND, id, status);

        let failure = self.persist(&mut state).await;
        drop(state);
        self.finish(id, change, failure);
        Ok(Mutation::Applied(next))
    }

    /// Removes entity `id` and its hosted assets.
    ///
    /// Absent ids are not an error. A failed asset deletion is reported to
    /// observers and the collection is persisted anyway.
    pub async fn hard_destroy(&self, id: EntityId) -> Result<()> {
        let mut state = self.state.write().await;
        let before = state.items.len();
        state.items.retain(|item| item.id() != id);
        let removed = state.items.len() != before;
        tracing::info!(
            "[EntityStore] Destroying {} {} (present: {})",
            E::KIND,
            id,
            removed
        );

        let mut asset_failure = None;
        if let Some(prefix) = E::KIND.media_prefix(id) {
            if let Err(e) = self.media.delete_by_prefix(&prefix).await {
                tracing::warn!(
                    "[EntityStore] Could not delete assets under {}: {}",
                    prefix,
                    e
                );
                asset_failure = Some(e.to_string());
            }
        }

        let failure = self.persist(&mut state).await;
        drop(state);

        if let Some(message) = asset_failure {
            self.observers.notify(StoreEvent::RemoteAssetFailed {
                collection: E::KIND.collection_key(),
                id,
                message,
            });
        }
        if removed {
            self.finish(id, ChangeKind::Destroyed, failure);
        } else if let Some(message) = failure {
            self.notify_persist_failed(message);
        }
        Ok(())
    }

    /// Adds the ids of `image_ids` not referenced yet, as one entry.
    pub async fn attach_images(
        &self,
        id: EntityId,
        image_ids: &[EntityId],
        author: &str,
    ) -> Result<Mutation<E>> {
        self.change_image_refs(id, image_ids, ImageChangeKind::Added, author)
            .await
    }

    /// Drops the ids of `image_ids` that are currently referenced, as one
    /// entry.
    pub async fn detach_images(
        &self,
        id: EntityId,
        image_ids: &[EntityId],
        author: &str,
    ) -> Result<Mutation<E>> {
        self.change_image_refs(id, image_ids, ImageChangeKind::Removed, author)
            .await
    }

    async fn change_image_refs(
        &self,
        id: EntityId,
        image_ids: &[EntityId],
        kind: ImageChangeKind,
        author: &str,
    ) -> Result<Mutation<E>> {
        if !E::HAS_IMAGE_REFS {
            tracing::warn!("[EntityStore] {} has no image references", E::KIND);
            return Ok(Mutation::Unchanged);
        }

        let mut state = self.state.write().await;
        let index = state
            .position(id)
            .ok_or_else(|| GaleriaError::not_found(E::KIND.type_name(), id))?;
        let current = &state.items[index];
        let refs = current.image_refs();

        let effective = match kind {
            ImageChangeKind::Added => effective_image_changes(refs, image_ids, &[]).0,
            ImageChangeKind::Removed => effective_image_changes(refs, &[], image_ids).1,
        };
        if effective.is_empty() {
            return Ok(Mutation::Unchanged);
        }

        let (next_refs, change) = match kind {
            ImageChangeKind::Added => (
                merge_image_refs(refs, &effective, &[]),
                ChangeRecord::images_added(effective.clone()),
            ),
            ImageChangeKind::Removed => (
                merge_image_refs(refs, &[], &effective),
                ChangeRecord::images_removed(effective.clone()),
            ),
        };
        let title = images_title(kind, effective.len());

        let mut next = current.clone();
        next.set_image_refs(next_refs);
        let next = append_history(&next, vec![change], title, author);

        state.items[index] = next.clone();
        tracing::info!("[EntityStore] {} on {} {}", title, E::KIND, id);

        let failure = self.persist(&mut state).await;
        drop(state);
        self.finish(id, ChangeKind::Updated, failure);
        Ok(Mutation::Applied(next))
    }

    /// Listens for pushed snapshots of this collection.
    pub fn spawn_sync(self: &Arc<Self>) -> JoinHandle<()> {
        spawn_snapshot_listener(self)
    }

    /// Writes the whole collection. Returns the failure message, if any.
    async fn persist(&self, state: &mut CollectionState<E>) -> Option<String> {
        let key = E::KIND.collection_key();
        let document = match CollectionDocument::encode(&state.items, state.last_id) {
            Ok(document) => document,
            Err(e) => {
                tracing::error!("[EntityStore] Failed to encode '{}': {}", key, e);
                return Some(e.to_string());
            }
        };

        match self.documents.replace(key, &document).await {
            Ok(()) => {
                state.pending_echoes.push_back(document);
                if state.pending_echoes.len() > MAX_PENDING_ECHOES {
                    state.pending_echoes.pop_front();
                }
                None
            }
            Err(e) => {
                tracing::error!("[EntityStore] Failed to persist '{}': {}", key, e);
                Some(e.to_string())
            }
        }
    }

    fn finish(&self, id: EntityId, change: ChangeKind, persist_failure: Option<String>) {
        self.observers.notify(StoreEvent::Changed {
            collection: E::KIND.collection_key(),
            id,
            change,
        });
        if let Some(message) = persist_failure {
            self.notify_persist_failed(message);
        }
    }

    fn notify_persist_failed(&self, message: String) {
        self.observers.notify(StoreEvent::PersistFailed {
            collection: E::KIND.collection_key(),
            message,
        });
    }
}

#[async_trait]
impl<E: Entity> SnapshotTarget for EntityStore<E> {
    fn collection_key(&self) -> &'static str {
        E::KIND.collection_key()
    }

    fn document_store(&self) -> Arc<dyn DocumentStore> {
        self.documents.clone()
    }

    async fn apply_snapshot(&self, document: CollectionDocument) -> Result<()> {
        EntityStore::apply_snapshot(self, document).await
    }
}

impl<E: Entity> EntityStore<E> {
    /// Replaces the collection with a pushed snapshot. Echoes of this store's
    /// own writes are skipped; the id counter never moves backwards.
    pub async fn apply_snapshot(&self, document: CollectionDocument) -> Result<()> {
        let key = E::KIND.collection_key();
        let items: Vec<E> = document.decode().inspect_err(|e| {
            tracing::error!("[EntityStore] Ignoring undecodable '{}' snapshot: {}", key, e);
        })?;

        let mut state = self.state.write().await;
        if let Some(pos) = state.pending_echoes.iter().position(|own| own == &document) {
            state.pending_echoes.drain(..=pos);
            tracing::debug!("[EntityStore] Skipped echo of own '{}' write", key);
            return Ok(());
        }

        state.last_id = state.last_id.max(document.last_id);
        state.items = items;
        let count = state.items.len();
        drop(state);

        tracing::debug!("[EntityStore] Applied '{}' snapshot ({} items)", key, count);
        self.observers.notify(StoreEvent::SnapshotApplied {
            collection: key,
            items: count,
        });
        Ok(())
    }

    /// Re-reads the collection from the document store.
    pub async fn reload(&self) -> Result<()> {
        SnapshotTarget::reload(self).await
    }
}

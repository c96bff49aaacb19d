//! Image library: image records plus their hosted files.
//!
//! A supplied file is uploaded before anything else happens. If the upload
//! fails the operation stops with a remote-asset error and no state changes.

use std::sync::Arc;

use galeria_core::image::{Image, ImagePatch, NewImage};
use galeria_core::repository::{MediaStore, MediaUpload, StoredAsset, media_path};
use galeria_core::{Entity, EntityId, Result};

use crate::entity_store::{EntityStore, Mutation};

/// Uploads tried by `add` when its peeked id gets claimed concurrently.
const MAX_ADD_ATTEMPTS: u32 = 3;

pub struct ImageLibrary {
    store: Arc<EntityStore<Image>>,
    media: Arc<dyn MediaStore>,
}

impl ImageLibrary {
    pub fn new(store: Arc<EntityStore<Image>>) -> Self {
        let media = store.media_store();
        Self { store, media }
    }

    pub fn store(&self) -> &Arc<EntityStore<Image>> {
        &self.store
    }

    /// Adds an image. With a file, it is uploaded to `app/<newId>` first and
    /// the stored URL replaces `form.url`. If another writer takes the id
    /// meanwhile, an upload no record owns is removed and a fresh id is tried.
    pub async fn add(
        &self,
        mut form: NewImage,
        file: Option<&MediaUpload>,
        author: &str,
    ) -> Result<Image> {
        if form.author.trim().is_empty() {
            form.author = author.to_string();
        }

        let Some(file) = file else {
            return self.store.create(form, author).await;
        };

        let mut attempt = 1;
        loop {
            let id = self.store.next_id().await;
            let path = media_path(id, None);
            let asset = self.upload(file, &path).await?;
            let mut draft = form.clone();
            draft.url = asset.url;

            match self.store.create_at(id, draft, author).await {
                Ok(image) => return Ok(image),
                Err(e) => {
                    tracing::warn!(
                        "[ImageLibrary] Image id {} was claimed during upload: {}",
                        id,
                        e
                    );
                    if self.store.find(id).await.is_none() {
                        self.discard_upload(&path).await;
                    }
                    if attempt >= MAX_ADD_ATTEMPTS {
                        return Err(e);
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Edits an image. With a file, it is uploaded to
    /// `app/<id>/<nextHistorySeq>` first; its URL becomes the new `url` and is
    /// recorded on the history entry.
    pub async fn edit(
        &self,
        id: EntityId,
        mut patch: ImagePatch,
        file: Option<&MediaUpload>,
        author: &str,
    ) -> Result<Mutation<Image>> {
        let Some(file) = file else {
            return self.store.update(id, patch, &[], &[], author).await;
        };

        let current = self.store.get(id).await?;
        let seq = current.history.len() as u32 + 1;
        let asset = self.upload(file, &media_path(id, Some(seq))).await?;
        patch.url = Some(asset.url.clone());
        self.store
            .update_recorded(id, patch, &[], &[], author, Some(asset.url))
            .await
    }

    pub async fn delete(&self, id: EntityId, author: &str) -> Result<Mutation<Image>> {
        self.store.soft_delete(id, author).await
    }

    pub async fn restore(&self, id: EntityId, author: &str) -> Result<Mutation<Image>> {
        self.store.restore(id, author).await
    }

    /// Removes the record and everything under `app/<id>`.
    pub async fn destroy(&self, id: EntityId) -> Result<()> {
        self.store.hard_destroy(id).await
    }

    /// Images shown in the library: active ones matching `query`.
    pub async fn browse(&self, query: &str) -> Vec<Image> {
        self.store
            .search(query)
            .await
            .into_iter()
            .filter(|image| !image.is_removed())
            .collect()
    }

    async fn discard_upload(&self, path: &str) {
        if let Err(e) = self.media.delete_by_prefix(path).await {
            tracing::warn!("[ImageLibrary] Failed to discard upload {}: {}", path, e);
        }
    }

    async fn upload(&self, file: &MediaUpload, path: &str) -> Result<StoredAsset> {
        self.media.upload(file, path).await.inspect_err(|e| {
            tracing::warn!("[ImageLibrary] Upload to {} failed: {}", path, e);
        })
    }
}

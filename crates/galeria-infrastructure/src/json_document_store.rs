//! File-backed document store.
//!
//! Each collection key maps to `<root>/<key>.json`. Every accepted `replace`
//! is pushed to subscribers as a full snapshot.

use std::path::PathBuf;

use async_trait::async_trait;
use galeria_core::repository::{CollectionDocument, DocumentSnapshot, DocumentStore};
use galeria_core::{GaleriaError, Result};
use tokio::sync::broadcast;

use crate::storage::AtomicFile;

/// Snapshots buffered per subscriber before it starts lagging.
pub const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

pub struct JsonFileDocumentStore {
    root: PathBuf,
    sender: broadcast::Sender<DocumentSnapshot>,
}

impl JsonFileDocumentStore {
    pub fn new(root: PathBuf) -> Self {
        let (sender, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self { root, sender }
    }

    fn file_for(&self, key: &str) -> Result<AtomicFile<CollectionDocument>> {
        validate_key(key)?;
        Ok(AtomicFile::json(self.root.join(format!("{}.json", key))))
    }
}

/// Keys become file names, so they must be a single plain path segment.
fn validate_key(key: &str) -> Result<()> {
    let invalid = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\'])
        || key.starts_with('.');
    if invalid {
        return Err(GaleriaError::persistence(format!(
            "invalid collection key: {:?}",
            key
        )));
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for JsonFileDocumentStore {
    async fn load(&self, key: &str) -> Result<Option<CollectionDocument>> {
        let file = self.file_for(key)?;
        let document = tokio::task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| GaleriaError::internal(format!("load task failed: {}", e)))??;
        tracing::debug!(
            "[JsonFileDocumentStore] Loaded '{}' ({} items)",
            key,
            document.as_ref().map_or(0, |d| d.items.len())
        );
        Ok(document)
    }

    async fn replace(&self, key: &str, document: &CollectionDocument) -> Result<()> {
        let file = self.file_for(key)?;
        let to_write = document.clone();
        tokio::task::spawn_blocking(move || file.save_exclusive(&to_write))
            .await
            .map_err(|e| GaleriaError::internal(format!("write task failed: {}", e)))?
            .map_err(|e| GaleriaError::persistence(format!("failed to write '{}': {}", key, e)))?;

        tracing::debug!(
            "[JsonFileDocumentStore] Replaced '{}' ({} items, lastId {})",
            key,
            document.items.len(),
            document.last_id
        );

        // No subscribers is not an error.
        let _ = self.sender.send(DocumentSnapshot {
            key: key.to_string(),
            document: document.clone(),
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<DocumentSnapshot> {
        self.sender.subscribe()
    }
}

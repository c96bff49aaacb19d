//! Snapshot synchronisation loop shared by every collection service.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use galeria_core::Result;
use galeria_core::repository::{CollectionDocument, DocumentStore};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// A service whose in-memory collection mirrors one document-store key.
#[async_trait]
pub trait SnapshotTarget: Send + Sync + 'static {
    fn collection_key(&self) -> &'static str;

    fn document_store(&self) -> Arc<dyn DocumentStore>;

    /// Replaces the in-memory collection with `document`.
    async fn apply_snapshot(&self, document: CollectionDocument) -> Result<()>;

    /// Re-reads the collection from the document store and applies it.
    async fn reload(&self) -> Result<()> {
        let key = self.collection_key();
        match self.document_store().load(key).await? {
            Some(document) => self.apply_snapshot(document).await,
            None => Ok(()),
        }
    }
}

/// Listens for pushed snapshots of `target`'s key until the document store
/// goes away or `target` is dropped.
///
/// A lagging listener skips the missed snapshots and reloads the collection
/// instead.
pub fn spawn_snapshot_listener<T: SnapshotTarget>(target: &Arc<T>) -> JoinHandle<()> {
    let key = target.collection_key();
    let mut rx = target.document_store().subscribe();
    let weak: Weak<T> = Arc::downgrade(target);

    tokio::spawn(async move {
        tracing::debug!("[SnapshotSync] Listening for '{}'", key);
        loop {
            let received = rx.recv().await;
            let Some(target) = weak.upgrade() else {
                break;
            };
            match received {
                Ok(snapshot) if snapshot.key == key => {
                    if let Err(e) = target.apply_snapshot(snapshot.document).await {
                        tracing::error!("[SnapshotSync] Failed to apply '{}' snapshot: {}", key, e);
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        "[SnapshotSync] Missed {} snapshots, reloading '{}'",
                        skipped,
                        key
                    );
                    if let Err(e) = target.reload().await {
                        tracing::error!("[SnapshotSync] Failed to reload '{}': {}", key, e);
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
        tracing::debug!("[SnapshotSync] Stopped listening for '{}'", key);
    })
}

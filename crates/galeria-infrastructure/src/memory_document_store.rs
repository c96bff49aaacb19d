//! In-memory document store with write-failure injection.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use galeria_core::repository::{CollectionDocument, DocumentSnapshot, DocumentStore};
use galeria_core::{GaleriaError, Result};
use tokio::sync::broadcast;

use crate::json_document_store::SNAPSHOT_CHANNEL_CAPACITY;

pub struct InMemoryDocumentStore {
    documents: Mutex<HashMap<String, CollectionDocument>>,
    sender: broadcast::Sender<DocumentSnapshot>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self {
            documents: Mutex::new(HashMap::new()),
            sender,
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    /// Seeds `key` without notifying anyone.
    pub fn with_document(self, key: &str, document: CollectionDocument) -> Self {
        self.lock().insert(key.to_string(), document);
        self
    }

    /// While set, every `replace` is rejected with a persistence error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of accepted `replace` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn document(&self, key: &str) -> Option<CollectionDocument> {
        self.lock().get(key).cloned()
    }

    /// Simulates a write by another client: stores and broadcasts `document`
    /// without counting it as one of ours.
    pub fn push_external(&self, key: &str, document: CollectionDocument) {
        self.lock().insert(key.to_string(), document.clone());
        let _ = self.sender.send(DocumentSnapshot {
            key: key.to_string(),
            document,
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CollectionDocument>> {
        self.documents.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn load(&self, key: &str) -> Result<Option<CollectionDocument>> {
        Ok(self.document(key))
    }

    async fn replace(&self, key: &str, document: &CollectionDocument) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GaleriaError::persistence(format!(
                "write to '{}' rejected",
                key
            )));
        }
        self.lock().insert(key.to_string(), document.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failure_injection() {
        let store = InMemoryDocumentStore::new();
        store.set_fail_writes(true);

        let err = store
            .replace("images", &CollectionDocument::default())
            .await
            .unwrap_err();
        assert!(err.is_persistence());
        assert_eq!(store.write_count(), 0);
        assert!(store.document("images").is_none());

        store.set_fail_writes(false);
        store
            .replace("images", &CollectionDocument::default())
            .await
            .unwrap();
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_external_push_reaches_subscribers() {
        let store = InMemoryDocumentStore::new();
        let mut rx = store.subscribe();

        store.push_external(
            "tareas",
            CollectionDocument {
                items: vec![],
                last_id: 5,
            },
        );

        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.key, "tareas");
        assert_eq!(snapshot.document.last_id, 5);
        assert_eq!(store.write_count(), 0);
    }
}

//! Explicit observer interface for store changes.
//!
//! Presentation layers register observers instead of reading a shared global
//! container; every store notifies them after its state has changed.

use std::sync::{Arc, RwLock};

use galeria_core::EntityId;

/// What happened to a single entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
    SoftDeleted,
    Restored,
    Destroyed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A local mutation was applied to the in-memory collection.
    Changed {
        collection: &'static str,
        id: EntityId,
        change: ChangeKind,
    },
    /// The in-memory collection was replaced by a pushed snapshot.
    SnapshotApplied {
        collection: &'static str,
        items: usize,
    },
    /// The document store rejected a write. Local state was kept.
    PersistFailed {
        collection: &'static str,
        message: String,
    },
    /// The media host failed to delete an entity's assets.
    RemoteAssetFailed {
        collection: &'static str,
        id: EntityId,
        message: String,
    },
}

impl StoreEvent {
    pub fn collection(&self) -> &'static str {
        match self {
            StoreEvent::Changed { collection, .. }
            | StoreEvent::SnapshotApplied { collection, .. }
            | StoreEvent::PersistFailed { collection, .. }
            | StoreEvent::RemoteAssetFailed { collection, .. } => *collection,
        }
    }

    /// Failures a user should be told about.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StoreEvent::PersistFailed { .. } | StoreEvent::RemoteAssetFailed { .. }
        )
    }
}

pub trait StoreObserver: Send + Sync {
    fn on_event(&self, event: &StoreEvent);
}

impl<F> StoreObserver for F
where
    F: Fn(&StoreEvent) + Send + Sync,
{
    fn on_event(&self, event: &StoreEvent) {
        self(event)
    }
}

/// Registered observers of one store.
#[derive(Default)]
pub(crate) struct Observers {
    list: RwLock<Vec<Arc<dyn StoreObserver>>>,
}

impl Observers {
    pub(crate) fn add(&self, observer: Arc<dyn StoreObserver>) {
        self.list
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(observer);
    }

    pub(crate) fn notify(&self, event: StoreEvent) {
        let observers = self
            .list
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for observer in observers {
            observer.on_event(&event);
        }
    }
}

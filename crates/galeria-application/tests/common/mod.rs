#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use galeria_application::{GaleriaServices, StoreEvent};
use galeria_core::calendar::CalendarIndex;
use galeria_core::repository::{MediaStore, MediaUpload, StoredAsset};
use galeria_core::user::{Actor, Role, StaticAuthProvider};
use galeria_core::{GaleriaError, Result};
use galeria_infrastructure::InMemoryDocumentStore;

pub const AUTHOR: &str = "ana@example.com";

/// Media store that remembers every call and can be told to fail.
#[derive(Default)]
pub struct RecordingMediaStore {
    pub uploads: Mutex<Vec<String>>,
    pub deletions: Mutex<Vec<String>>,
    pub fail_uploads: Mutex<bool>,
    pub fail_deletes: Mutex<bool>,
    /// Runs once, during the next upload.
    pub during_upload: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl RecordingMediaStore {
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn deletions(&self) -> Vec<String> {
        self.deletions.lock().unwrap().clone()
    }

    pub fn fail_uploads(&self, fail: bool) {
        *self.fail_uploads.lock().unwrap() = fail;
    }

    pub fn fail_deletes(&self, fail: bool) {
        *self.fail_deletes.lock().unwrap() = fail;
    }

    pub fn during_next_upload(&self, hook: impl FnOnce() + Send + 'static) {
        *self.during_upload.lock().unwrap() = Some(Box::new(hook));
    }
}

#[async_trait]
impl MediaStore for RecordingMediaStore {
    async fn upload(&self, _file: &MediaUpload, path: &str) -> Result<StoredAsset> {
        if *self.fail_uploads.lock().unwrap() {
            return Err(GaleriaError::remote_asset("upload rejected"));
        }
        self.uploads.lock().unwrap().push(path.to_string());
        let hook = self.during_upload.lock().unwrap().take();
        if let Some(hook) = hook {
            hook();
            // Lets snapshot listeners catch up before the upload returns.
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        Ok(StoredAsset {
            url: format!("https://media.example.com/{}/image.png", path),
            public_id: format!("{}/image", path),
        })
    }

    async fn delete_by_prefix(&self, path: &str) -> Result<()> {
        self.deletions.lock().unwrap().push(path.to_string());
        if *self.fail_deletes.lock().unwrap() {
            return Err(GaleriaError::remote_asset("delete rejected"));
        }
        Ok(())
    }
}

pub struct Harness {
    pub documents: Arc<InMemoryDocumentStore>,
    pub media: Arc<RecordingMediaStore>,
    pub services: GaleriaServices,
    pub events: Arc<Mutex<Vec<StoreEvent>>>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_documents(Arc::new(InMemoryDocumentStore::new())).await
    }

    pub async fn with_documents(documents: Arc<InMemoryDocumentStore>) -> Self {
        let media = Arc::new(RecordingMediaStore::default());
        let auth = Arc::new(StaticAuthProvider::new(Actor {
            email: AUTHOR.to_string(),
            display_name: "Ana".to_string(),
            role: Role::Admin,
        }));
        let services = GaleriaServices::open(
            documents.clone(),
            media.clone(),
            auth,
            CalendarIndex::utc(),
        )
        .await
        .expect("Should open services");

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        services.subscribe(Arc::new(move |event: &StoreEvent| {
            sink.lock().unwrap().push(event.clone());
        }));

        Self {
            documents,
            media,
            services,
            events,
        }
    }

    pub fn events(&self) -> Vec<StoreEvent> {
        self.events.lock().unwrap().clone()
    }
}

pub fn png(name: &str) -> MediaUpload {
    MediaUpload::new(name, vec![0x89, 0x50, 0x4e, 0x47])
}

//! Collaborator traits for the external document store and media host.
//!
//! Entity stores depend only on these traits; concrete implementations live
//! in the infrastructure crate.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::entity::EntityId;
use crate::error::Result;

/// The single blob persisted per collection: every item plus the running id
/// counter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionDocument {
    /// Older blobs keyed the array by collection name.
    #[serde(
        default,
        alias = "tareas",
        alias = "volantes",
        alias = "campañas",
        alias = "segmentaciones"
    )]
    pub items: Vec<Value>,
    #[serde(rename = "lastId", default)]
    pub last_id: EntityId,
}

impl CollectionDocument {
    pub fn encode<T: Serialize>(items: &[T], last_id: EntityId) -> Result<Self> {
        let items = items
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { items, last_id })
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.items
            .iter()
            .map(|item| serde_json::from_value(item.clone()).map_err(Into::into))
            .collect()
    }
}

/// A full-collection snapshot pushed by the document store after a write.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub key: String,
    pub document: CollectionDocument,
}

/// The external document database, seen as one replaceable blob per key.
///
/// There is no partial write and no revision check: the last `replace` wins.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads the blob stored under `key`; `Ok(None)` when it does not exist.
    async fn load(&self, key: &str) -> Result<Option<CollectionDocument>>;

    /// Replaces the whole blob stored under `key`.
    async fn replace(&self, key: &str, document: &CollectionDocument) -> Result<()>;

    /// Snapshot stream for every key. Receivers filter by `key`.
    fn subscribe(&self) -> broadcast::Receiver<DocumentSnapshot>;
}

/// A file handed over for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl MediaUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            file_name,
            bytes,
            content_type,
        }
    }

    /// Lower-cased extension of the file name, `bin` when it has none.
    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
            .unwrap_or_else(|| "bin".to_string())
    }
}

/// Where an uploaded file ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAsset {
    pub url: String,
    #[serde(rename = "publicId")]
    pub public_id: String,
}

/// The external media host.
#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, file: &MediaUpload, path: &str) -> Result<StoredAsset>;

    /// Removes every asset stored under `path`.
    async fn delete_by_prefix(&self, path: &str) -> Result<()>;
}

/// `app/<id>` for the current file of an entity, `app/<id>/<seq>` for the
/// file that accompanied history entry `seq`.
pub fn media_path(id: EntityId, history_seq: Option<u32>) -> String {
    match history_seq {
        Some(seq) => format!("app/{}/{}", id, seq),
        None => format!("app/{}", id),
    }
}

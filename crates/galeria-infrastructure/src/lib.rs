//! Collaborator implementations for the Galeria back office: document
//! stores, media stores, configuration and path resolution.

pub mod auth;
pub mod backends;
pub mod config_service;
pub mod http_media_store;
pub mod json_document_store;
pub mod local_media_store;
pub mod memory_document_store;
pub mod paths;
pub mod storage;

pub use crate::auth::ConfigAuthProvider;
pub use crate::config_service::ConfigService;
pub use crate::http_media_store::HttpMediaStore;
pub use crate::json_document_store::JsonFileDocumentStore;
pub use crate::local_media_store::LocalMediaStore;
pub use crate::memory_document_store::InMemoryDocumentStore;
pub use crate::paths::GaleriaPaths;

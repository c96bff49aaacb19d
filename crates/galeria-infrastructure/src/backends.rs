//! Builds the collaborator implementations selected by `AppConfig`.

use std::sync::Arc;

use galeria_core::config::{AppConfig, MediaBackend};
use galeria_core::repository::{DocumentStore, MediaStore};
use galeria_core::{GaleriaError, Result};

use crate::http_media_store::HttpMediaStore;
use crate::json_document_store::JsonFileDocumentStore;
use crate::local_media_store::LocalMediaStore;
use crate::paths::GaleriaPaths;

/// File-backed document store under the configured data directory.
pub fn document_store(config: &AppConfig) -> Result<Arc<dyn DocumentStore>> {
    let data_dir = GaleriaPaths::data_dir_for(config)?;
    let root = GaleriaPaths::collections_dir(&data_dir);
    tracing::debug!("[Backends] Document store at {}", root.display());
    Ok(Arc::new(JsonFileDocumentStore::new(root)))
}

/// Media store for `[media] backend`.
pub fn media_store(config: &AppConfig) -> Result<Arc<dyn MediaStore>> {
    match config.media.backend {
        MediaBackend::Local => {
            let data_dir = GaleriaPaths::data_dir_for(config)?;
            let root = GaleriaPaths::media_dir(config, &data_dir);
            tracing::debug!("[Backends] Local media store at {}", root.display());
            Ok(Arc::new(LocalMediaStore::new(root)))
        }
        MediaBackend::Http => {
            let base_url = config
                .media
                .base_url
                .as_deref()
                .filter(|url| !url.trim().is_empty())
                .ok_or_else(|| {
                    GaleriaError::config("[media] base_url is required for the http backend")
                })?;
            tracing::debug!("[Backends] HTTP media store at {}", base_url);
            Ok(Arc::new(HttpMediaStore::new(base_url)))
        }
    }
}

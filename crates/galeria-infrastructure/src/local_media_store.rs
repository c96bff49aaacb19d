//! Media store that keeps uploads in a local directory tree.
//!
//! `app/<id>` maps to `<root>/app/<id>/image.<ext>`, mirroring the folder and
//! fixed public id the hosting backend uses.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use galeria_core::repository::{MediaStore, MediaUpload, StoredAsset};
use galeria_core::{GaleriaError, Result};

/// File stem every upload is stored under.
const ASSET_STEM: &str = "image";

pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let plain = !path.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !plain {
            return Err(GaleriaError::remote_asset(format!(
                "invalid media path: {:?}",
                path
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn upload(&self, file: &MediaUpload, path: &str) -> Result<StoredAsset> {
        let dir = self.resolve(path)?;
        let target = dir.join(format!("{}.{}", ASSET_STEM, file.extension()));

        let write = async {
            tokio::fs::create_dir_all(&dir).await?;
            tokio::fs::write(&target, &file.bytes).await
        };
        write.await.map_err(|e| {
            GaleriaError::remote_asset(format!("failed to store {}: {}", target.display(), e))
        })?;

        tracing::debug!(
            "[LocalMediaStore] Stored {} ({} bytes) at {}",
            file.file_name,
            file.bytes.len(),
            target.display()
        );

        Ok(StoredAsset {
            url: format!("file://{}", target.display()),
            public_id: format!("{}/{}", path, ASSET_STEM),
        })
    }

    async fn delete_by_prefix(&self, path: &str) -> Result<()> {
        let dir = self.resolve(path)?;
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                tracing::debug!("[LocalMediaStore] Removed {}", dir.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(GaleriaError::remote_asset(format!(
                "failed to remove {}: {}",
                dir.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_upload_under_entity_folder() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalMediaStore::new(temp_dir.path().to_path_buf());

        let asset = store
            .upload(&MediaUpload::new("banner.png", vec![1, 2, 3]), "app/4")
            .await
            .unwrap();

        let stored = temp_dir.path().join("app/4/image.png");
        assert_eq!(std::fs::read(&stored).unwrap(), vec![1, 2, 3]);
        assert_eq!(asset.public_id, "app/4/image");
        assert!(asset.url.starts_with("file://"));
        assert!(asset.url.ends_with("app/4/image.png"));
    }

    #[tokio::test]
    async fn test_delete_by_prefix_removes_history_versions() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalMediaStore::new(temp_dir.path().to_path_buf());
        let file = MediaUpload::new("banner.jpg", vec![9]);
        store.upload(&file, "app/4").await.unwrap();
        store.upload(&file, "app/4/2").await.unwrap();
        store.upload(&file, "app/5").await.unwrap();

        store.delete_by_prefix("app/4").await.unwrap();

        assert!(!temp_dir.path().join("app/4").exists());
        assert!(temp_dir.path().join("app/5/image.jpg").exists());
        // Deleting again is fine.
        store.delete_by_prefix("app/4").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalMediaStore::new(temp_dir.path().to_path_buf());

        let err = store.delete_by_prefix("../app").await.unwrap_err();
        assert!(err.is_remote_asset());
        assert!(store.delete_by_prefix("/etc").await.unwrap_err().is_remote_asset());
    }
}

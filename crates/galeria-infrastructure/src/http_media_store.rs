//! Media store backed by the hosting backend's HTTP endpoints.
//!
//! - `POST /api/images` uploads the current file of `app/<id>`
//! - `POST /api/historial-images` uploads the file of `app/<id>/<historyId>`
//! - `POST /api/deleteImages` removes everything under `app/<id>`

use anyhow::{Context, anyhow, bail};
use async_trait::async_trait;
use galeria_core::repository::{MediaStore, MediaUpload, StoredAsset};
use galeria_core::{EntityId, GaleriaError, Result};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

pub struct HttpMediaStore {
    client: reqwest::Client,
    base_url: String,
}

/// Upload response of the hosting backend.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

/// Entity id and optional history sequence encoded in a media path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MediaTarget {
    id: EntityId,
    history_seq: Option<u32>,
}

fn parse_media_path(path: &str) -> anyhow::Result<MediaTarget> {
    let mut parts = path.split('/');
    if parts.next() != Some("app") {
        bail!("media path must start with 'app/': {}", path);
    }
    let id = parts
        .next()
        .ok_or_else(|| anyhow!("media path has no entity id: {}", path))?
        .parse::<EntityId>()
        .with_context(|| format!("invalid entity id in {}", path))?;
    let history_seq = parts
        .next()
        .map(|seq| seq.parse::<u32>())
        .transpose()
        .with_context(|| format!("invalid history sequence in {}", path))?;
    if parts.next().is_some() {
        bail!("media path is too deep: {}", path);
    }
    Ok(MediaTarget { id, history_seq })
}

impl HttpMediaStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/api/{}", self.base_url, name)
    }

    async fn try_upload(&self, file: &MediaUpload, path: &str) -> anyhow::Result<StoredAsset> {
        let target = parse_media_path(path)?;
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;
        let mut form = Form::new().part("file", part).text("id", target.id.to_string());

        let url = match target.history_seq {
            Some(seq) => {
                form = form.text("historyId", seq.to_string());
                self.endpoint("historial-images")
            }
            None => self.endpoint("images"),
        };

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("upload request to {} failed", url))?;
        let status = response.status();
        if !status.is_success() {
            bail!("upload to {} returned {}", url, status);
        }
        let body: UploadResponse = response
            .json()
            .await
            .context("upload response was not understood")?;

        Ok(StoredAsset {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }

    async fn try_delete(&self, path: &str) -> anyhow::Result<()> {
        let target = parse_media_path(path)?;
        if target.history_seq.is_some() {
            bail!("only whole entity folders can be deleted: {}", path);
        }
        let url = self.endpoint("deleteImages");
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "id": target.id }))
            .send()
            .await
            .with_context(|| format!("delete request to {} failed", url))?;
        let status = response.status();
        if !status.is_success() {
            bail!("delete at {} returned {}", url, status);
        }
        Ok(())
    }
}

#[async_trait]
impl MediaStore for HttpMediaStore {
    async fn upload(&self, file: &MediaUpload, path: &str) -> Result<StoredAsset> {
        let asset = self
            .try_upload(file, path)
            .await
            .map_err(|e| GaleriaError::remote_asset(format!("{:#}", e)))?;
        tracing::debug!("[HttpMediaStore] Uploaded {} as {}", path, asset.public_id);
        Ok(asset)
    }

    async fn delete_by_prefix(&self, path: &str) -> Result<()> {
        self.try_delete(path)
            .await
            .map_err(|e| GaleriaError::remote_asset(format!("{:#}", e)))?;
        tracing::debug!("[HttpMediaStore] Deleted {}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_media_path() {
        assert_eq!(
            parse_media_path("app/12").unwrap(),
            MediaTarget {
                id: 12,
                history_seq: None
            }
        );
        assert_eq!(
            parse_media_path("app/12/3").unwrap(),
            MediaTarget {
                id: 12,
                history_seq: Some(3)
            }
        );
        assert!(parse_media_path("media/12").is_err());
        assert!(parse_media_path("app/x").is_err());
        assert!(parse_media_path("app/1/2/3").is_err());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let store = HttpMediaStore::new("https://media.example.com/");
        assert_eq!(
            store.endpoint("deleteImages"),
            "https://media.example.com/api/deleteImages"
        );
    }

    #[tokio::test]
    async fn test_bad_path_is_remote_asset_error() {
        let store = HttpMediaStore::new("http://127.0.0.1:9");
        let err = store.delete_by_prefix("app/1/2").await.unwrap_err();
        assert!(err.is_remote_asset());
    }
}

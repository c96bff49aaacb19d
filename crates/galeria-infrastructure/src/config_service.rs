//! Configuration service implementation.
//!
//! Loads `AppConfig` from `~/.config/galeria/config.toml`, writing a default
//! file on first use.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use galeria_core::Result;
use galeria_core::config::AppConfig;

use crate::paths::GaleriaPaths;
use crate::storage::AtomicFile;

/// Loads and caches the application configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    /// Explicit config file; `None` resolves the platform default.
    path: Option<PathBuf>,
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    /// Uses the platform config file. Nothing is read until first access.
    pub fn new() -> Self {
        Self {
            path: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Uses `path` instead of the platform config file.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading it from file if not cached.
    pub fn get_config(&self) -> Result<AppConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        {
            let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Resolved location of the config file.
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Ok(GaleriaPaths::config_file()?),
        }
    }

    fn load_config(&self) -> Result<AppConfig> {
        let path = self.config_path()?;
        let file = AtomicFile::<AppConfig>::toml(path.clone());

        match file.load()? {
            Some(config) => {
                tracing::debug!("[ConfigService] Loaded config from {}", path.display());
                Ok(config)
            }
            None => {
                let default_config = AppConfig::default();
                file.save(&default_config)?;
                tracing::info!("[ConfigService] Wrote default config to {}", path.display());
                Ok(default_config)
            }
        }
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galeria_core::config::MediaBackend;
    use tempfile::TempDir;

    #[test]
    fn test_creates_default_file_when_missing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("galeria/config.toml");
        let service = ConfigService::with_path(path.clone());

        let config = service.get_config().unwrap();

        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_reads_existing_file_and_caches_it() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[media]\nbackend = \"http\"\nbase_url = \"https://media.example.com\"\n",
        )
        .unwrap();
        let service = ConfigService::with_path(path.clone());

        assert_eq!(service.get_config().unwrap().media.backend, MediaBackend::Http);

        std::fs::write(&path, "[calendar]\nutc_offset_minutes = -300\n").unwrap();
        let cached = service.get_config().unwrap();
        assert_eq!(cached.media.backend, MediaBackend::Http);
        assert_eq!(cached.calendar.utc_offset_minutes, 0);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[calendar]\nutc_offset_minutes = \"soon\"\n").unwrap();
        let service = ConfigService::with_path(path);

        let err = service.get_config().unwrap_err();
        assert!(err.is_serialization());
    }
}

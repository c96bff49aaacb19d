//! Path management for Galeria configuration and data files.
//!
//! ```text
//! ~/.config/galeria/           # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/galeria/      # Data directory
//! ├── collections/             # One <key>.json blob per collection
//! └── media/                   # Local media store
//! ```

use std::path::{Path, PathBuf};

use galeria_core::GaleriaError;
use galeria_core::config::AppConfig;

const APP_DIR: &str = "galeria";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform has no config directory for this user.
    ConfigDirNotFound,
    /// The platform has no data directory for this user.
    DataDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
            PathError::DataDirNotFound => write!(f, "Cannot find data directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for GaleriaError {
    fn from(e: PathError) -> Self {
        GaleriaError::config(e.to_string())
    }
}

pub struct GaleriaPaths;

impl GaleriaPaths {
    /// Returns the Galeria configuration directory (e.g. `~/.config/galeria/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the Galeria data directory (e.g. `~/.local/share/galeria/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::DataDirNotFound)
    }

    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Data directory honouring the `[storage] data_dir` override.
    pub fn data_dir_for(config: &AppConfig) -> Result<PathBuf, PathError> {
        match &config.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::data_dir(),
        }
    }

    /// Directory of the per-collection JSON blobs.
    pub fn collections_dir(data_dir: &Path) -> PathBuf {
        data_dir.join("collections")
    }

    /// Root of the local media store honouring `[media] local_dir`.
    pub fn media_dir(config: &AppConfig, data_dir: &Path) -> PathBuf {
        config
            .media
            .local_dir
            .clone()
            .unwrap_or_else(|| data_dir.join("media"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file() {
        let config_file = GaleriaPaths::config_file().unwrap();
        assert!(config_file.ends_with("galeria/config.toml"));
    }

    #[test]
    fn test_data_dir_override() {
        let mut config = AppConfig::default();
        config.storage.data_dir = Some(PathBuf::from("/srv/galeria"));

        let data_dir = GaleriaPaths::data_dir_for(&config).unwrap();
        assert_eq!(data_dir, PathBuf::from("/srv/galeria"));
        assert_eq!(
            GaleriaPaths::collections_dir(&data_dir),
            PathBuf::from("/srv/galeria/collections")
        );
        assert_eq!(
            GaleriaPaths::media_dir(&config, &data_dir),
            PathBuf::from("/srv/galeria/media")
        );
    }

    #[test]
    fn test_media_dir_override() {
        let mut config = AppConfig::default();
        config.media.local_dir = Some(PathBuf::from("/mnt/assets"));
        assert_eq!(
            GaleriaPaths::media_dir(&config, Path::new("/srv/galeria")),
            PathBuf::from("/mnt/assets")
        );
    }
}

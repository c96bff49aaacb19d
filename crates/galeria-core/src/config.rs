//! Application configuration model.
//!
//! Loaded from `config.toml` by the infrastructure `ConfigService`. Every
//! section and field has a default so a partial file is valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::user::{Actor, Role};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageSettings,
    pub media: MediaSettings,
    pub calendar: CalendarSettings,
    pub user: UserSettings,
    pub logging: LoggingSettings,
}

/// Where collection blobs are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Overrides the platform data directory.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaBackend {
    /// Files copied under a local directory.
    #[default]
    Local,
    /// The hosting backend's upload/delete HTTP endpoints.
    Http,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    pub backend: MediaBackend,
    /// Root of the local media store. Defaults to `<data dir>/media`.
    pub local_dir: Option<PathBuf>,
    /// Base URL of the hosting backend, required for `backend = "http"`.
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Offset applied when matching task dates to calendar days.
    pub utc_offset_minutes: i32,
}

/// The acting user when no external auth collaborator is wired in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

impl UserSettings {
    pub fn actor(&self) -> Actor {
        Actor {
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

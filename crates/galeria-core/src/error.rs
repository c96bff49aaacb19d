//! Error types for the Galeria back office.

use thiserror::Error;

/// A shared error type for every Galeria crate.
///
/// Variants map onto the failure taxonomy of the entity stores: a missing
/// entity, a rejected document-store write, a failed media-host call, plus the
/// plumbing errors of the infrastructure layer.
#[derive(Error, Debug, Clone)]
pub enum GaleriaError {
    /// No record with this id in the loaded collection
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The document store rejected a write or a read
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The media host rejected an upload or a deletion
    #[error("Remote asset error: {0}")]
    RemoteAsset(String),

    /// Local file system failure
    #[error("IO error: {message}")]
    Io { message: String },

    /// A stored document or config file could not be encoded or decoded
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String,
        message: String,
    },

    /// Invalid or unresolvable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Broken invariant or failed background task
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GaleriaError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    pub fn remote_asset(message: impl Into<String>) -> Self {
        Self::RemoteAsset(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    pub fn is_remote_asset(&self) -> bool {
        matches!(self, Self::RemoteAsset(_))
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

impl From<std::io::Error> for GaleriaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for GaleriaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GaleriaError>;

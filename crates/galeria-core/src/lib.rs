//! Domain layer of the Galeria back office: entity models, change history,
//! diffing, calendar lookup and the collaborator traits the stores run on.

pub mod calendar;
pub mod config;
pub mod diff;
pub mod entity;
pub mod error;
pub mod flyer;
pub mod history;
pub mod image;
pub mod repository;
pub mod segment;
pub mod task;
pub mod timestamp;
pub mod user;

// Re-export common types
pub use entity::{Entity, EntityId, EntityKind, EntityPatch, STATUS_ACTIVE, STATUS_REMOVED};
pub use error::{GaleriaError, Result};

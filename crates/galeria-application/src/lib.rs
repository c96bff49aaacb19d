//! Application layer for Galeria.
//!
//! Services that own the in-memory collections, apply mutations through the
//! diff engine and history builder, and keep the collections in step with
//! the document store.

pub mod campaign_directory;
pub mod entity_store;
pub mod image_library;
pub mod observer;
pub mod services;
pub mod sync;
pub mod task_board;

pub use campaign_directory::CampaignDirectory;
pub use entity_store::{EntityStore, Mutation};
pub use image_library::ImageLibrary;
pub use observer::{ChangeKind, StoreEvent, StoreObserver};
pub use services::GaleriaServices;
pub use sync::SnapshotTarget;
pub use task_board::TaskBoard;

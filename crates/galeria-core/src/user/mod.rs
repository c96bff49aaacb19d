//! Acting-user module.
//!
//! - `model`: the acting user and the role tag
//! - `service`: the auth collaborator that supplies them

mod model;
mod service;

pub use model::{Actor, Role};
pub use service::{AuthProvider, StaticAuthProvider};

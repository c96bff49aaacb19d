//! Actor and role models.

use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_AUTHOR;

/// Role tag supplied by the auth collaborator.
///
/// The core never enforces it; presentation layers use the helpers to decide
/// which operations to expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    #[default]
    Viewer,
}

impl Role {
    pub fn can_edit(self) -> bool {
        matches!(self, Role::Admin | Role::Editor)
    }

    pub fn can_destroy(self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }
}

/// The user on whose behalf mutations are performed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Actor {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub role: Role,
}

impl Actor {
    /// Free-text author recorded in history entries: the email when known,
    /// else the display name, else the default author.
    pub fn author_label(&self) -> String {
        [&self.email, &self.display_name]
            .into_iter()
            .find(|value| !value.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string())
    }
}

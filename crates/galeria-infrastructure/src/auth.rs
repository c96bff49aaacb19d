//! Auth provider backed by the `[user]` section of the configuration.

use galeria_core::config::UserSettings;
use galeria_core::user::{Actor, AuthProvider};

#[derive(Debug, Clone)]
pub struct ConfigAuthProvider {
    settings: UserSettings,
}

impl ConfigAuthProvider {
    pub fn new(settings: UserSettings) -> Self {
        Self { settings }
    }
}

impl AuthProvider for ConfigAuthProvider {
    /// Nobody is signed in while the section carries neither email nor name.
    fn current_actor(&self) -> Option<Actor> {
        if self.settings.email.trim().is_empty() && self.settings.display_name.trim().is_empty() {
            None
        } else {
            Some(self.settings.actor())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galeria_core::user::Role;

    #[test]
    fn test_empty_section_is_anonymous() {
        let auth = ConfigAuthProvider::new(UserSettings::default());
        assert!(auth.current_actor().is_none());
        assert_eq!(auth.author(), "autor");
    }

    #[test]
    fn test_configured_user() {
        let auth = ConfigAuthProvider::new(UserSettings {
            email: String::new(),
            display_name: "Marta".to_string(),
            role: Role::Admin,
        });
        let actor = auth.current_actor().unwrap();
        assert!(actor.role.can_destroy());
        assert_eq!(auth.author(), "Marta");
    }
}

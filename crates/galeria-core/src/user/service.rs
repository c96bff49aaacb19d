//! Auth collaborator interface.

use super::model::Actor;

/// Supplies the acting user. Session management lives behind this trait.
pub trait AuthProvider: Send + Sync {
    /// `None` when nobody is signed in.
    fn current_actor(&self) -> Option<Actor>;

    /// Author label for history entries, falling back to the default author.
    fn author(&self) -> String {
        self.current_actor()
            .map(|actor| actor.author_label())
            .unwrap_or_else(|| crate::history::DEFAULT_AUTHOR.to_string())
    }
}

/// Fixed actor, for scripts and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthProvider {
    actor: Option<Actor>,
}

impl StaticAuthProvider {
    pub fn new(actor: Actor) -> Self {
        Self { actor: Some(actor) }
    }
}

impl AuthProvider for StaticAuthProvider {
    fn current_actor(&self) -> Option<Actor> {
        self.actor.clone()
    }
}

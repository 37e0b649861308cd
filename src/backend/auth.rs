use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::models::Identity;

/// Session table of the auth collaborator: bearer tokens to identities.
///
/// Sessions are issued elsewhere (seeded from configuration); this side only
/// resolves and revokes them.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Identity>>,
}

impl SessionStore {
    pub fn from_sessions<I>(sessions: I) -> Self
    where
        I: IntoIterator<Item = (String, Identity)>,
    {
        Self {
            sessions: RwLock::new(sessions.into_iter().collect()),
        }
    }

    pub fn insert(&self, token: impl Into<String>, identity: Identity) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.into(), identity);
    }

    pub fn get_current_user(&self, token: &str) -> Option<Identity> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
    }

    /// Returns whether the token was an active session.
    pub fn sign_out(&self, token: &str) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
            .is_some()
    }
}

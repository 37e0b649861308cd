use tracing::debug;

use crate::backend::Backend;
use crate::models::Identity;

/// Public entry point; unauthenticated visitors are sent here.
pub const LANDING: &str = "/";
/// Where signed-in visitors of the landing page are sent.
pub const BOOKMARKS: &str = "/bookmarks";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub identity: Identity,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.identity.id
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Gate {
    Allowed(Session),
    Redirect(&'static str),
}

/// Resolves the caller's identity before any bookmark data is touched. A
/// missing or unknown session is a redirect, not an error.
pub async fn guard(backend: &Backend, token: Option<&str>) -> Gate {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        debug!("no session presented, redirecting to landing");
        return Gate::Redirect(LANDING);
    };
    match backend.current_user(token).await {
        Some(identity) => Gate::Allowed(Session {
            token: token.to_string(),
            identity,
        }),
        None => {
            debug!("unknown session, redirecting to landing");
            Gate::Redirect(LANDING)
        }
    }
}

/// The landing page check: signed-in visitors skip straight to their list.
pub async fn landing(backend: &Backend, token: Option<&str>) -> Option<&'static str> {
    match guard(backend, token).await {
        Gate::Allowed(_) => Some(BOOKMARKS),
        Gate::Redirect(_) => None,
    }
}

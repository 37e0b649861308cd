use rocket::Either;
use rocket::response::Redirect;
use rocket::serde::{json::Json, Serialize};
use rocket::State;
use tracing::warn;

use super::guards::Token;
use crate::backend::Backend;
use crate::client::session::{self, Gate};
use crate::client::{display_domain, BookmarkList, EMPTY_STATE};
use crate::models::Bookmark;

#[derive(Serialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct Landing {
    pub message: &'static str,
}

#[derive(Serialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct Entry {
    #[serde(flatten)]
    pub bookmark: Bookmark,
    pub domain: String,
}

#[derive(Serialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct BookmarksPage {
    pub email: String,
    pub bookmarks: Vec<Entry>,
    pub empty_state: Option<&'static str>,
}

#[get("/")]
pub async fn landing(token: Token, backend: &State<Backend>) -> Either<Redirect, Json<Landing>> {
    match session::landing(backend, token.0.as_deref()).await {
        Some(location) => Either::Left(Redirect::to(location)),
        None => Either::Right(Json(Landing {
            message: "Sign in to manage your bookmarks",
        })),
    }
}

/// The signed-in user's page with a server-side snapshot of their list.
#[get("/bookmarks")]
pub async fn page(token: Token, backend: &State<Backend>) -> Either<Redirect, Json<BookmarksPage>> {
    let session = match session::guard(backend, token.0.as_deref()).await {
        Gate::Allowed(session) => session,
        Gate::Redirect(location) => return Either::Left(Redirect::to(location)),
    };

    let rows = backend.select(session.user_id()).await.unwrap_or_else(|e| {
        warn!(error = %e, user_id = session.user_id(), "failed to fetch bookmarks");
        Vec::new()
    });
    let list = BookmarkList::with_snapshot(session.user_id(), rows);

    Either::Right(Json(BookmarksPage {
        email: session.identity.email,
        empty_state: list.is_empty().then_some(EMPTY_STATE),
        bookmarks: list
            .iter()
            .map(|b| Entry {
                domain: display_domain(&b.url),
                bookmark: b.clone(),
            })
            .collect(),
    }))
}

#[post("/sign-out")]
pub async fn sign_out(token: Token, backend: &State<Backend>) -> Redirect {
    if let Some(token) = token.0.as_deref() {
        backend.sign_out(token).await;
    }
    Redirect::to(session::LANDING)
}

pub fn routes() -> Vec<rocket::Route> {
    routes![landing, page]
}

pub fn api_routes() -> Vec<rocket::Route> {
    routes![sign_out]
}

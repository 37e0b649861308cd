use rocket::response::stream::{Event, EventStream};
use rocket::serde::{json::Json, Deserialize, Serialize};
use rocket::{Shutdown, State};

use super::errors::Error;
use crate::backend::Backend;
use crate::client::{AddBookmarkForm, ListView, Session, ViewOptions};
use crate::models::{Bookmark, BookmarkId, ModifyBookmark};

#[derive(Deserialize, Serialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct CreateBookmark {
    pub title: String,
    pub url: String,
}

#[get("/")]
pub async fn list_bookmarks(
    session: Session,
    backend: &State<Backend>,
) -> Result<Json<Vec<Bookmark>>, Error> {
    let rows = backend.select(session.user_id()).await?;
    Ok(Json(rows))
}

#[post("/", format = "application/json", data = "<payload>")]
pub async fn create_bookmark(
    session: Session,
    backend: &State<Backend>,
    payload: Json<CreateBookmark>,
) -> Result<Json<Bookmark>, Error> {
    let CreateBookmark { title, url } = payload.into_inner();
    let form = AddBookmarkForm::with_input(url, title);
    let created = form.submit(backend, Some(&session)).await?;
    Ok(Json(created))
}

#[patch("/<id>", format = "application/json", data = "<payload>")]
pub async fn update_bookmark(
    session: Session,
    backend: &State<Backend>,
    id: BookmarkId,
    payload: Json<ModifyBookmark>,
) -> Result<Json<Bookmark>, Error> {
    let changes = payload.into_inner();
    changes.validate()?;
    backend
        .update(id, session.user_id(), changes)
        .await?
        .map(Json)
        .ok_or_else(|| Error::NotFound("Bookmark not found".to_string()))
}

#[delete("/<id>")]
pub async fn delete_bookmark(
    session: Session,
    backend: &State<Backend>,
    id: BookmarkId,
) -> Result<&'static str, Error> {
    if backend.delete(id, session.user_id()).await? {
        Ok("Deleted")
    } else {
        Err(Error::NotFound("Bookmark not found".to_string()))
    }
}

/// Streams the caller's list, in full, every time it changes.
#[get("/live")]
pub async fn live_bookmarks(
    session: Session,
    backend: &State<Backend>,
    options: &State<ViewOptions>,
    mut shutdown: Shutdown,
) -> EventStream![] {
    let view = ListView::open(backend.inner().clone(), &session, None, *options.inner()).await;
    let mut rx = view.watch();

    EventStream! {
        loop {
            let rows = rx.borrow_and_update().list.as_slice().to_vec();
            yield Event::json(&rows).event("snapshot");

            rocket::tokio::select! {
                changed = rx.changed() => if changed.is_err() { break },
                _ = &mut shutdown => break,
            }
        }
        view.close().await;
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        list_bookmarks,
        create_bookmark,
        update_bookmark,
        delete_bookmark,
        live_bookmarks
    ]
}

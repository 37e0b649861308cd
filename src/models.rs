use diesel::prelude::*;
use rocket::serde::{Deserialize, Serialize};
use url::Url;

use crate::db::schema::bookmarks;
use crate::utils::ValidationError;

pub type BookmarkId = i32;

#[derive(
    Queryable, Selectable, Identifiable, Deserialize, Serialize, PartialEq, Eq, Debug, Clone,
)]
#[serde(crate = "rocket::serde")]
#[diesel(table_name = bookmarks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Bookmark {
    pub id: BookmarkId,
    pub user_id: String,
    pub title: String,
    pub url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
}

/// Row handed to the store. The owner is always taken from a verified
/// session, so this type is never deserialized from a request body.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = bookmarks)]
pub struct NewBookmark {
    pub user_id: String,
    pub title: String,
    pub url: String,
}

#[derive(AsChangeset, Deserialize, Serialize, Debug, Clone, Default)]
#[serde(crate = "rocket::serde")]
#[diesel(table_name = bookmarks)]
pub struct ModifyBookmark {
    pub title: Option<String>,
    pub url: Option<String>,
}

impl ModifyBookmark {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.url.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = self.url.as_deref() {
            parse_url(url)?;
        }
        if let Some(title) = self.title.as_deref() {
            if title.trim().is_empty() {
                return Err(ValidationError::EmptyTitle);
            }
        }
        Ok(())
    }
}

#[derive(Deserialize, Serialize, PartialEq, Eq, Debug, Clone)]
#[serde(crate = "rocket::serde")]
pub struct Identity {
    pub id: String,
    pub email: String,
}

/// A row change as delivered by the realtime feed.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum ChangeEvent {
    Insert(Bookmark),
    Update { old_id: BookmarkId, new: Bookmark },
    Delete { old_id: BookmarkId },
}

/// Checks that `raw` is an absolute URL. The stored value stays exactly as
/// typed; the parsed form is only used for validation.
pub fn parse_url(raw: &str) -> Result<Url, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    Url::parse(raw).map_err(|_| ValidationError::InvalidUrl)
}

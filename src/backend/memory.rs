use std::sync::{Mutex, MutexGuard, PoisonError};

use time::{Duration, OffsetDateTime};

use super::BookmarkStore;
use crate::models::{Bookmark, BookmarkId, ModifyBookmark, NewBookmark};
use crate::utils::StorageError;

/// Process-local store, used when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    rows: Vec<Bookmark>,
    last_id: BookmarkId,
    last_created_at: Option<OffsetDateTime>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl State {
    // creation timestamps are strictly increasing, even within one clock tick
    fn next_created_at(&mut self) -> OffsetDateTime {
        let now = OffsetDateTime::now_utc();
        let created_at = match self.last_created_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(created_at);
        created_at
    }
}

#[rocket::async_trait]
impl BookmarkStore for MemoryStore {
    async fn insert(&self, new_bookmark: NewBookmark) -> Result<Bookmark, StorageError> {
        let mut state = self.state();
        state.last_id += 1;
        let row = Bookmark {
            id: state.last_id,
            user_id: new_bookmark.user_id,
            title: new_bookmark.title,
            url: new_bookmark.url,
            created_at: state.next_created_at(),
        };
        state.rows.push(row.clone());
        Ok(row)
    }

    async fn select(&self, user_id: &str) -> Result<Vec<Bookmark>, StorageError> {
        let mut rows: Vec<Bookmark> = self
            .state()
            .rows
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn update(
        &self,
        id: BookmarkId,
        user_id: &str,
        changes: ModifyBookmark,
    ) -> Result<Option<Bookmark>, StorageError> {
        let mut state = self.state();
        let Some(row) = state
            .rows
            .iter_mut()
            .find(|b| b.id == id && b.user_id == user_id)
        else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            row.title = title;
        }
        if let Some(url) = changes.url {
            row.url = url;
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: BookmarkId, user_id: &str) -> Result<bool, StorageError> {
        let mut state = self.state();
        let before = state.rows.len();
        state.rows.retain(|b| !(b.id == id && b.user_id == user_id));
        Ok(state.rows.len() < before)
    }
}

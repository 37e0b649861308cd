//! Collaborator services behind the bookmark application: sessions, row
//! storage and the realtime change feed. A [`Backend`] bundles the three and
//! is built once per process, then cloned into every component that needs it.

pub mod auth;
pub mod memory;
pub mod postgres;
pub mod realtime;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use tracing::debug;

use crate::models::{Bookmark, BookmarkId, ChangeEvent, Identity, ModifyBookmark, NewBookmark};
use crate::utils::{FeedError, StorageError};

pub use auth::SessionStore;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use realtime::{ChangeHub, Subscription};

/// Relational storage for bookmark rows.
///
/// Every read and write is scoped by the owning user; implementations must
/// never return or touch rows belonging to anyone else.
#[rocket::async_trait]
pub trait BookmarkStore: Send + Sync {
    async fn insert(&self, new_bookmark: NewBookmark) -> Result<Bookmark, StorageError>;

    /// All rows owned by `user_id`, newest first.
    async fn select(&self, user_id: &str) -> Result<Vec<Bookmark>, StorageError>;

    async fn update(
        &self,
        id: BookmarkId,
        user_id: &str,
        changes: ModifyBookmark,
    ) -> Result<Option<Bookmark>, StorageError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: BookmarkId, user_id: &str) -> Result<bool, StorageError>;
}

#[derive(Clone)]
pub struct Backend {
    inner: Arc<Inner>,
}

struct Inner {
    auth: SessionStore,
    store: Arc<dyn BookmarkStore>,
    feed: ChangeHub,
}

impl Backend {
    pub fn new(auth: SessionStore, store: Arc<dyn BookmarkStore>, feed: ChangeHub) -> Self {
        Self {
            inner: Arc::new(Inner { auth, store, feed }),
        }
    }

    pub fn in_memory(auth: SessionStore) -> Self {
        Self::new(auth, Arc::new(MemoryStore::new()), ChangeHub::new())
    }

    pub fn auth(&self) -> &SessionStore {
        &self.inner.auth
    }

    pub fn feed(&self) -> &ChangeHub {
        &self.inner.feed
    }

    pub async fn current_user(&self, token: &str) -> Option<Identity> {
        self.inner.auth.get_current_user(token)
    }

    pub async fn sign_out(&self, token: &str) {
        if self.inner.auth.sign_out(token) {
            debug!("session revoked");
        }
    }

    pub async fn insert(&self, new_bookmark: NewBookmark) -> Result<Bookmark, StorageError> {
        let row = self.inner.store.insert(new_bookmark).await?;
        self.inner
            .feed
            .publish(&row.user_id, ChangeEvent::Insert(row.clone()));
        Ok(row)
    }

    pub async fn select(&self, user_id: &str) -> Result<Vec<Bookmark>, StorageError> {
        self.inner.store.select(user_id).await
    }

    pub async fn update(
        &self,
        id: BookmarkId,
        user_id: &str,
        changes: ModifyBookmark,
    ) -> Result<Option<Bookmark>, StorageError> {
        let row = self.inner.store.update(id, user_id, changes).await?;
        if let Some(row) = row.as_ref() {
            self.inner.feed.publish(
                user_id,
                ChangeEvent::Update {
                    old_id: id,
                    new: row.clone(),
                },
            );
        }
        Ok(row)
    }

    pub async fn delete(&self, id: BookmarkId, user_id: &str) -> Result<bool, StorageError> {
        let removed = self.inner.store.delete(id, user_id).await?;
        if removed {
            self.inner
                .feed
                .publish(user_id, ChangeEvent::Delete { old_id: id });
        }
        Ok(removed)
    }

    pub fn subscribe(&self, user_id: &str) -> Result<Subscription, FeedError> {
        self.inner.feed.subscribe(user_id)
    }
}

//! Store double for tests: counts calls, injects failures and can hold an
//! operation until the test releases it.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

use super::{Backend, BookmarkStore, ChangeHub, MemoryStore, SessionStore};
use crate::models::{Bookmark, BookmarkId, Identity, ModifyBookmark, NewBookmark};
use crate::utils::StorageError;

#[derive(Default)]
pub struct RecordingStore {
    pub rows: MemoryStore,
    pub inserts: AtomicUsize,
    pub selects: AtomicUsize,
    pub deletes: AtomicUsize,
    pub fail_inserts: AtomicBool,
    pub fail_selects: AtomicBool,
    pub fail_deletes: AtomicBool,
    pub insert_gate: Option<Arc<Notify>>,
    pub delete_gate: Option<Arc<Notify>>,
}

impl RecordingStore {
    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn selects(&self) -> usize {
        self.selects.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[rocket::async_trait]
impl BookmarkStore for RecordingStore {
    async fn insert(&self, new_bookmark: NewBookmark) -> Result<Bookmark, StorageError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = self.insert_gate.as_ref() {
            gate.notified().await;
        }
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected(
                "new row violates row-level security policy".to_string(),
            ));
        }
        self.rows.insert(new_bookmark).await
    }

    async fn select(&self, user_id: &str) -> Result<Vec<Bookmark>, StorageError> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        if self.fail_selects.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected("connection reset".to_string()));
        }
        self.rows.select(user_id).await
    }

    async fn update(
        &self,
        id: BookmarkId,
        user_id: &str,
        changes: ModifyBookmark,
    ) -> Result<Option<Bookmark>, StorageError> {
        self.rows.update(id, user_id, changes).await
    }

    async fn delete(&self, id: BookmarkId, user_id: &str) -> Result<bool, StorageError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = self.delete_gate.as_ref() {
            gate.notified().await;
        }
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected("connection reset".to_string()));
        }
        self.rows.delete(id, user_id).await
    }
}

pub fn identity(user_id: &str) -> Identity {
    Identity {
        id: user_id.to_string(),
        email: format!("{user_id}@example.com"),
    }
}

/// A backend over `store` with one session per given user; the token of each
/// session is `token-<user_id>`.
pub fn backend_with(store: Arc<RecordingStore>, users: &[&str]) -> Backend {
    let auth = SessionStore::from_sessions(
        users
            .iter()
            .map(|user| (format!("token-{user}"), identity(user))),
    );
    Backend::new(auth, store, ChangeHub::new())
}

//! The synchronized bookmark list.
//!
//! A [`ListView`] holds one user's [`BookmarkList`] and keeps it current in a
//! background task, either by following the realtime change feed (falling
//! back to polling when the feed is unavailable or goes away) or by polling
//! alone. State lives in a `watch` channel so that observers are notified of
//! every change, and the liveness check shares the channel's lock with each
//! mutation: once the view is closed nothing else is applied.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rocket::serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, warn};

use super::list::BookmarkList;
use super::session::Session;
use crate::backend::{Backend, Subscription};
use crate::models::{Bookmark, BookmarkId, ChangeEvent};
use crate::utils::{FeedError, StorageError};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum SyncStrategy {
    /// Follow the change feed; poll only while the feed is unavailable.
    #[default]
    Subscription,
    /// Re-fetch the whole list on a fixed timer.
    Polling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMode {
    /// Drop the row locally before the request resolves and re-fetch if it
    /// fails.
    #[default]
    Optimistic,
    /// Leave the list alone and wait for the delete event.
    AwaitEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub strategy: SyncStrategy,
    pub poll_interval: Duration,
    pub delete_mode: DeleteMode,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            strategy: SyncStrategy::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            delete_mode: DeleteMode::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStatus {
    Loading,
    Empty,
    Ready,
}

#[derive(Debug, Clone)]
pub struct ViewState {
    pub list: BookmarkList,
    loaded: bool,
    closed: bool,
}

impl ViewState {
    fn new(owner: &str) -> Self {
        Self {
            list: BookmarkList::new(owner),
            loaded: false,
            closed: false,
        }
    }

    pub fn status(&self) -> ListStatus {
        match (self.loaded, self.list.is_empty()) {
            (false, _) => ListStatus::Loading,
            (true, true) => ListStatus::Empty,
            (true, false) => ListStatus::Ready,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// What the background task and the view share.
#[derive(Clone)]
struct Syncer {
    backend: Backend,
    user_id: String,
    state: Arc<watch::Sender<ViewState>>,
}

impl Syncer {
    fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }

    fn mutate(&self, f: impl FnOnce(&mut BookmarkList) -> bool) -> bool {
        self.state.send_if_modified(|state| {
            if state.closed {
                return false;
            }
            f(&mut state.list)
        })
    }

    /// Overwrites the list; observers are only notified when the rows
    /// differ or this is the first load.
    fn replace(&self, rows: Vec<Bookmark>) -> bool {
        self.state.send_if_modified(|state| {
            if state.closed {
                return false;
            }
            let next = BookmarkList::with_snapshot(state.list.owner(), rows);
            let changed = !state.loaded || next != state.list;
            state.list = next;
            state.loaded = true;
            changed
        })
    }

    fn mark_loaded(&self) {
        self.state.send_if_modified(|state| {
            let changed = !state.closed && !state.loaded;
            state.loaded |= changed;
            changed
        });
    }

    fn apply(&self, event: &ChangeEvent) -> bool {
        self.mutate(|list| list.apply(event))
    }

    /// Full re-fetch. Failures are logged and otherwise ignored.
    async fn refresh(&self) -> bool {
        match self.backend.select(&self.user_id).await {
            Ok(rows) => self.replace(rows),
            Err(e) => {
                warn!(error = %e, user_id = %self.user_id, "failed to fetch bookmarks");
                false
            }
        }
    }

    async fn poll(self, period: Duration) {
        debug!(user_id = %self.user_id, ?period, "polling bookmarks");
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if self.is_closed() {
                break;
            }
            self.refresh().await;
        }
    }

    async fn follow(self, mut subscription: Subscription, fallback: Duration) {
        debug!(user_id = %self.user_id, "following change feed");
        loop {
            match subscription.recv().await {
                Ok(event) => {
                    debug!(?event, "applying change event");
                    self.apply(&event);
                }
                Err(FeedError::Lagged(missed)) => {
                    warn!(missed, user_id = %self.user_id, "change feed lagged, re-fetching");
                    self.refresh().await;
                }
                Err(e) => {
                    warn!(error = %e, user_id = %self.user_id, "change feed ended, falling back to polling");
                    break;
                }
            }
            if self.is_closed() {
                return;
            }
        }
        subscription.unsubscribe();
        self.poll(fallback).await
    }
}

pub struct ListView {
    syncer: Syncer,
    options: ViewOptions,
    deleting: Mutex<BTreeSet<BookmarkId>>,
    worker: Option<JoinHandle<()>>,
}

impl ListView {
    /// Opens a view for the session's user.
    ///
    /// With `initial` rows (a server-rendered snapshot) no fetch is made up
    /// front. The subscription, when used, is opened before the first fetch
    /// so that changes made in between are not lost.
    pub async fn open(
        backend: Backend,
        session: &Session,
        initial: Option<Vec<Bookmark>>,
        options: ViewOptions,
    ) -> Self {
        let user_id = session.user_id().to_string();
        let (state, _) = watch::channel(ViewState::new(&user_id));
        let syncer = Syncer {
            backend,
            user_id,
            state: Arc::new(state),
        };

        let subscription = match options.strategy {
            SyncStrategy::Subscription => match syncer.backend.subscribe(&syncer.user_id) {
                Ok(subscription) => Some(subscription),
                Err(e) => {
                    warn!(error = %e, user_id = %syncer.user_id, "change feed unavailable, polling instead");
                    None
                }
            },
            SyncStrategy::Polling => None,
        };

        match initial {
            Some(rows) => {
                syncer.replace(rows);
            }
            None => {
                if !syncer.refresh().await {
                    syncer.mark_loaded();
                }
            }
        }

        let worker = match subscription {
            Some(subscription) => {
                tokio::spawn(syncer.clone().follow(subscription, options.poll_interval))
            }
            None => tokio::spawn(syncer.clone().poll(options.poll_interval)),
        };

        Self {
            syncer,
            options,
            deleting: Mutex::new(BTreeSet::new()),
            worker: Some(worker),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.syncer.user_id
    }

    pub fn options(&self) -> ViewOptions {
        self.options
    }

    pub fn snapshot(&self) -> Vec<Bookmark> {
        self.syncer.state.borrow().list.as_slice().to_vec()
    }

    pub fn status(&self) -> ListStatus {
        self.syncer.state.borrow().status()
    }

    /// A receiver that is notified on every change of the list.
    pub fn watch(&self) -> watch::Receiver<ViewState> {
        self.syncer.state.subscribe()
    }

    /// Ids of the bookmarks whose deletion is in flight.
    pub fn deleting(&self) -> Vec<BookmarkId> {
        self.deleting_ids().iter().copied().collect()
    }

    pub fn is_deleting(&self, id: BookmarkId) -> bool {
        self.deleting_ids().contains(&id)
    }

    fn deleting_ids(&self) -> std::sync::MutexGuard<'_, BTreeSet<BookmarkId>> {
        self.deleting.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-fetches the list, returning whether it changed.
    pub async fn refresh(&self) -> bool {
        self.syncer.refresh().await
    }

    /// Deletes one of the user's bookmarks. Returns whether a row was
    /// removed from the store.
    ///
    /// In [`DeleteMode::Optimistic`] the row disappears from the list at
    /// once. If the request fails, the list is re-fetched in full rather than
    /// restored from a saved copy.
    pub async fn delete(&self, id: BookmarkId) -> Result<bool, StorageError> {
        self.deleting_ids().insert(id);
        if self.options.delete_mode == DeleteMode::Optimistic {
            self.syncer.mutate(|list| list.remove(id).is_some());
        }

        let result = self.syncer.backend.delete(id, &self.syncer.user_id).await;
        if let Err(e) = &result {
            error!(error = %e, id, "failed to delete bookmark");
            if self.options.delete_mode == DeleteMode::Optimistic {
                self.syncer.refresh().await;
            }
        }

        self.deleting_ids().remove(&id);
        result
    }

    fn shutdown(&mut self) {
        self.syncer.state.send_if_modified(|state| {
            state.closed = true;
            false
        });
        if let Some(worker) = self.worker.as_ref() {
            worker.abort();
        }
    }

    /// Tears the view down and waits until the timer or subscription has
    /// been released.
    pub async fn close(mut self) {
        self.shutdown();
        if let Some(worker) = self.worker.take() {
            let _ = worker.await;
        }
        debug!(user_id = %self.syncer.user_id, "list view closed");
    }
}

impl Drop for ListView {
    fn drop(&mut self) {
        self.shutdown();
    }
}

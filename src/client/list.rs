use url::Url;

use crate::models::{Bookmark, BookmarkId, ChangeEvent};

/// Shown in place of the list when the user has no bookmarks.
pub const EMPTY_STATE: &str = "No bookmarks yet";

/// One user's bookmarks, newest first.
///
/// Rows owned by anyone else are dropped on the way in, whether they come
/// from a snapshot or from the change feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkList {
    owner: String,
    items: Vec<Bookmark>,
}

impl BookmarkList {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            items: Vec::new(),
        }
    }

    pub fn with_snapshot(owner: impl Into<String>, rows: Vec<Bookmark>) -> Self {
        let mut list = Self::new(owner);
        list.replace(rows);
        list
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn as_slice(&self) -> &[Bookmark] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bookmark> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: BookmarkId) -> Option<&Bookmark> {
        self.items.iter().find(|b| b.id == id)
    }

    fn owns(&self, row: &Bookmark) -> bool {
        row.user_id == self.owner
    }

    /// Full overwrite with a fetched snapshot.
    pub fn replace(&mut self, rows: Vec<Bookmark>) {
        let owner = self.owner.as_str();
        self.items = rows.into_iter().filter(|b| b.user_id == owner).collect();
        self.items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }

    /// Patches the list with one change event, returning whether anything
    /// changed.
    pub fn apply(&mut self, event: &ChangeEvent) -> bool {
        match event {
            ChangeEvent::Insert(row) => self.insert(row.clone()),
            ChangeEvent::Update { new, .. } => self.update(new.clone()),
            ChangeEvent::Delete { old_id } => self.remove(*old_id).is_some(),
        }
    }

    /// New rows normally arrive in creation order and land at the head. An id
    /// already present is left alone, so a snapshot that raced the event does
    /// not produce a duplicate.
    pub fn insert(&mut self, row: Bookmark) -> bool {
        if !self.owns(&row) || self.get(row.id).is_some() {
            return false;
        }
        let at = self
            .items
            .partition_point(|b| b.created_at > row.created_at);
        self.items.insert(at, row);
        true
    }

    pub fn update(&mut self, row: Bookmark) -> bool {
        if !self.owns(&row) {
            return false;
        }
        match self.items.iter_mut().find(|b| b.id == row.id) {
            Some(current) if *current != row => {
                *current = row;
                true
            }
            _ => false,
        }
    }

    /// Removing an id that is not in the list is a no-op.
    pub fn remove(&mut self, id: BookmarkId) -> Option<Bookmark> {
        let at = self.items.iter().position(|b| b.id == id)?;
        Some(self.items.remove(at))
    }
}

/// Host of a bookmark URL for display, without a leading `www.`. Falls back
/// to the raw string when it does not parse.
pub fn display_domain(url: &str) -> String {
    match Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_owned)) {
        Some(host) => host.strip_prefix("www.").unwrap_or(&host).to_string(),
        None => url.to_string(),
    }
}

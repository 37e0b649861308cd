use diesel_async::pooled_connection::deadpool::{Object, Pool};
use diesel_async::AsyncPgConnection;

use super::BookmarkStore;
use crate::db::{bookmark, connection};
use crate::models::{Bookmark, BookmarkId, ModifyBookmark, NewBookmark};
use crate::utils::StorageError;

/// Store backed by the Postgres pool of the `Db` fairing.
pub struct PgStore {
    pool: Pool<AsyncPgConnection>,
}

impl PgStore {
    pub fn new(pool: Pool<AsyncPgConnection>) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<Object<AsyncPgConnection>, StorageError> {
        let mut conn = self.pool.get().await?;
        connection::instrument(&mut conn);
        Ok(conn)
    }
}

#[rocket::async_trait]
impl BookmarkStore for PgStore {
    async fn insert(&self, new_bookmark: NewBookmark) -> Result<Bookmark, StorageError> {
        let mut conn = self.conn().await?;
        Ok(bookmark::create_bookmark(&mut conn, &new_bookmark).await?)
    }

    async fn select(&self, user_id: &str) -> Result<Vec<Bookmark>, StorageError> {
        let mut conn = self.conn().await?;
        Ok(bookmark::list_bookmarks(&mut conn, user_id).await?)
    }

    async fn update(
        &self,
        id: BookmarkId,
        user_id: &str,
        changes: ModifyBookmark,
    ) -> Result<Option<Bookmark>, StorageError> {
        let mut conn = self.conn().await?;
        Ok(bookmark::update_bookmark(&mut conn, id, user_id, &changes).await?)
    }

    async fn delete(&self, id: BookmarkId, user_id: &str) -> Result<bool, StorageError> {
        let mut conn = self.conn().await?;
        Ok(bookmark::delete_bookmark(&mut conn, id, user_id).await? > 0)
    }
}

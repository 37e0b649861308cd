use diesel::prelude::*;
use diesel_async::{AsyncPgConnection as Connection, RunQueryDsl};

use super::schema::bookmarks;
use crate::models::{Bookmark, BookmarkId, ModifyBookmark, NewBookmark};

pub async fn create_bookmark(
    conn: &mut Connection,
    new_bookmark: &NewBookmark,
) -> QueryResult<Bookmark> {
    diesel::insert_into(bookmarks::table)
        .values(new_bookmark)
        .returning(Bookmark::as_returning())
        .get_result(conn)
        .await
}

pub async fn get_bookmark(
    conn: &mut Connection,
    id: BookmarkId,
    user_id: &str,
) -> QueryResult<Option<Bookmark>> {
    bookmarks::table
        .filter(bookmarks::id.eq(id).and(bookmarks::user_id.eq(user_id)))
        .select(Bookmark::as_select())
        .first(conn)
        .await
        .optional()
}

pub async fn list_bookmarks(conn: &mut Connection, user_id: &str) -> QueryResult<Vec<Bookmark>> {
    bookmarks::table
        .filter(bookmarks::user_id.eq(user_id))
        .order_by(bookmarks::created_at.desc())
        .select(Bookmark::as_select())
        .load(conn)
        .await
}

pub async fn update_bookmark(
    conn: &mut Connection,
    id: BookmarkId,
    user_id: &str,
    modified: &ModifyBookmark,
) -> QueryResult<Option<Bookmark>> {
    // an empty changeset is a query builder error in diesel
    if modified.is_empty() {
        return get_bookmark(conn, id, user_id).await;
    }
    diesel::update(bookmarks::table.filter(bookmarks::id.eq(id).and(bookmarks::user_id.eq(user_id))))
        .set(modified)
        .returning(Bookmark::as_returning())
        .get_result(conn)
        .await
        .optional()
}

pub async fn delete_bookmark(
    conn: &mut Connection,
    id: BookmarkId,
    user_id: &str,
) -> QueryResult<usize> {
    diesel::delete(bookmarks::table.filter(bookmarks::id.eq(id).and(bookmarks::user_id.eq(user_id))))
        .execute(conn)
        .await
}

#[cfg(test)]
pub(crate) mod test {
    use super::super::connection;
    use super::*;
    use crate::utils;
    use tracing::info;

    pub fn rand_bookmark(user_id: &str) -> NewBookmark {
        NewBookmark {
            user_id: user_id.to_string(),
            title: utils::rand::rand_str(10),
            url: utils::rand::rand_url(),
        }
    }

    async fn establish() -> Connection {
        let url = std::env::var("LV_DATABASE_URL").expect("LV_DATABASE_URL must be set");
        connection::run_migrations(&url)
            .await
            .expect("Error running migrations");
        connection::establish(&url)
            .await
            .expect("Error connecting database")
    }

    #[tokio::test]
    #[ignore = "requires a running postgres"]
    async fn create_new_bookmark() {
        let mut conn = establish().await;
        let user = utils::rand::rand_user_id();

        let m = create_bookmark(&mut conn, &rand_bookmark(&user))
            .await
            .expect("Error saving new bookmark");

        info!("{:?}", m);
        assert!(m.id > 0);
        assert_eq!(m.user_id, user);
    }

    #[tokio::test]
    #[ignore = "requires a running postgres"]
    async fn list_is_scoped_and_newest_first() {
        let mut conn = establish().await;
        let (user, other) = (utils::rand::rand_user_id(), utils::rand::rand_user_id());

        let first = create_bookmark(&mut conn, &rand_bookmark(&user)).await.unwrap();
        let second = create_bookmark(&mut conn, &rand_bookmark(&user)).await.unwrap();
        create_bookmark(&mut conn, &rand_bookmark(&other)).await.unwrap();

        let results = list_bookmarks(&mut conn, &user).await.unwrap();
        let ids: Vec<_> = results.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    #[ignore = "requires a running postgres"]
    async fn delete_is_scoped_by_owner() {
        let mut conn = establish().await;
        let (user, other) = (utils::rand::rand_user_id(), utils::rand::rand_user_id());
        let m = create_bookmark(&mut conn, &rand_bookmark(&user)).await.unwrap();

        assert_eq!(delete_bookmark(&mut conn, m.id, &other).await.unwrap(), 0);
        assert_eq!(delete_bookmark(&mut conn, m.id, &user).await.unwrap(), 1);
        assert_eq!(delete_bookmark(&mut conn, m.id, &user).await.unwrap(), 0);
        assert!(get_bookmark(&mut conn, m.id, &user).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires a running postgres"]
    async fn update_exists_bookmark() {
        let mut conn = establish().await;
        let user = utils::rand::rand_user_id();
        let bm = create_bookmark(&mut conn, &rand_bookmark(&user)).await.unwrap();

        let modified = rand_bookmark(&user);
        let rv = update_bookmark(
            &mut conn,
            bm.id,
            &user,
            &ModifyBookmark {
                title: Some(modified.title.clone()),
                url: Some(modified.url.clone()),
            },
        )
        .await
        .unwrap();
        let modified_bm = rv.unwrap();
        assert_eq!(modified_bm.id, bm.id);
        assert_eq!(modified_bm.title, modified.title);
        assert_eq!(modified_bm.url, modified.url);
        assert_eq!(modified_bm.created_at, bm.created_at);

        let untouched = update_bookmark(&mut conn, bm.id, &user, &ModifyBookmark::default())
            .await
            .unwrap();
        assert_eq!(untouched, Some(modified_bm));
    }
}

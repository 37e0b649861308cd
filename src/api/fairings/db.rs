use diesel_async::{
    pooled_connection::{
        deadpool::{BuildError, Object, Pool, PoolError},
        AsyncDieselConnectionManager,
    },
    AsyncPgConnection,
};
use rocket::figment::Figment;
use rocket_db_pools::{Database, Error};

use crate::db::connection;

pub type InitError = BuildError;
pub type GetError = PoolError;
pub type Connection = AsyncPgConnection;
pub struct DBPool(Pool<Connection>);

impl DBPool {
    /// A handle onto the same pool, for stores living outside request guards.
    pub fn pool(&self) -> Pool<Connection> {
        self.0.clone()
    }
}

#[rocket::async_trait]
impl rocket_db_pools::Pool for DBPool {
    type Connection = Object<Connection>;

    type Error = Error<InitError, GetError>;

    async fn init(figment: &Figment) -> Result<Self, Self::Error> {
        let url = figment.extract_inner::<String>("url").unwrap_or_default();
        let config = AsyncDieselConnectionManager::<Connection>::new(url);
        match Pool::builder(config).build() {
            Ok(pool) => Ok(Self(pool)),
            Err(e) => Err(Error::Init(e)),
        }
    }

    async fn get(&self) -> Result<Self::Connection, Self::Error> {
        let mut conn = self.0.get().await.map_err(Error::Get)?;
        connection::instrument(&mut conn);
        Ok(conn)
    }

    async fn close(&self) {
        self.0.close()
    }
}

#[derive(Database)]
#[database("main")]
pub struct Db(DBPool);

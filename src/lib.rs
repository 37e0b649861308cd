#[macro_use]
extern crate rocket;

pub mod api;
pub mod backend;
pub mod client;
pub mod db;
pub mod models;
pub mod utils;

use std::sync::Arc;

use rocket::figment::Figment;
use rocket::{Build, Rocket};

#[cfg(test)]
#[cfg(not(tarpaulin_include))]
#[ctor::ctor]
fn init() {
    crate::utils::logging::setup_console_log();
}

pub(crate) fn mount(rocket: Rocket<Build>) -> Rocket<Build> {
    use crate::api::{bookmark, session};

    rocket
        .mount("/", session::routes())
        .mount("/api/session", session::api_routes())
        .mount("/api/bookmarks", bookmark::routes())
}

/// Builds the application from `figment`. Bookmarks live in Postgres when
/// `databases.main.url` is set, in memory otherwise.
pub async fn rocket(figment: Figment) -> anyhow::Result<Rocket<Build>> {
    use rocket::fairing::AdHoc;
    use rocket_db_pools::Database;
    use tracing::info;

    use crate::api::configs::{self, Config};
    use crate::api::fairings::db::Db;
    use crate::backend::{Backend, ChangeHub, PgStore, SessionStore};

    let config: Config = figment.extract()?;
    let auth = SessionStore::from_sessions(config.sessions());
    let builder = rocket::custom(figment.clone()).manage(config.view_options());

    let builder = match configs::get_database_url(&figment) {
        Some(url) => {
            crate::db::connection::run_migrations(&url).await?;
            builder
                .attach(Db::init())
                .attach(AdHoc::try_on_ignite("Bookmark store", move |rocket| async move {
                    let Some(db) = Db::fetch(&rocket) else {
                        return Err(rocket);
                    };
                    let store = Arc::new(PgStore::new(db.pool()));
                    let backend = Backend::new(auth, store, ChangeHub::new());
                    Ok(rocket.manage(backend))
                }))
        }
        None => {
            info!("no database configured, keeping bookmarks in memory");
            builder.manage(Backend::in_memory(auth))
        }
    };

    Ok(mount(builder))
}

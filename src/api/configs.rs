use std::time::Duration;

use rocket::{
    figment::Figment,
    serde::{Deserialize, Serialize},
};

use crate::client::{SyncStrategy, ViewOptions};
use crate::models::Identity;

#[derive(Debug, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct Config {
    pub poll_interval_ms: u64,
    pub sync_strategy: SyncStrategy,
    pub sessions: Vec<SessionSeed>,
    pub log_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_ms: 3000,
            sync_strategy: SyncStrategy::default(),
            sessions: Vec::new(),
            log_dir: None,
        }
    }
}

/// A session accepted by the auth collaborator.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SessionSeed {
    pub token: String,
    pub user_id: String,
    pub email: String,
}

impl Config {
    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            strategy: self.sync_strategy,
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            ..Default::default()
        }
    }

    pub fn sessions(&self) -> impl Iterator<Item = (String, Identity)> + '_ {
        self.sessions.iter().map(|seed| {
            (
                seed.token.clone(),
                Identity {
                    id: seed.user_id.clone(),
                    email: seed.email.clone(),
                },
            )
        })
    }
}

pub fn config_provider() -> Figment {
    use rocket::figment::providers::{Env, Serialized};

    dotenvy::dotenv().ok();

    rocket::figment::Figment::from(rocket::Config::default())
        .merge(Serialized::defaults(Config::default()))
        .merge(("databases.main", rocket_db_pools::Config::default()))
        .merge(Env::prefixed("LV_").global())
}

/// The configured Postgres URL; `None` keeps bookmarks in memory.
pub fn get_database_url(figment: &Figment) -> Option<String> {
    figment
        .extract_inner::<String>("databases.main.url")
        .ok()
        .filter(|url| !url.is_empty())
}

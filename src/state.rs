use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use crate::auth::repo::{PgProfiles, ProfileStore};
use crate::config::AppConfig;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub profiles: Arc<dyn ProfileStore>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let profiles = Arc::new(PgProfiles::new(db.clone())) as Arc<dyn ProfileStore>;
        let sessions = Arc::new(SessionStore::new(config.session_file.clone()));

        Ok(Self {
            db,
            config,
            profiles,
            sessions,
        })
    }
}

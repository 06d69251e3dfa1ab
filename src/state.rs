use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{config::AppConfig, db, views::Templates};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub templates: Arc<Templates>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config.database_url).await?;
        db::migrate(&db).await?;
        let templates = Arc::new(Templates::new()?);

        Ok(Self {
            db,
            config,
            templates,
        })
    }

    /// In-memory database and the given schedule file.
    #[cfg(test)]
    pub async fn fake(schedule_path: impl Into<std::path::PathBuf>) -> Self {
        use crate::config::SessionConfig;

        let db = db::connect_in_memory().await.expect("in-memory db");
        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            schedule_path: schedule_path.into(),
            session: SessionConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                ttl_minutes: 5,
                cookie_secure: false,
            },
        });
        let templates = Arc::new(Templates::new().expect("templates compile"));

        Self {
            db,
            config,
            templates,
        }
    }
}

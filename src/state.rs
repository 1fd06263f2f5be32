use crate::config::AppConfig;
use crate::db;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db = db::connect(&config.database).await?;
        Ok(Self::from_parts(db, Arc::new(config)))
    }

    pub fn from_parts(db: PgPool, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }

    /// State for tests that never reach the database: the pool is lazy and
    /// only fails if a query is actually issued.
    pub fn fake() -> Self {
        let mut config = AppConfig::from_lookup(|_| None).expect("default config is valid");
        config.jwt.secret = "test".into();
        config.jwt.issuer = "test-issuer".into();
        config.jwt.audience = "test-aud".into();
        config.jwt.ttl_minutes = 5;

        let db = db::connect_lazy(&config.database).expect("lazy pool ok");
        Self::from_parts(db, Arc::new(config))
    }
}

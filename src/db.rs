use std::time::Duration;

use anyhow::Context;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};

use crate::config::DatabaseConfig;

const CREATE_USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id            BIGSERIAL PRIMARY KEY,
        email         VARCHAR(255) NOT NULL UNIQUE,
        password_hash VARCHAR(255) NOT NULL
    )
"#;

const CREATE_PROJECTS: &str = r#"
    CREATE TABLE IF NOT EXISTS projects (
        id         BIGSERIAL PRIMARY KEY,
        user_id    BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name       VARCHAR(255) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
"#;

const CREATE_TASKS: &str = r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id         BIGSERIAL PRIMARY KEY,
        project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
        title      VARCHAR(255) NOT NULL,
        status     VARCHAR(16) NOT NULL DEFAULT 'todo'
                   CHECK (status IN ('todo', 'in_progress', 'done'))
    )
"#;

/// Referenced tables come first.
const SCHEMA: [(&str, &str); 3] = [
    ("users", CREATE_USERS),
    ("projects", CREATE_PROJECTS),
    ("tasks", CREATE_TASKS),
];

pub fn connect_options(cfg: &DatabaseConfig) -> anyhow::Result<PgConnectOptions> {
    if let Some(url) = &cfg.url {
        return url.parse::<PgConnectOptions>().context("parse DATABASE_URL");
    }
    Ok(PgConnectOptions::new()
        .host(&cfg.host)
        .port(cfg.port)
        .username(&cfg.user)
        .password(&cfg.password)
        .database(&cfg.name))
}

fn pool_options(cfg: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(30))
}

pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let options = connect_options(cfg)?;
    pool_options(cfg)
        .connect_with(options)
        .await
        .context("connect to database")
}

/// Pool that only dials out on first use.
pub fn connect_lazy(cfg: &DatabaseConfig) -> anyhow::Result<PgPool> {
    Ok(pool_options(cfg).connect_lazy_with(connect_options(cfg)?))
}

pub async fn init_schema(db: &PgPool) -> anyhow::Result<()> {
    for (table, ddl) in SCHEMA {
        sqlx::query(ddl)
            .execute(db)
            .await
            .with_context(|| format!("create table {table}"))?;
        tracing::debug!(table, "table verified");
    }
    tracing::info!("schema verified");
    Ok(())
}

/// Store failure categories the API distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    UniqueViolation,
    ForeignKeyViolation,
    ValueTooLong,
    Other,
}

/// Postgres SQLSTATE codes.
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";

pub fn classify_code(code: &str) -> StoreErrorKind {
    match code {
        UNIQUE_VIOLATION => StoreErrorKind::UniqueViolation,
        FOREIGN_KEY_VIOLATION => StoreErrorKind::ForeignKeyViolation,
        STRING_DATA_RIGHT_TRUNCATION => StoreErrorKind::ValueTooLong,
        _ => StoreErrorKind::Other,
    }
}

pub fn classify(err: &sqlx::Error) -> StoreErrorKind {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .map(|code| classify_code(&code))
            .unwrap_or(StoreErrorKind::Other),
        _ => StoreErrorKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> DatabaseConfig {
        DatabaseConfig {
            url: None,
            host: "localhost".into(),
            port: 5432,
            user: "postgres".into(),
            password: "password123".into(),
            name: "tasks_db".into(),
            max_connections: 10,
        }
    }

    #[test]
    fn classify_maps_sqlstate_codes() {
        assert_eq!(classify_code("23505"), StoreErrorKind::UniqueViolation);
        assert_eq!(classify_code("23503"), StoreErrorKind::ForeignKeyViolation);
        assert_eq!(classify_code("22001"), StoreErrorKind::ValueTooLong);
        assert_eq!(classify_code("42P01"), StoreErrorKind::Other);
    }

    #[test]
    fn non_database_errors_are_other() {
        assert_eq!(classify(&sqlx::Error::RowNotFound), StoreErrorKind::Other);
        assert_eq!(classify(&sqlx::Error::PoolTimedOut), StoreErrorKind::Other);
    }

    #[test]
    fn schema_is_created_in_dependency_order() {
        let order: Vec<&str> = SCHEMA.iter().map(|(t, _)| *t).collect();
        assert_eq!(order, ["users", "projects", "tasks"]);
        assert!(SCHEMA.iter().all(|(_, ddl)| ddl.contains("IF NOT EXISTS")));
    }

    #[test]
    fn url_takes_precedence_over_parts() {
        let mut cfg = local();
        cfg.url = Some("postgres://alice:pw@db.internal:6543/tracker".into());
        let opts = connect_options(&cfg).expect("url should parse");
        assert_eq!(opts.get_host(), "db.internal");
        assert_eq!(opts.get_port(), 6543);
        assert_eq!(opts.get_database(), Some("tracker"));
    }

    #[test]
    fn parts_build_connect_options() {
        let opts = connect_options(&local()).expect("options");
        assert_eq!(opts.get_host(), "localhost");
        assert_eq!(opts.get_port(), 5432);
        assert_eq!(opts.get_username(), "postgres");
        assert_eq!(opts.get_database(), Some("tasks_db"));
    }
}

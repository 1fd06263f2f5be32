//! Shared helpers for router-level tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use taskhub::{app::build_app, config::AppConfig, db, state::AppState};
use tower::ServiceExt;

/// Router over a pool that never connects; only usable for requests that are
/// rejected before reaching the store.
pub fn offline_app() -> (Router, AppState) {
    let state = AppState::fake();
    (build_app(state.clone()), state)
}

/// Router over the database named by `DATABASE_URL` (or the DB_* defaults),
/// with the schema initialized.
pub async fn live_app() -> anyhow::Result<Router> {
    let config = AppConfig::from_env()?;
    let state = AppState::init(config).await?;
    db::init_schema(&state.db).await?;
    Ok(build_app(state))
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    send_raw(app, method, uri, token, body.map(|json| json.to_string())).await
}

/// Like [`send`] but with the body text as given, so it need not be valid JSON.
pub async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<String>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header("authorization", format!("Bearer {t}"));
    }
    let body = match body {
        Some(text) => {
            req = req.header("content-type", "application/json");
            Body::from(text)
        }
        None => Body::empty(),
    };

    let res = app
        .clone()
        .oneshot(req.body(body).expect("request"))
        .await
        .expect("infallible");
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, json)
}

/// Email unique across test runs against the same database.
pub fn unique_email(tag: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    format!("{tag}-{nanos}-{n}@example.com")
}

use taskhub::{app, config::AppConfig, db, state::AppState};

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "taskhub=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET not set; using the development default");
    }

    tracing::info!("connecting to database");
    let state = match AppState::init(config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = ?e, "failed to start server");
            std::process::exit(1);
        }
    };

    if let Err(e) = db::init_schema(&state.db).await {
        tracing::error!(error = ?e, "database initialization failed");
        std::process::exit(1);
    }

    let config = state.config.clone();
    app::serve(app::build_app(state), &config).await
}

use anyhow::Context;
use gym_desk::{build_router, config::Config, db, state::AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ─── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gym_desk=debug,tower_http=info")),
        )
        .init();

    // ─── Config ───────────────────────────────────────────────────────────────
    let config = Config::from_env().context("Failed to load configuration")?;
    let addr = config.server_addr();

    // ─── Database ─────────────────────────────────────────────────────────────
    let db = db::connect(&config.database_url)
        .await
        .context("Failed to open the gym database")?;

    tokio::fs::create_dir_all(&config.receipts_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.receipts_dir.display()))?;

    // ─── App State ────────────────────────────────────────────────────────────
    let state = AppState::new(db, config);
    let app = build_router(state);

    // ─── Start Server ─────────────────────────────────────────────────────────
    info!("Gym Desk listening on http://{}", addr);
    info!("Swagger UI:  http://{}/docs", addr);
    info!("Health:      http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}

use anyhow::{Context, Result};
use folio_backend::{create_router, AppConfig, AppState};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "folio_backend=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::from_env()?;
    tracing::info!("Starting folio testimonial backend");
    tracing::info!("Row store table: {}", config.row_store.table_name);
    if config.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN is not set; moderation endpoints will reject every request");
    }
    if config.rebuild_hook_url.is_none() {
        tracing::info!("No rebuild hook configured; approvals will not trigger a deploy");
    }

    let addr = config.listen_addr();
    let app_state = AppState::new(config)?;
    let app = create_router(app_state);

    tracing::info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}

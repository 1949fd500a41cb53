use ottepg::{create_guide_router, FileScheduleStore, GuideApiDoc, GuideConfig, GuideState};
use ottrelay::{create_relay_router, RelayApiDoc, RelayConfig, RelayState};
use ottserver::ServerBuilder;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // ========== PHASE 1 : Configuration ==========

    let port: u16 = std::env::var("OTTGATE_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);

    let guide_config = GuideConfig::from_env();
    let relay_config = RelayConfig::from_env();

    info!("📺 Schedule source: {}", guide_config.schedule_path.display());

    // ========== PHASE 2 : Stores et routers ==========

    let store = Arc::new(FileScheduleStore::with_ttl(
        guide_config.schedule_path.clone(),
        guide_config.cache_ttl,
    ));

    let guide_state = GuideState::new(store.clone(), guide_config.clone());
    let relay_state = RelayState::new(store, relay_config)?;

    let mut server = ServerBuilder::new("OTTGate")
        .base_url(guide_config.base_url.clone())
        .http_port(port)
        .build();

    server.add_router("/", create_guide_router(guide_state)).await;
    server.add_router("/", create_relay_router(relay_state)).await;
    server.add_openapi(GuideApiDoc::openapi(), "guide").await;
    server.add_openapi(RelayApiDoc::openapi(), "relay").await;

    // ========== PHASE 3 : Démarrage du serveur ==========

    server.start().await;

    info!("✅ OTTGate is ready!");
    info!("Press Ctrl+C to stop...");
    server.wait().await;

    Ok(())
}

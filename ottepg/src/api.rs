//! Guide HTTP API
//!
//! Axum routes for the guide surface: landing page, health check, M3U
//! playlist and XMLTV EPG. The relay route lives in `ottrelay`; both routers
//! share the same `ScheduleProvider`.

use crate::config::GuideConfig;
use crate::guide::render_playlist;
use crate::store::ScheduleProvider;
use crate::xmltv::render_epg;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

/// Shared state for the guide API
#[derive(Clone)]
pub struct GuideState {
    provider: Arc<dyn ScheduleProvider>,
    config: GuideConfig,
}

impl GuideState {
    pub fn new(provider: Arc<dyn ScheduleProvider>, config: GuideConfig) -> Self {
        Self { provider, config }
    }
}

/// Health check payload
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "ok" when the server answers
    pub status: String,
    /// Number of channels in the current schedule snapshot
    pub total_channels: usize,
    /// Server time, RFC 3339 UTC
    pub timestamp: String,
}

/// GET / - Landing page with links to the guide documents
async fn index() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head><title>OTTGate</title></head>
<body style="font-family: Arial; margin: 40px;">
    <h1>OTTGate - Virtual Channel Guide</h1>
    <div><a href="/playlist.m3u">M3U Playlist</a></div>
    <div><a href="/epg.xml">XMLTV EPG</a></div>
    <div><a href="/health">Health</a></div>
</body>
</html>
"#,
    )
}

/// GET /health - Health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    ),
    tag = "Guide"
)]
async fn health(State(state): State<GuideState>) -> Json<HealthResponse> {
    let doc = state.provider.get().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        total_channels: doc.total_channels(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// GET /playlist.m3u - M3U playlist of all channels with programs
#[utoipa::path(
    get,
    path = "/playlist.m3u",
    responses(
        (status = 200, description = "M3U playlist", content_type = "audio/x-mpegurl")
    ),
    tag = "Guide"
)]
async fn playlist(State(state): State<GuideState>) -> impl IntoResponse {
    let doc = state.provider.get().await;
    let body = render_playlist(&doc, &state.config.base_url);

    (
        [
            (header::CONTENT_TYPE, "audio/x-mpegurl"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
}

/// GET /epg.xml - XMLTV guide for all channels
#[utoipa::path(
    get,
    path = "/epg.xml",
    responses(
        (status = 200, description = "XMLTV document", content_type = "application/xml"),
        (status = 500, description = "Guide rendering failed")
    ),
    tag = "Guide"
)]
async fn epg(State(state): State<GuideState>) -> Result<impl IntoResponse, StatusCode> {
    let doc = state.provider.get().await;
    let body = render_epg(
        &doc,
        Utc::now(),
        state.config.placeholder_icon_url.as_deref(),
    )
    .map_err(|e| {
        error!("Failed to render XMLTV guide: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/xml"),
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
        ],
        body,
    ))
}

/// Catch-all for unknown routes
async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

/// OpenAPI documentation for the guide API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "OTTGate Guide API",
        version = "1.0.0",
        description = "M3U playlist, XMLTV EPG and health endpoints"
    ),
    paths(health, playlist, epg),
    components(schemas(HealthResponse)),
    tags(
        (name = "Guide", description = "Guide documents for IPTV players")
    )
)]
pub struct GuideApiDoc;

/// Create the router for the guide API
pub fn create_guide_router(state: GuideState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/playlist.m3u", get(playlist))
        .route("/epg.xml", get(epg))
        .fallback(not_found)
        .with_state(state)
}

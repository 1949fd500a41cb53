//! Stream relay HTTP API
//!
//! `/stream/{channel}` resolves the channel's active event against the
//! schedule, opens the upstream source and relays its realigned TS packets to
//! the client. Resolution misses map to 404/503, upstream failures to
//! 502/504; once headers are out, an upstream failure can only end the
//! response.

use crate::config::RelayConfig;
use crate::fetch::UpstreamFetcher;
use crate::session::RelaySession;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use ottepg::{resolve, ScheduleProvider};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::OpenApi;

/// Shared state for the relay API
#[derive(Clone)]
pub struct RelayState {
    provider: Arc<dyn ScheduleProvider>,
    fetcher: UpstreamFetcher,
}

impl RelayState {
    pub fn new(provider: Arc<dyn ScheduleProvider>, config: RelayConfig) -> anyhow::Result<Self> {
        Ok(Self {
            provider,
            fetcher: UpstreamFetcher::new(config)?,
        })
    }
}

type PlainError = (StatusCode, &'static str);

/// GET|HEAD /stream/{channel} - Relay the channel's current upstream feed
///
/// The channel segment accepts an optional `.ts` suffix. HEAD answers with
/// the streaming headers and an empty body without touching the upstream.
#[utoipa::path(
    get,
    path = "/stream/{channel}",
    params(
        ("channel" = String, Path, description = "Channel name or id, optional .ts suffix")
    ),
    responses(
        (status = 200, description = "Live MPEG-TS relay", content_type = "video/mp2t"),
        (status = 404, description = "Unknown channel or no active event"),
        (status = 503, description = "No stream source resolvable for this channel"),
        (status = 502, description = "Upstream rejected or unreachable"),
        (status = 504, description = "Upstream timed out")
    ),
    tag = "Relay"
)]
async fn stream_channel(
    State(state): State<RelayState>,
    Path(channel): Path<String>,
    method: Method,
    headers: HeaderMap,
) -> std::result::Result<Response, PlainError> {
    let ident = channel.strip_suffix(".ts").unwrap_or(&channel);

    let doc = state.provider.get().await;
    let resolution = resolve(&doc, ident, Utc::now(), None).ok_or_else(|| {
        warn!("Stream request for unknown channel {:?}", ident);
        (StatusCode::NOT_FOUND, "Channel not found")
    })?;

    let event = resolution
        .event
        .as_ref()
        .ok_or((StatusCode::NOT_FOUND, "No active event"))?;

    if method == Method::HEAD {
        return Ok(streaming_response(Body::empty()));
    }

    let source_url = resolution.source_url.as_deref().ok_or_else(|| {
        warn!(
            "No stream source resolvable for {} ({})",
            resolution.channel_name, resolution.channel_id
        );
        (StatusCode::SERVICE_UNAVAILABLE, "No stream source available")
    })?;

    info!(
        "{} -> {} ({})",
        resolution.channel_name,
        event.program_name,
        if event.is_placeholder {
            "gap filler, using fallback source"
        } else {
            "scheduled event"
        }
    );

    let range = headers.get(header::RANGE).and_then(|v| v.to_str().ok());
    let upstream = state.fetcher.fetch(source_url, range).await.map_err(|e| {
        error!("Failed to open upstream for {}: {}", resolution.channel_name, e);
        (e.client_status(), "Upstream unavailable")
    })?;

    let session = RelaySession::new(resolution.channel_name.clone(), upstream);
    Ok(streaming_response(Body::from_stream(session)))
}

/// Response headers shared by GET and HEAD on the stream route
fn streaming_response(body: Body) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("video/mp2t"));
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("none"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );

    (StatusCode::OK, headers, body).into_response()
}

/// OpenAPI documentation for the relay API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "OTTGate Relay API",
        version = "1.0.0",
        description = "Live MPEG-TS relay for virtual channels"
    ),
    paths(stream_channel),
    tags(
        (name = "Relay", description = "Upstream stream relay")
    )
)]
pub struct RelayApiDoc;

/// Create the router for the relay API
pub fn create_relay_router(state: RelayState) -> Router {
    Router::new()
        .route("/stream/{channel}", get(stream_channel))
        .with_state(state)
}

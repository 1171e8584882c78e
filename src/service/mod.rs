//! HTTP surface of the mood analysis service.
//!
//! Routes:
//!
//! - `POST /analyze-mood`: `{"entryText": "..."}` in, a [`MoodAnalysis`] out
//! - `OPTIONS /analyze-mood`: CORS preflight, empty body
//! - `GET /health`: liveness
//!
//! Every failure is answered with `500 {"error": "<message>"}` and every
//! response carries the CORS headers browsers need to call the service directly.

use crate::ai::MoodGateway;
use crate::analysis::MoodAnalysis;
use crate::config::Config;
use crate::constants::{ANALYZE_MOOD_PATH, CORS_ALLOW_HEADERS, ENV_VAR_AI_API_KEY};
use crate::errors::{AIError, AppError, AppResult};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ServiceState {
    gateway: Arc<MoodGateway>,
}

impl ServiceState {
    pub fn new(gateway: MoodGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnalyzeMoodRequest {
    #[serde(rename = "entryText")]
    entry_text: String,
}

/// Any analysis failure, rendered as `500 {"error": ...}`.
#[derive(Debug)]
pub struct ServiceError(AIError);

impl From<AIError> for ServiceError {
    fn from(err: AIError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        error!("Error in analyze-mood: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

/// Builds the service router.
///
/// Entries have no length ceiling, so the analyze route buffers bodies of any size.
pub fn router(state: ServiceState) -> Router {
    Router::new()
        .route(
            ANALYZE_MOOD_PATH,
            post(analyze_mood)
                .options(preflight)
                .layer(DefaultBodyLimit::disable()),
        )
        .route("/health", get(health))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn analyze_mood(
    State(state): State<ServiceState>,
    body: Bytes,
) -> Result<Json<MoodAnalysis>, ServiceError> {
    let request: AnalyzeMoodRequest = serde_json::from_slice(&body)
        .map_err(|e| AIError::InvalidRequest(e.to_string()))?;

    if request.entry_text.trim().is_empty() {
        return Err(AIError::InvalidRequest("entryText cannot be empty".to_string()).into());
    }

    debug!("Analyzing entry of {} bytes", request.entry_text.len());
    let analysis = state.gateway.analyze(&request.entry_text).await?;
    Ok(Json(analysis))
}

/// Runs the service until Ctrl-C.
///
/// # Errors
///
/// Returns `AppError::Config` for an unparseable bind address and
/// `AppError::Io` if the socket cannot be bound or the server fails.
pub async fn serve(config: &Config) -> AppResult<()> {
    let addr: SocketAddr = config.bind_addr.parse().map_err(|e| {
        AppError::Config(format!("Invalid bind address '{}': {}", config.bind_addr, e))
    })?;

    if config.ai_api_key.is_none() {
        warn!(
            "{} is not set; analysis requests will fail until it is configured",
            ENV_VAR_AI_API_KEY
        );
    }

    let gateway = MoodGateway::from_config(config);
    info!("Using model {}", gateway.model());

    let listener = TcpListener::bind(addr).await?;
    info!(
        "Mood analysis service listening on http://{}{}",
        listener.local_addr()?,
        ANALYZE_MOOD_PATH
    );

    axum::serve(listener, router(ServiceState::new(gateway)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Service shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down");
}

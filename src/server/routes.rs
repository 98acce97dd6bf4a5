//! Axum route handlers for the simulation server.
//!
//! # Routes
//!
//! - `GET  /health`      - Returns `{"status": "ok", "version": "..."}`
//! - `GET  /agents`      - Persona catalog plus model-type distribution
//! - `GET  /agents/:id`  - One persona (catalog or latest run's synthetic)
//! - `GET  /simulate`    - Same catalog as `/agents`
//! - `POST /simulate`    - Run a simulation, streaming `data: <json>\n\n` frames

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::simulation::{frame, SimulationRequest, SimulationService};

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SimulationService>,
}

impl AppState {
    pub fn new(service: SimulationService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl From<Arc<SimulationService>> for AppState {
    fn from(service: Arc<SimulationService>) -> Self {
        Self { service }
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/agents", get(list_agents_handler))
        .route("/agents/:id", get(get_agent_handler))
        .route("/simulate", get(list_agents_handler).post(simulate_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(serde_json::json!({ "error": message.into() })))
}

/// GET /health - liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "agentsphere",
    }))
}

/// GET /agents - the base persona catalog.
async fn list_agents_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "agents": state.service.agents(),
        "distribution": state.service.distribution(),
    }))
}

/// GET /agents/:id
async fn get_agent_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .service
        .agent_by_id(&id)
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Agent '{id}' not found")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimulateBody {
    #[serde(default)]
    post_content: Option<String>,
    #[serde(default)]
    scale: Option<String>,
    #[serde(default)]
    post_id: Option<String>,
}

impl SimulateBody {
    fn into_request(self) -> Option<SimulationRequest> {
        let content = self.post_content.filter(|c| !c.trim().is_empty())?;
        let tier = self.scale.filter(|s| !s.trim().is_empty())?;
        let request = SimulationRequest::new(content, tier);
        Some(match self.post_id.filter(|p| !p.trim().is_empty()) {
            Some(post_id) => request.with_post_id(post_id),
            None => request,
        })
    }
}

/// POST /simulate - start a run and stream its events.
///
/// Request: `{ "postContent": string, "scale": string, "postId"?: string }`
///
/// The body is a long-lived `text/plain` stream of `data: <json>\n\n`
/// frames: `start`, one bare reaction per participant, then `complete` or
/// `error`.
async fn simulate_handler(
    State(state): State<AppState>,
    body: Result<Json<SimulateBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    const MISSING: &str = "Missing required fields: postContent and scale";

    let Json(body) = body.map_err(|e| {
        tracing::debug!(error = %e, "rejecting simulate request body");
        api_error(StatusCode::BAD_REQUEST, MISSING)
    })?;
    let request = body
        .into_request()
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, MISSING))?;

    tracing::info!(tier = %request.tier, "simulation requested");
    let rx = state.service.clone().stream(request);
    let frames = futures::stream::unfold(rx, |mut rx| async move {
        rx.recv()
            .await
            .map(|event| (Ok::<_, Infallible>(frame(&event)), rx))
    });

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(frames),
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

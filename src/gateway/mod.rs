//! HTTP gateway (Axum) over the matching engine.
//!
//! Used by the `affinity` server binary; every route is a thin adapter onto
//! [`MatchEngine`](crate::engine::MatchEngine).

pub mod error;
pub mod handler;
pub mod state;

#[cfg(test)]
mod handler_tests;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{
    create_arm_handler, export_pool_handler, get_arm_handler, import_pool_handler, match_handler,
    record_outcome_handler, select_arm_handler,
};
pub use state::HandlerState;

/// Response header carrying a short machine-readable status.
pub const AFFINITY_STATUS_HEADER: &str = "x-affinity-status";

pub const AFFINITY_STATUS_HEALTHY: &str = "healthy";
pub const AFFINITY_STATUS_READY: &str = "ready";
pub const AFFINITY_STATUS_DEGRADED: &str = "degraded";
pub const AFFINITY_STATUS_ERROR: &str = "error";

pub fn create_router_with_state(state: HandlerState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/v1/match", post(match_handler))
        .route("/v1/arms", post(create_arm_handler))
        .route("/v1/arms/select", post(select_arm_handler))
        .route("/v1/arms/{id}", get(get_arm_handler))
        .route("/v1/arms/{id}/outcome", post(record_outcome_handler))
        .route("/v1/pool/export", get(export_pool_handler))
        .route("/v1/pool/import", post(import_pool_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub storage: &'static str,
    pub durability: &'static str,
    pub embedder_mode: &'static str,
    pub arms: usize,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        AFFINITY_STATUS_HEADER,
        HeaderValue::from_static(AFFINITY_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

/// Ready while not shutting down. Degraded durability is reported but does
/// not fail readiness: the pool keeps serving from memory.
#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<HandlerState>) -> Response {
    let storage_status = if state.lifecycle.is_none() {
        "disabled"
    } else if state.storage_path.is_dir() {
        AFFINITY_STATUS_READY
    } else {
        "pending"
    };

    let durability = if state.lifecycle.is_none() {
        "disabled"
    } else if state.is_durability_degraded() {
        AFFINITY_STATUS_DEGRADED
    } else {
        AFFINITY_STATUS_READY
    };

    let components = ComponentStatus {
        http: AFFINITY_STATUS_READY,
        storage: storage_status,
        durability,
        embedder_mode: state.engine.embedder_mode(),
        arms: state.engine.pool().len(),
    };

    let is_ready = !state.is_shutting_down();
    let status_code = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let status_msg = match (is_ready, durability) {
        (false, _) => "shutting_down",
        (true, AFFINITY_STATUS_DEGRADED) => AFFINITY_STATUS_DEGRADED,
        (true, _) => "ok",
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        AFFINITY_STATUS_HEADER,
        HeaderValue::from_str(status_msg)
            .unwrap_or(HeaderValue::from_static(AFFINITY_STATUS_ERROR)),
    );

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}

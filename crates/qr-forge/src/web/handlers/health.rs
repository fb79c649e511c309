//! Health check HTTP handlers

use axum::{
    extract::State,
    http::{Method, Uri},
    response::IntoResponse,
};

use crate::web::{
    AppState,
    extractors::RequestContext,
    responses::{HealthResponse, ok},
    utils::log_request,
};

/// Health check endpoint
///
/// Returns application status together with artifact store statistics
pub async fn health_check(
    State(state): State<AppState>,
    context: RequestContext,
) -> impl IntoResponse {
    log_request(&Method::GET, &Uri::from_static("/health"), &context);

    let store = state.pipeline.store().stats().await;
    let uptime_seconds = (chrono::Utc::now() - state.start_time).num_seconds();

    ok(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        store,
    })
}

/// Readiness check (for Kubernetes probes)
pub async fn readiness_check(context: RequestContext) -> impl IntoResponse {
    log_request(&Method::GET, &Uri::from_static("/ready"), &context);

    ok(serde_json::json!({
        "status": "ready",
        "timestamp": chrono::Utc::now()
    }))
}

/// Liveness check (for Kubernetes probes)
pub async fn liveness_check(context: RequestContext) -> impl IntoResponse {
    log_request(&Method::GET, &Uri::from_static("/live"), &context);

    ok(serde_json::json!({
        "status": "alive",
        "timestamp": chrono::Utc::now()
    }))
}

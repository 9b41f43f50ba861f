//! Health check endpoints
//!
//! Provides liveness and readiness probes for monitoring.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};

use crate::http::AppState;

/// Health check router
pub fn create_health_router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/readyz", get(readiness_check))
}

/// Basic health check (always returns OK if server is running)
pub async fn health_check() -> impl IntoResponse {
    "OK"
}

/// Readiness check: verifies the database pool answers
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.pool)
        .await
    {
        Ok(_) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::warn!(error = %e, "readiness probe failed");
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
    }
}

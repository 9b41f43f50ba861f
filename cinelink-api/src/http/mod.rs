// Module: http
// HTTP/JSON REST API for source resolution, curation, and report intake

pub mod error;
pub mod health;
pub mod middleware;
pub mod sources;

#[cfg(test)]
mod tests;

use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use cinelink_core::repository::UserStore;
use cinelink_core::service::{JwtService, ReportService, SourceResolver, SourceService};

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<SourceResolver>,
    pub source_service: Arc<SourceService>,
    pub report_service: Arc<ReportService>,
    pub users: Arc<dyn UserStore>,
    pub jwt_service: JwtService,
    pub pool: sqlx::PgPool,
}

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoints (for monitoring probes)
        .merge(health::create_health_router())
        // Source resolution (public)
        .route(
            "/api/sources/{media_type}/{media_id}",
            get(sources::get_sources_by_media),
        )
        // Curated source management (operator)
        .route("/api/sources", post(sources::create_source))
        .route("/api/sources/{source_id}", patch(sources::update_source))
        // Report intake (public) and moderation listing (operator)
        .route(
            "/api/sources/{source_id}/reports",
            post(sources::create_report),
        )
        .route("/api/sources/reports/open", get(sources::get_open_reports))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub mod access;
pub mod health;
pub mod index;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

/// Room for the non-file form fields and multipart framing on top of the file limit.
const FORM_OVERHEAD_BYTES: usize = 256 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + FORM_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(index::index_handler))
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/analysis-types",
            get(handlers::handle_analysis_types),
        )
        .route("/api/v1/analyze", post(handlers::handle_analyze))
        .route(
            "/api/v1/credentials/reload",
            post(health::reload_credentials_handler),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            access::require_allowed_host,
        ))
        .with_state(state)
}

use axum::{
    extract::{Request, State},
    http::header::HOST,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

/// Rejects requests whose Host header does not end with the configured suffix.
///
/// No suffix configured, or no Host header on the request, lets the request through.
pub async fn require_allowed_host(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(suffix) = &state.config.allowed_host_suffix {
        let host = request
            .headers()
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if !host.is_empty() && !host_allowed(host, suffix) {
            warn!(host, "Rejected request from disallowed host");
            return Err(AppError::Forbidden(format!(
                "Access denied: This application can only be accessed from {suffix} domains"
            )));
        }
    }

    Ok(next.run(request).await)
}

/// Compares the host without its port, case-insensitively.
fn host_allowed(host: &str, suffix: &str) -> bool {
    let name = match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    };
    name.to_ascii_lowercase()
        .ends_with(&suffix.to_ascii_lowercase())
}

use axum::{extract::State, Json};
use serde_json::{json, Map, Value};

use crate::credentials::CredentialStore;
use crate::llm_client::Provider;
use crate::state::AppState;

/// Which providers have a cached API key. Never includes the keys.
fn provider_status(credentials: &CredentialStore) -> Value {
    let status: Map<String, Value> = Provider::ALL
        .into_iter()
        .map(|p| (p.name().to_string(), Value::Bool(credentials.is_cached(p))))
        .collect();
    Value::Object(status)
}

/// GET /health
/// Returns a simple status object with service version and provider availability.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "contract-analyzer",
        "providers": provider_status(state.dispatcher.credentials()),
    }))
}

/// POST /api/v1/credentials/reload
/// Drops cached API keys and resolves them again from the configured sources.
pub async fn reload_credentials_handler(State(state): State<AppState>) -> Json<Value> {
    let credentials = state.dispatcher.credentials();
    credentials.invalidate();
    credentials.preload();
    Json(json!({ "providers": provider_status(credentials) }))
}

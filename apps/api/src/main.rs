mod analysis;
mod config;
mod credentials;
mod errors;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::templates::TemplateRegistry;
use crate::config::Config;
use crate::credentials::{default_sources, CredentialStore};
use crate::llm_client::Dispatcher;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Contract Analyzer v{}", env!("CARGO_PKG_VERSION"));

    let templates = TemplateRegistry::builtin().context("Built-in prompt templates are invalid")?;
    info!("Loaded {} analysis templates", templates.labels().len());

    // Resolve provider keys once up front; later lookups hit the cache.
    let credentials = Arc::new(CredentialStore::new(default_sources(
        &config.env_file,
        &config.secrets_file,
    )));
    credentials.preload();

    let dispatcher = Dispatcher::from_config(&config, credentials)?;
    info!("Default model: {}", config.default_model);

    let state = AppState {
        config: config.clone(),
        templates: Arc::new(templates),
        dispatcher,
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}

use std::sync::Arc;

use crate::analysis::templates::TemplateRegistry;
use crate::config::Config;
use crate::llm_client::Dispatcher;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Read-only prompt templates, validated at startup.
    pub templates: Arc<TemplateRegistry>,
    pub dispatcher: Dispatcher,
}

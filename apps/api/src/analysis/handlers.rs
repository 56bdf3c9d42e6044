//! Axum route handlers for the Analysis API.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::analysis::ingest::extract_text;
use crate::analysis::pipeline::{run_analysis, AnalysisReport, AnalysisRequest};
use crate::analysis::prompts::{DEFAULT_INSTRUCTIONS, REAL_ESTATE_SALE_REVIEW};
use crate::errors::AppError;
use crate::llm_client::CallParams;
use crate::state::AppState;

pub const MISSING_FILE_MESSAGE: &str = "Please upload a PDF file first.";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AnalysisTypesResponse {
    pub analysis_types: Vec<String>,
    pub default_analysis_type: &'static str,
    pub default_instructions: &'static str,
    pub default_model: String,
}

/// Fields collected from the multipart upload form.
#[derive(Debug, Default)]
struct AnalyzeForm {
    file: Option<Bytes>,
    instructions: Option<String>,
    analysis_type: Option<String>,
    custom_query: Option<String>,
    model: Option<String>,
    temperature: Option<String>,
    max_tokens: Option<String>,
    options: Option<String>,
}

impl AnalyzeForm {
    async fn read(multipart: &mut Multipart, max_upload_bytes: usize) -> Result<Self, AppError> {
        let mut form = AnalyzeForm::default();

        let upload_error = move |e: MultipartError| multipart_error(e, max_upload_bytes);

        while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let data = field.bytes().await.map_err(upload_error)?;
                if data.len() > max_upload_bytes {
                    return Err(too_large(max_upload_bytes));
                }
                form.file = Some(data);
                continue;
            }

            let text = field.text().await.map_err(upload_error)?;
            let text = Some(text).filter(|t| !t.trim().is_empty());
            match name.as_str() {
                "instructions" => form.instructions = text,
                "analysis_type" => form.analysis_type = text,
                "custom_query" => form.custom_query = text,
                "model" => form.model = text,
                "temperature" => form.temperature = text,
                "max_tokens" => form.max_tokens = text,
                "options" => form.options = text,
                _ => {}
            }
        }

        Ok(form)
    }

    fn call_params(&self, state: &AppState) -> Result<CallParams, AppError> {
        let config = &state.config;
        let mut params = CallParams::new(
            self.model
                .as_deref()
                .map(str::trim)
                .unwrap_or(&config.default_model),
        );
        params.temperature = match &self.temperature {
            Some(t) => t
                .trim()
                .parse()
                .map_err(|_| AppError::Validation(format!("Invalid temperature '{t}'")))?,
            None => config.temperature,
        };
        params.max_tokens = match &self.max_tokens {
            Some(t) => t
                .trim()
                .parse()
                .map_err(|_| AppError::Validation(format!("Invalid max_tokens '{t}'")))?,
            None => config.max_tokens,
        };
        if let Some(raw) = &self.options {
            params.extra = serde_json::from_str::<Map<String, Value>>(raw).map_err(|e| {
                AppError::Validation(format!("options must be a JSON object: {e}"))
            })?;
        }
        Ok(params)
    }
}

/// Bodies cut off by the router's body limit surface here as 413 stream errors.
fn multipart_error(e: MultipartError, max_upload_bytes: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large(max_upload_bytes)
    } else {
        AppError::Validation(format!("Invalid upload: {}", e.body_text()))
    }
}

fn too_large(max_upload_bytes: usize) -> AppError {
    AppError::PayloadTooLarge(format!(
        "The uploaded file exceeds the {}MB size limit. Please upload a smaller file.",
        max_upload_bytes.div_ceil(1024 * 1024)
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/analysis-types
pub async fn handle_analysis_types(State(state): State<AppState>) -> Json<AnalysisTypesResponse> {
    Json(AnalysisTypesResponse {
        analysis_types: state
            .templates
            .labels()
            .into_iter()
            .map(String::from)
            .collect(),
        default_analysis_type: REAL_ESTATE_SALE_REVIEW,
        default_instructions: DEFAULT_INSTRUCTIONS,
        default_model: state.config.default_model.clone(),
    })
}

/// POST /api/v1/analyze
///
/// Multipart form: `file` (PDF, required), `instructions`, `analysis_type`,
/// `custom_query`, `model`, `temperature`, `max_tokens`, `options` (JSON object).
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisReport>, AppError> {
    let mut form = AnalyzeForm::read(&mut multipart, state.config.max_upload_bytes).await?;
    let file = form
        .file
        .take()
        .ok_or_else(|| AppError::Validation(MISSING_FILE_MESSAGE.to_string()))?;
    let params = form.call_params(&state)?;
    info!("Received upload of {} bytes", file.len());

    let content = tokio::task::spawn_blocking(move || extract_text(&file))
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    let request = AnalysisRequest {
        analysis_type: form
            .analysis_type
            .unwrap_or_else(|| REAL_ESTATE_SALE_REVIEW.to_string()),
        content,
        instructions: form
            .instructions
            .unwrap_or_else(|| DEFAULT_INSTRUCTIONS.to_string()),
        custom_query: form.custom_query,
    };

    let report = run_analysis(&state.templates, &state.dispatcher, &request, &params).await?;
    Ok(Json(report))
}

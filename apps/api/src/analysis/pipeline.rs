use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::analysis::templates::TemplateRegistry;
use crate::errors::AppError;
use crate::llm_client::{CallParams, Dispatcher, Provider};

pub const EMPTY_DOCUMENT_MESSAGE: &str =
    "Could not extract text from the PDF. Please check the file.";

/// One user-initiated analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub analysis_type: String,
    /// Extracted document text.
    pub content: String,
    pub instructions: String,
    pub custom_query: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    pub analysis_type: String,
    pub provider: Provider,
    pub model: String,
    pub completed_at: DateTime<Utc>,
    pub analysis: String,
}

/// Formats the prompt for `request` and sends it to the model in `params`.
///
/// Refuses to call the model when the document produced no text.
#[instrument(skip_all, fields(analysis_type = %request.analysis_type, model = %params.model))]
pub async fn run_analysis(
    templates: &TemplateRegistry,
    dispatcher: &Dispatcher,
    request: &AnalysisRequest,
    params: &CallParams,
) -> Result<AnalysisReport, AppError> {
    if request.content.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(EMPTY_DOCUMENT_MESSAGE.to_string()));
    }

    let extra = HashMap::from([("instructions", request.instructions.as_str())]);
    let prompt = templates.format(
        &request.analysis_type,
        &request.content,
        request.custom_query.as_deref(),
        &extra,
    )?;

    let completion = dispatcher.dispatch(&prompt, params).await?;

    let report = AnalysisReport {
        analysis_id: Uuid::new_v4(),
        analysis_type: request.analysis_type.clone(),
        provider: completion.provider,
        model: completion.model,
        completed_at: Utc::now(),
        analysis: completion.text,
    };
    info!(analysis_id = %report.analysis_id, "Analysis completed");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::prompts::{REAL_ESTATE_SALE_REVIEW, RISK_ASSESSMENT};
    use crate::llm_client::testing::{seeded_credentials, MockProvider};
    use crate::llm_client::{ErrorKind, LlmError};

    fn request(analysis_type: &str, content: &str) -> AnalysisRequest {
        AnalysisRequest {
            analysis_type: analysis_type.to_string(),
            content: content.to_string(),
            instructions: "focus on termination".to_string(),
            custom_query: None,
        }
    }

    #[tokio::test]
    async fn test_prompt_reaches_provider() {
        let openai = MockProvider::replying("Looks balanced.");
        let dispatcher = Dispatcher::new(
            seeded_credentials(),
            openai.clone(),
            MockProvider::replying("unused"),
        );
        let templates = TemplateRegistry::builtin().unwrap();

        let report = run_analysis(
            &templates,
            &dispatcher,
            &request(RISK_ASSESSMENT, "Clause A\n\nClause B"),
            &CallParams::new("gpt-4o"),
        )
        .await
        .unwrap();

        assert_eq!(report.analysis, "Looks balanced.");
        assert_eq!(report.provider, Provider::OpenAi);
        assert_eq!(report.analysis_type, RISK_ASSESSMENT);

        let prompt = openai.last_prompt().unwrap();
        assert!(prompt.contains("Clause A\n\nClause B"));
        assert!(prompt.contains("focus on termination"));
    }

    #[tokio::test]
    async fn test_default_analysis_type_receives_instructions() {
        let openai = MockProvider::replying("ok");
        let dispatcher = Dispatcher::new(
            seeded_credentials(),
            openai.clone(),
            MockProvider::replying("unused"),
        );
        let templates = TemplateRegistry::builtin().unwrap();

        run_analysis(
            &templates,
            &dispatcher,
            &request(REAL_ESTATE_SALE_REVIEW, "Contrato"),
            &CallParams::new("gpt-4o"),
        )
        .await
        .unwrap();

        assert!(openai.last_prompt().unwrap().contains("focus on termination"));
    }

    #[tokio::test]
    async fn test_empty_content_is_refused_before_dispatch() {
        let openai = MockProvider::replying("unused");
        let dispatcher = Dispatcher::new(
            seeded_credentials(),
            openai.clone(),
            MockProvider::replying("unused"),
        );
        let templates = TemplateRegistry::builtin().unwrap();

        let err = run_analysis(
            &templates,
            &dispatcher,
            &request(RISK_ASSESSMENT, "  \n "),
            &CallParams::new("gpt-4o"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::UnprocessableEntity(_)));
        assert_eq!(openai.calls(), 0);
    }

    #[tokio::test]
    async fn test_provider_error_is_propagated() {
        let anthropic = MockProvider::failing(LlmError::empty_response());
        let dispatcher = Dispatcher::new(
            seeded_credentials(),
            MockProvider::replying("unused"),
            anthropic.clone(),
        );
        let templates = TemplateRegistry::builtin().unwrap();

        let err = run_analysis(
            &templates,
            &dispatcher,
            &request("Something Else", "Body"),
            &CallParams::new("claude-3-haiku-20240307"),
        )
        .await
        .unwrap_err();

        match err {
            AppError::Llm(e) => assert_eq!(e.kind, ErrorKind::EmptyResponse),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(anthropic.calls(), 1);
    }
}

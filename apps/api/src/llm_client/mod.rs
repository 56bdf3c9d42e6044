/// LLM Client: the single point of entry for all model provider calls.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// All LLM interactions MUST go through `Dispatcher::dispatch`.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::credentials::CredentialStore;

pub mod anthropic;
pub mod openai;
pub mod prompts;
pub mod provider;

pub use provider::{ModelSpec, Provider};

/// Request body keys owned by the provider calls; extra options may not override them.
const RESERVED_OPTION_KEYS: &[&str] = &["model", "messages", "temperature", "max_tokens"];

/// The failure categories a caller can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingCredential,
    UnsupportedModel,
    InvalidParameters,
    ProviderCall,
    EmptyResponse,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::MissingCredential => "MISSING_CREDENTIAL",
            ErrorKind::UnsupportedModel => "UNSUPPORTED_MODEL",
            ErrorKind::InvalidParameters => "INVALID_PARAMETERS",
            ErrorKind::ProviderCall => "PROVIDER_ERROR",
            ErrorKind::EmptyResponse => "EMPTY_RESPONSE",
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: ErrorKind,
    pub message: String,
}

pub type LlmResult<T> = Result<T, LlmError>;

impl LlmError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn missing_credential(provider: Provider) -> Self {
        Self::new(
            ErrorKind::MissingCredential,
            format!(
                "{provider} API key not found. Please set {} in the environment, the .env file or the secrets file.",
                provider.api_key_env()
            ),
        )
    }

    pub fn unsupported_model(identifier: &str) -> Self {
        Self::new(
            ErrorKind::UnsupportedModel,
            format!("Unsupported model '{identifier}'"),
        )
    }

    pub fn empty_response() -> Self {
        Self::new(
            ErrorKind::EmptyResponse,
            "No response content from the model.",
        )
    }

    pub fn provider_call(provider: Provider, detail: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorKind::ProviderCall,
            format!("{provider} API error: {detail}"),
        )
    }

    /// Text shown in the result slot, keeping the "Error:" prefix convention.
    pub fn display_text(&self) -> String {
        format!("Error: {}", self.message)
    }
}

/// Parameters for a single model call.
#[derive(Debug, Clone)]
pub struct CallParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Provider-specific options merged verbatim into the request body.
    pub extra: Map<String, Value>,
}

impl CallParams {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.7,
            max_tokens: 2000,
            extra: Map::new(),
        }
    }

    pub fn validate(&self) -> LlmResult<()> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(LlmError::new(
                ErrorKind::InvalidParameters,
                format!(
                    "Temperature must be between 0.0 and 1.0, got {}",
                    self.temperature
                ),
            ));
        }
        if self.max_tokens == 0 {
            return Err(LlmError::new(
                ErrorKind::InvalidParameters,
                "Max tokens must be greater than 0",
            ));
        }
        if let Some(key) = self
            .extra
            .keys()
            .find(|k| RESERVED_OPTION_KEYS.contains(&k.as_str()))
        {
            return Err(LlmError::new(
                ErrorKind::InvalidParameters,
                format!("Option '{key}' cannot be overridden"),
            ));
        }
        Ok(())
    }
}

/// A successful model response.
#[derive(Debug, Clone)]
pub struct Completion {
    pub provider: Provider,
    pub model: String,
    pub text: String,
}

/// One provider's completion capability.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
        params: &CallParams,
    ) -> LlmResult<String>;
}

/// Routes prompts to the provider that serves the requested model.
#[derive(Clone)]
pub struct Dispatcher {
    credentials: Arc<CredentialStore>,
    openai: Arc<dyn CompletionProvider>,
    anthropic: Arc<dyn CompletionProvider>,
}

impl Dispatcher {
    pub fn new(
        credentials: Arc<CredentialStore>,
        openai: Arc<dyn CompletionProvider>,
        anthropic: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            credentials,
            openai,
            anthropic,
        }
    }

    /// Builds the HTTP-backed providers from configuration.
    pub fn from_config(config: &Config, credentials: Arc<CredentialStore>) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let openai = openai::OpenAiClient::new(&config.openai_api_base, timeout)?;
        let anthropic = anthropic::AnthropicClient::new(&config.anthropic_api_base, timeout)?;
        info!(
            openai_base = %config.openai_api_base,
            anthropic_base = %config.anthropic_api_base,
            "LLM providers initialized"
        );
        Ok(Self::new(credentials, Arc::new(openai), Arc::new(anthropic)))
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    fn client(&self, provider: Provider) -> &dyn CompletionProvider {
        match provider {
            Provider::OpenAi => self.openai.as_ref(),
            Provider::Anthropic => self.anthropic.as_ref(),
        }
    }

    /// Sends one prompt to the model named in `params.model`.
    ///
    /// Unsupported models, invalid parameters and missing credentials are
    /// reported without contacting any provider.
    pub async fn dispatch(&self, prompt: &str, params: &CallParams) -> LlmResult<Completion> {
        let result = self.try_dispatch(prompt, params).await;
        if let Err(e) = &result {
            error!(kind = ?e.kind, model = %params.model, "LLM call failed: {e}");
        }
        result
    }

    async fn try_dispatch(&self, prompt: &str, params: &CallParams) -> LlmResult<Completion> {
        let spec = ModelSpec::parse(&params.model)?;
        params.validate()?;

        let api_key = self.credentials.resolve(spec.provider.name());
        if api_key.is_empty() {
            return Err(LlmError::missing_credential(spec.provider));
        }

        debug!(
            provider = %spec.provider,
            model = %spec.model,
            prompt_chars = prompt.len(),
            "Dispatching LLM call"
        );

        let text = self
            .client(spec.provider)
            .complete(&api_key, &spec.model, prompt, params)
            .await?;

        debug!(provider = %spec.provider, "LLM call succeeded: {} chars", text.len());

        Ok(Completion {
            provider: spec.provider,
            model: spec.model,
            text,
        })
    }
}

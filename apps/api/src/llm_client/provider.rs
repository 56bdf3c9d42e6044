use std::fmt;

use serde::Serialize;

use crate::llm_client::{LlmError, LlmResult};

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::OpenAi, Provider::Anthropic];

    /// Parse a provider name such as "openai" or "Anthropic".
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "openai" => Some(Provider::OpenAi),
            "anthropic" => Some(Provider::Anthropic),
            _ => None,
        }
    }

    /// The canonical lowercase name, also used as the explicit model prefix.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    /// The environment variable (and secrets key) holding this provider's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Model-name family prefix used when the identifier carries no explicit provider.
    fn model_family(&self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt",
            Provider::Anthropic => "claude",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::OpenAi => write!(f, "OpenAI"),
            Provider::Anthropic => write!(f, "Anthropic"),
        }
    }
}

/// A model identifier resolved to the provider that serves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub provider: Provider,
    pub model: String,
}

impl ModelSpec {
    /// Resolve an identifier once, up front.
    ///
    /// Accepts `openai:<model>` / `anthropic:<model>`, or a bare model name
    /// starting with `gpt` or `claude`.
    pub fn parse(identifier: &str) -> LlmResult<Self> {
        let identifier = identifier.trim();

        if let Some((prefix, model)) = identifier.split_once(':') {
            if let Some(provider) = Provider::from_name(prefix) {
                if model.trim().is_empty() {
                    return Err(LlmError::unsupported_model(identifier));
                }
                return Ok(Self {
                    provider,
                    model: model.trim().to_string(),
                });
            }
        }

        Provider::ALL
            .into_iter()
            .find(|p| identifier.starts_with(p.model_family()))
            .map(|provider| Self {
                provider,
                model: identifier.to_string(),
            })
            .ok_or_else(|| LlmError::unsupported_model(identifier))
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider.name(), self.model)
    }
}

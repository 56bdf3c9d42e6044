//! Anthropic Messages API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::llm_client::{CallParams, CompletionProvider, LlmError, LlmResult, Provider};

pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
const MESSAGES_PATH: &str = "/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<AnthropicMessage<'a>>,
    #[serde(flatten)]
    extra: &'a Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    endpoint: String,
}

impl AnthropicClient {
    pub fn new(api_base: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{MESSAGES_PATH}", api_base.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl CompletionProvider for AnthropicClient {
    async fn complete(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
        params: &CallParams,
    ) -> LlmResult<String> {
        let request_body = AnthropicRequest {
            model,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
            extra: &params.extra,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::provider_call(Provider::Anthropic, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::provider_call(Provider::Anthropic, e))?;

        if !status.is_success() {
            warn!("Anthropic API returned {status}");
            // Try to parse error message
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::provider_call(
                Provider::Anthropic,
                format!("status {}: {message}", status.as_u16()),
            ));
        }

        let parsed: AnthropicResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::provider_call(Provider::Anthropic, e))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "Anthropic call succeeded: input_tokens={}, output_tokens={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        parsed
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .filter(|text| !text.is_empty())
            .ok_or_else(LlmError::empty_response)
    }
}

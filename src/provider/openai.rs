//! OpenAI-compatible chat completions backend.

use super::error::Error;
use super::http::{AuthConfig, HttpClient};
use super::types::{GenerateRequest, LlmResponse};
use super::LlmClient;
use crate::config::LlmConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const API_KEY_ENV_VARS: &[&str] = &["OPENAI_API_KEY"];
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: usize,
}

/// Client for OpenAI and compatible `/chat/completions` APIs.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: HttpClient,
    model: String,
}

impl OpenAiClient {
    /// Build from config, taking the key from `llm.api_key` or `OPENAI_API_KEY`.
    pub fn from_config(config: &LlmConfig) -> Result<Self, Error> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .find_map(|var| std::env::var(var).ok().filter(|k| !k.is_empty()))
            })
            .ok_or_else(|| Error::MissingApiKey {
                backend: "OpenAI".to_string(),
                env_vars: API_KEY_ENV_VARS.iter().map(|s| (*s).to_string()).collect(),
            })?;

        let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let http = HttpClient::new(
            base_url,
            AuthConfig::Bearer(api_key),
            Duration::from_secs(config.timeout),
        )
        .with_max_retries(config.max_retries);

        Ok(Self {
            http,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn id(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<LlmResponse, Error> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system_prompt.as_deref().filter(|s| !s.is_empty()) {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        let body = ChatCompletionRequest {
            model: request.model.as_deref().unwrap_or(&self.model),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response: ChatCompletionResponse =
            self.http.post_json("/chat/completions", &body).await?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Api("Response contained no choices".to_string()))?;

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            model: response.model,
            tokens_used: response.usage.map_or(0, |u| u.total_tokens),
            finish_reason: choice.finish_reason,
        })
    }

    async fn count_tokens(&self, text: &str) -> usize {
        bpe_openai::cl100k_base().count(text)
    }

    async fn health_check(&self) -> bool {
        let healthy = self.http.probe("/models", HEALTH_TIMEOUT).await;
        if !healthy {
            tracing::warn!(base_url = self.http.base_url(), "OpenAI health check failed");
        }
        healthy
    }
}

//! Lexora local LLM gateway backend.
//!
//! Besides completions, Lexora advertises per-model capability tags and can
//! classify a task description, which feeds smart model selection.

use super::error::Error;
use super::http::{AuthConfig, HttpClient};
use super::types::{ClassificationResult, GenerateRequest, LlmResponse, ModelCapability};
use super::{CapabilitySource, LlmClient, estimate_tokens};
use crate::config::LlmConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:8001";
const AUXILIARY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    system_prompt: Option<&'a str>,
    max_tokens: Option<usize>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    content: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    tokens_used: usize,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenizeResponse {
    count: usize,
}

#[derive(Debug, Deserialize)]
struct CapabilitiesResponse {
    #[serde(default)]
    models: Vec<ModelCapability>,
}

/// Client for the Lexora gateway.
#[derive(Debug, Clone)]
pub struct LexoraClient {
    http: HttpClient,
    /// Same base URL without retries, for tokenize/classify calls that have a local fallback.
    auxiliary: HttpClient,
}

impl LexoraClient {
    pub fn from_config(config: &LlmConfig) -> Self {
        let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let auth = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .map_or(AuthConfig::None, AuthConfig::Bearer);

        let http = HttpClient::new(base_url, auth.clone(), Duration::from_secs(config.timeout))
            .with_max_retries(config.max_retries);
        let auxiliary = HttpClient::new(base_url, auth, AUXILIARY_TIMEOUT);

        Self { http, auxiliary }
    }
}

#[async_trait]
impl LlmClient for LexoraClient {
    fn id(&self) -> &str {
        "lexora"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<LlmResponse, Error> {
        let body = CompletionRequest {
            prompt: &request.prompt,
            system_prompt: request.system_prompt.as_deref(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            model: request.model.as_deref(),
        };

        let response: CompletionResponse = self.http.post_json("/v1/completions", &body).await?;

        Ok(LlmResponse {
            content: response.content,
            model: response.model.unwrap_or_else(|| "lexora".to_string()),
            tokens_used: response.tokens_used,
            finish_reason: response.finish_reason,
        })
    }

    async fn count_tokens(&self, text: &str) -> usize {
        match self
            .auxiliary
            .post_json::<_, TokenizeResponse>("/v1/tokenize", &TextBody { text })
            .await
        {
            Ok(response) => response.count,
            Err(e) => {
                tracing::debug!(error = %e, "Tokenize endpoint unavailable, estimating tokens");
                estimate_tokens(text)
            }
        }
    }

    async fn health_check(&self) -> bool {
        let healthy = self.http.probe("/health", AUXILIARY_TIMEOUT).await;
        if !healthy {
            tracing::warn!(base_url = self.http.base_url(), "Lexora health check failed");
        }
        healthy
    }

    fn capabilities(&self) -> Option<Arc<dyn CapabilitySource>> {
        Some(Arc::new(self.clone()))
    }
}

#[async_trait]
impl CapabilitySource for LexoraClient {
    async fn get_capabilities(&self, force_refresh: bool) -> Result<Vec<ModelCapability>, Error> {
        tracing::debug!(force_refresh, "Fetching model capabilities from Lexora");
        let response: CapabilitiesResponse =
            self.auxiliary.get_json("/v1/models/capabilities").await?;
        Ok(response.models)
    }

    async fn classify_task(&self, preview: &str) -> Result<Option<ClassificationResult>, Error> {
        let result: ClassificationResult = self
            .auxiliary
            .post_json("/v1/classify", &TextBody { text: preview })
            .await?;
        Ok(Some(result))
    }
}

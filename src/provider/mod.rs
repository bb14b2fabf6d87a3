//! LLM provider abstraction.
//!
//! Every backend implements [`LlmClient`]. Gateways that can describe their
//! models also hand out a [`CapabilitySource`], which smart model selection
//! uses for capability lookup and task classification.
//!
//! # Example
//!
//! ```ignore
//! use cognilens::config::LlmConfig;
//! use cognilens::provider::{create_client, GenerateRequest};
//!
//! let client = create_client(&LlmConfig::default())?;
//! let response = client.generate(GenerateRequest::new("Summarize: ...")).await?;
//! ```

mod error;
mod http;
mod lexora;
mod mock;
mod openai;
mod registry;
#[cfg(test)]
pub(crate) mod testing;
mod types;

use crate::config::{LlmConfig, Provider};
use async_trait::async_trait;
use std::sync::Arc;

pub use error::{Error, format_api_error};
pub use lexora::LexoraClient;
pub use mock::{MOCK_MODEL, MockClient};
pub use openai::OpenAiClient;
pub use registry::{CapabilityRegistry, DEFAULT_CACHE_TTL_SECS, ModelCapabilitiesCache};
pub use types::*;

/// Characters per token for the length-based estimate.
pub const CHARS_PER_TOKEN: usize = 4;

/// Length-based token estimate used when no tokenizer is available.
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.len() / CHARS_PER_TOKEN
}

/// Text generation backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Short backend identifier (`mock`, `openai`, `lexora`).
    fn id(&self) -> &str;

    async fn generate(&self, request: GenerateRequest) -> Result<LlmResponse, Error>;

    /// Token count for `text`. Backends fall back to an estimate rather than fail.
    async fn count_tokens(&self, text: &str) -> usize;

    async fn health_check(&self) -> bool;

    /// Capability reporting, for gateways that support it.
    fn capabilities(&self) -> Option<Arc<dyn CapabilitySource>> {
        None
    }
}

/// Gateway-side model metadata used by smart selection.
#[async_trait]
pub trait CapabilitySource: Send + Sync {
    async fn get_capabilities(&self, force_refresh: bool) -> Result<Vec<ModelCapability>, Error>;

    /// Classify a task preview. `Ok(None)` means the gateway had no opinion.
    async fn classify_task(&self, preview: &str) -> Result<Option<ClassificationResult>, Error>;
}

/// Build the backend selected by `config.provider`.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, Error> {
    let client: Arc<dyn LlmClient> = match config.provider {
        Provider::Mock => Arc::new(MockClient::new()),
        Provider::OpenAi => Arc::new(OpenAiClient::from_config(config)?),
        Provider::Lexora => Arc::new(LexoraClient::from_config(config)),
    };
    tracing::debug!(provider = client.id(), model = %config.model, "LLM client created");
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 0);
        assert_eq!(estimate_tokens(&"x".repeat(400)), 100);
    }

    #[test]
    fn test_create_mock_client() {
        let client = create_client(&LlmConfig::default()).unwrap();
        assert_eq!(client.id(), "mock");
        assert!(client.capabilities().is_none());
    }

    #[test]
    fn test_create_lexora_client_reports_capabilities() {
        let config = LlmConfig {
            provider: Provider::Lexora,
            ..LlmConfig::default()
        };
        let client = create_client(&config).unwrap();
        assert_eq!(client.id(), "lexora");
        assert!(client.capabilities().is_some());
    }

    #[test]
    fn test_create_openai_client_with_key() {
        let config = LlmConfig {
            provider: Provider::OpenAi,
            api_key: Some("sk-test".into()),
            ..LlmConfig::default()
        };
        let client = create_client(&config).unwrap();
        assert_eq!(client.id(), "openai");
    }
}

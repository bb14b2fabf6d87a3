//! Request/response types shared by every LLM backend.

use serde::{Deserialize, Serialize};

/// Default sampling temperature when a caller does not pick one.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// A single text-generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub max_tokens: Option<usize>,
    pub temperature: f32,
    /// Per-call model override; `None` uses the backend's configured model.
    pub model: Option<String>,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            max_tokens: None,
            temperature: DEFAULT_TEMPERATURE,
            model: None,
        }
    }

    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model.filter(|m| !m.is_empty());
        self
    }
}

/// Generated text plus accounting returned by a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub tokens_used: usize,
    pub finish_reason: Option<String>,
}

/// Capability record for one model advertised by a gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCapability {
    pub model_id: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub context_length: u32,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl ModelCapability {
    pub fn new(model_id: impl Into<String>, capabilities: &[&str]) -> Self {
        Self {
            model_id: model_id.into(),
            capabilities: capabilities.iter().map(|c| (*c).to_string()).collect(),
            context_length: 0,
            metadata: serde_json::Map::new(),
        }
    }

    /// Whether this model advertises the capability tag.
    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}

/// Task classification returned by a gateway's classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub task_type: String,
    pub recommended_capability: String,
    pub confidence: f64,
    #[serde(default)]
    pub recommended_model: Option<String>,
}

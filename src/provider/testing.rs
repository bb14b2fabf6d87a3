//! Scripted collaborators for unit tests.

use super::error::Error;
use super::types::{ClassificationResult, GenerateRequest, LlmResponse, ModelCapability};
use super::{CapabilitySource, LlmClient, MockClient};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Capability source with canned answers and failure switches.
#[derive(Default)]
pub struct ScriptedSource {
    pub models: Mutex<Vec<ModelCapability>>,
    pub classification: Mutex<Option<ClassificationResult>>,
    pub fail_capabilities: AtomicBool,
    pub fail_classification: AtomicBool,
    pub capability_calls: AtomicUsize,
    pub classify_calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn with_models(models: Vec<ModelCapability>) -> Self {
        Self {
            models: Mutex::new(models),
            ..Self::default()
        }
    }

    /// Source whose every call fails.
    pub fn failing() -> Self {
        let source = Self::default();
        source.fail_capabilities.store(true, Ordering::SeqCst);
        source.fail_classification.store(true, Ordering::SeqCst);
        source
    }

    pub fn set_classification(&self, result: Option<ClassificationResult>) {
        *self.classification.lock().unwrap() = result;
    }

    pub fn set_models(&self, models: Vec<ModelCapability>) {
        *self.models.lock().unwrap() = models;
    }

    pub fn capability_calls(&self) -> usize {
        self.capability_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CapabilitySource for ScriptedSource {
    async fn get_capabilities(&self, _force_refresh: bool) -> Result<Vec<ModelCapability>, Error> {
        self.capability_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_capabilities.load(Ordering::SeqCst) {
            return Err(Error::Api("capabilities endpoint down".into()));
        }
        Ok(self.models.lock().unwrap().clone())
    }

    async fn classify_task(&self, _preview: &str) -> Result<Option<ClassificationResult>, Error> {
        self.classify_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_classification.load(Ordering::SeqCst) {
            return Err(Error::Api("classifier down".into()));
        }
        Ok(self.classification.lock().unwrap().clone())
    }
}

/// Mock generation backed by a scripted capability source, recording requests.
pub struct ScriptedClient {
    pub inner: MockClient,
    pub source: Arc<ScriptedSource>,
    pub requests: Mutex<Vec<GenerateRequest>>,
    pub fail_generate: AtomicBool,
}

impl ScriptedClient {
    pub fn new(source: Arc<ScriptedSource>) -> Self {
        Self {
            inner: MockClient::new(),
            source,
            requests: Mutex::new(Vec::new()),
            fail_generate: AtomicBool::new(false),
        }
    }

    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<LlmResponse, Error> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail_generate.load(Ordering::SeqCst) {
            return Err(Error::Status {
                status: 500,
                body: r#"{"error":{"message":"backend exploded"}}"#.into(),
            });
        }
        self.inner.generate(request).await
    }

    async fn count_tokens(&self, text: &str) -> usize {
        self.inner.count_tokens(text).await
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn capabilities(&self) -> Option<Arc<dyn CapabilitySource>> {
        Some(self.source.clone())
    }
}

pub fn classification(capability: &str, model: Option<&str>, confidence: f64) -> ClassificationResult {
    ClassificationResult {
        task_type: "test".into(),
        recommended_capability: capability.into(),
        confidence,
        recommended_model: model.map(str::to_string),
    }
}

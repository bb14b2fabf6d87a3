use crate::compression::{CompressionEngine, CompressionError};
use crate::config::SummarizationConfig;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Shared state handed to every tool call.
#[derive(Clone)]
pub struct ToolContext {
    pub engine: Arc<CompressionEngine>,
    /// Defaults for omitted `summarize` arguments.
    pub summarization: SummarizationConfig,
}

impl ToolContext {
    pub fn new(engine: Arc<CompressionEngine>, summarization: SummarizationConfig) -> Self {
        Self {
            engine,
            summarization,
        }
    }
}

impl fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolContext")
            .field("provider", &self.engine.llm().id())
            .field("smart_selection", &self.engine.selector().is_some())
            .field("summarization", &self.summarization)
            .finish()
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON schema of the accepted arguments.
    fn parameters(&self) -> serde_json::Value;

    async fn execute(
        &self,
        args: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<serde_json::Value, ToolError>;
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

impl From<CompressionError> for ToolError {
    fn from(err: CompressionError) -> Self {
        match err {
            CompressionError::UnknownStyle(_)
            | CompressionError::MissingDiffInput
            | CompressionError::InvalidDiffInput(_) => ToolError::InvalidArgs(err.to_string()),
            CompressionError::Provider(e) => ToolError::ExecutionFailed(e.display_message()),
            CompressionError::Prompt(_) => ToolError::ExecutionFailed(err.to_string()),
        }
    }
}

/// Deserialize tool arguments, treating `null` as an empty object.
pub fn parse_args<T: DeserializeOwned>(args: serde_json::Value) -> Result<T, ToolError> {
    let args = if args.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArgs(e.to_string()))
}

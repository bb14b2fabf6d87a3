use crate::compression::strategy::CompressionStrategy;
use crate::compression::types::{
    CompressionRequest, CompressionResult, CompressionStyle, DIFF_INPUT_KEY, DiffInput, Metadata,
};
use crate::compression::{CompressionError, prompts};
use crate::provider::{GenerateRequest, LlmClient};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Preserved elements reported by every diff result.
pub const DIFF_PRESERVED_ELEMENTS: [&str; 3] = ["additions", "deletions", "changes"];

const DEFAULT_MAX_TOKENS: usize = 500;
const TEMPERATURE: f32 = 0.3;
const QUALITY_SCORE: f64 = 0.8;

/// Summarises what changed between a before/after pair.
pub struct DiffStrategy {
    llm: Arc<dyn LlmClient>,
}

impl DiffStrategy {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    fn diff_input(request: &CompressionRequest) -> Result<DiffInput, CompressionError> {
        match request.metadata.get(DIFF_INPUT_KEY) {
            None | Some(Value::Null) => Err(CompressionError::MissingDiffInput),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| CompressionError::InvalidDiffInput(e.to_string())),
        }
    }
}

#[async_trait]
impl CompressionStrategy for DiffStrategy {
    fn style(&self) -> CompressionStyle {
        CompressionStyle::Diff
    }

    fn description(&self) -> &'static str {
        "Diff-focused summary of additions, deletions and changes"
    }

    async fn compress(
        &self,
        request: &CompressionRequest,
        model_hint: Option<&str>,
    ) -> Result<CompressionResult, CompressionError> {
        let input = Self::diff_input(request)?;

        let combined = format!("{}{}", input.before, input.after);
        let original_tokens = self.llm.count_tokens(&combined).await;
        let prompt = prompts::diff(&input)?;

        let response = self
            .llm
            .generate(
                GenerateRequest::new(prompt)
                    .with_system_prompt(prompts::SYSTEM_PROMPT)
                    .with_max_tokens(request.explicit_target().unwrap_or(DEFAULT_MAX_TOKENS))
                    .with_temperature(TEMPERATURE)
                    .with_model(model_hint.map(str::to_string)),
            )
            .await?;
        let compressed_tokens = self.llm.count_tokens(&response.content).await;

        let mut metadata = Metadata::new();
        metadata.insert("strategy".into(), Value::from(self.name()));
        metadata.insert("model".into(), Value::from(response.model));
        metadata.insert("focus".into(), Value::from(input.focus));

        Ok(CompressionResult::new(
            response.content,
            original_tokens,
            compressed_tokens,
            DIFF_PRESERVED_ELEMENTS.iter().map(|s| (*s).to_string()).collect(),
            QUALITY_SCORE,
            metadata,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockClient;
    use crate::provider::testing::{ScriptedClient, ScriptedSource};
    use serde_json::json;

    fn sample() -> DiffInput {
        DiffInput {
            before: "def calculate(x, y): return x + y".into(),
            after: "def calculate(x, y, z=0): return x + y + z".into(),
            focus: Some("signature".into()),
        }
    }

    #[tokio::test]
    async fn test_missing_diff_input_fails() {
        let strategy = DiffStrategy::new(Arc::new(MockClient::new()));
        let request = CompressionRequest::new("", CompressionStyle::Diff);
        let err = strategy.compress(&request, None).await.unwrap_err();
        assert!(matches!(err, CompressionError::MissingDiffInput));

        let request = request.with_metadata(DIFF_INPUT_KEY, Value::Null);
        let err = strategy.compress(&request, None).await.unwrap_err();
        assert!(matches!(err, CompressionError::MissingDiffInput));
    }

    #[tokio::test]
    async fn test_malformed_diff_input_fails() {
        let strategy = DiffStrategy::new(Arc::new(MockClient::new()));
        let request = CompressionRequest::new("", CompressionStyle::Diff)
            .with_metadata(DIFF_INPUT_KEY, json!({"before": "only before"}));
        let err = strategy.compress(&request, None).await.unwrap_err();
        assert!(matches!(err, CompressionError::InvalidDiffInput(_)));
    }

    #[tokio::test]
    async fn test_diff_result_shape() {
        let strategy = DiffStrategy::new(Arc::new(MockClient::new()));
        let input = sample();
        let result = strategy
            .compress(&CompressionRequest::for_diff(&input), None)
            .await
            .unwrap();

        assert_eq!(result.preserved_elements, vec!["additions", "deletions", "changes"]);
        assert_eq!(result.quality_score, 0.8);
        assert_eq!(result.metadata["strategy"], "diff");
        assert_eq!(result.metadata["focus"], "signature");
        assert_eq!(result.original_tokens, (input.before.len() + input.after.len()) / 4);
        assert!(!result.compressed_text.is_empty());
    }

    #[tokio::test]
    async fn test_diff_generation_defaults() {
        let client = Arc::new(ScriptedClient::new(Arc::new(ScriptedSource::default())));
        let strategy = DiffStrategy::new(client.clone());
        let request = CompressionRequest::for_diff(&DiffInput {
            focus: None,
            ..sample()
        });
        let result = strategy.compress(&request, Some("reasoner")).await.unwrap();

        assert!(result.metadata["focus"].is_null());
        let sent = client.last_request().unwrap();
        assert_eq!(sent.max_tokens, Some(500));
        assert!((sent.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(sent.model.as_deref(), Some("reasoner"));

        let request = request.with_target_tokens(80);
        strategy.compress(&request, None).await.unwrap();
        assert_eq!(client.last_request().unwrap().max_tokens, Some(80));
    }
}

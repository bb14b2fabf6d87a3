use crate::compression::strategy::{CompressionStrategy, SummaryProfile, run_summary};
use crate::compression::types::{CompressionRequest, CompressionResult, CompressionStyle, Metadata};
use crate::compression::CompressionError;
use crate::provider::LlmClient;
use async_trait::async_trait;
use std::sync::Arc;

const PROFILE: SummaryProfile = SummaryProfile {
    style: CompressionStyle::Concise,
    default_ratio: 0.2,
    padding: 100,
    temperature: 0.3,
};

/// Maximum compression: a few sentences of overview.
pub struct ConciseStrategy {
    llm: Arc<dyn LlmClient>,
}

impl ConciseStrategy {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl CompressionStrategy for ConciseStrategy {
    fn style(&self) -> CompressionStyle {
        CompressionStyle::Concise
    }

    fn description(&self) -> &'static str {
        "Maximum compression (about 80%) for overviews and task lists"
    }

    async fn compress(
        &self,
        request: &CompressionRequest,
        model_hint: Option<&str>,
    ) -> Result<CompressionResult, CompressionError> {
        run_summary(
            self.llm.as_ref(),
            PROFILE,
            request,
            request.preserve.clone(),
            model_hint,
            None,
            Metadata::new(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockClient;
    use crate::provider::testing::{ScriptedClient, ScriptedSource};

    const SAMPLE: &str = "
    This is a sample document about software architecture.
    It contains multiple paragraphs discussing various design patterns.
    The Strategy pattern allows selecting algorithms at runtime.
    The Factory pattern provides object creation flexibility.
    These patterns improve code maintainability and testability.
    Good architecture leads to scalable and maintainable systems.
    ";

    #[tokio::test]
    async fn test_compresses_sample() {
        let strategy = ConciseStrategy::new(Arc::new(MockClient::new()));
        let request = CompressionRequest::new(SAMPLE, CompressionStyle::Concise).with_target_tokens(100);
        let result = strategy.compress(&request, None).await.unwrap();

        assert!(!result.compressed_text.is_empty());
        assert!(result.compression_ratio < 1.0);
        assert!((0.0..=1.0).contains(&result.quality_score));
        assert_eq!(result.metadata["strategy"], "concise");
        assert_eq!(result.metadata["model"], "mock-model");
    }

    #[tokio::test]
    async fn test_preserved_elements_echo_request() {
        let strategy = ConciseStrategy::new(Arc::new(MockClient::new()));
        let request = CompressionRequest::new(
            "The API uses REST endpoints. Authentication is required.",
            CompressionStyle::Concise,
        )
        .with_preserve(vec!["API".into(), "REST".into()]);
        let result = strategy.compress(&request, None).await.unwrap();
        assert_eq!(result.preserved_elements, vec!["API", "REST"]);
    }

    #[tokio::test]
    async fn test_generation_parameters() {
        let client = Arc::new(ScriptedClient::new(Arc::new(ScriptedSource::default())));
        let strategy = ConciseStrategy::new(client.clone());
        let text = "word ".repeat(200);
        let request = CompressionRequest::new(text, CompressionStyle::Concise);
        strategy.compress(&request, Some("local-small")).await.unwrap();

        let sent = client.last_request().unwrap();
        // 1000 chars -> 250 tokens, 20% -> 50, plus 100 padding
        assert_eq!(sent.max_tokens, Some(150));
        assert!((sent.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(sent.model.as_deref(), Some("local-small"));
        assert!(sent.system_prompt.is_some());
    }
}

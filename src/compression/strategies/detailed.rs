use crate::compression::strategy::{CompressionStrategy, SummaryProfile, run_summary};
use crate::compression::types::{CompressionRequest, CompressionResult, CompressionStyle, Metadata};
use crate::compression::CompressionError;
use crate::provider::LlmClient;
use async_trait::async_trait;
use std::sync::Arc;

const PROFILE: SummaryProfile = SummaryProfile {
    style: CompressionStyle::Detailed,
    default_ratio: 0.5,
    padding: 200,
    temperature: 0.5,
};

/// Moderate compression that keeps reference-level detail.
pub struct DetailedStrategy {
    llm: Arc<dyn LlmClient>,
}

impl DetailedStrategy {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl CompressionStrategy for DetailedStrategy {
    fn style(&self) -> CompressionStyle {
        CompressionStyle::Detailed
    }

    fn description(&self) -> &'static str {
        "Moderate compression (about 50%) for implementation references and API specs"
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

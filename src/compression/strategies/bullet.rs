use crate::compression::strategy::{CompressionStrategy, SummaryProfile, run_summary};
use crate::compression::types::{CompressionRequest, CompressionResult, CompressionStyle, Metadata};
use crate::compression::CompressionError;
use crate::provider::LlmClient;
use async_trait::async_trait;
use std::sync::Arc;

const PROFILE: SummaryProfile = SummaryProfile {
    style: CompressionStyle::Bullet,
    default_ratio: 0.3,
    padding: 150,
    temperature: 0.4,
};

/// Structured key points as a bulleted list.
pub struct BulletStrategy {
    llm: Arc<dyn LlmClient>,
}

impl BulletStrategy {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl CompressionStrategy for BulletStrategy {
    fn style(&self) -> CompressionStyle {
        CompressionStyle::Bullet
    }

    fn description(&self) -> &'static str {
        "Bullet point format with structured key points"
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

//! Strategy abstraction and style → strategy registry.

use super::strategies::{
    BulletStrategy, CodeAwareStrategy, ConciseStrategy, DetailedStrategy, DiffStrategy,
};
use super::types::{CompressionRequest, CompressionResult, CompressionStyle, Metadata};
use super::{CompressionError, prompts, quality};
use crate::provider::{GenerateRequest, LlmClient};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// One style's compression behaviour.
#[async_trait]
pub trait CompressionStrategy: Send + Sync {
    fn style(&self) -> CompressionStyle;

    fn name(&self) -> &'static str {
        self.style().as_str()
    }

    fn description(&self) -> &'static str;

    /// Compress `request`, optionally pinning generation to `model_hint`.
    async fn compress(
        &self,
        request: &CompressionRequest,
        model_hint: Option<&str>,
    ) -> Result<CompressionResult, CompressionError>;
}

/// Strategy instance for `style`, sharing `llm`.
pub fn strategy_for(style: CompressionStyle, llm: Arc<dyn LlmClient>) -> Box<dyn CompressionStrategy> {
    match style {
        CompressionStyle::Concise => Box::new(ConciseStrategy::new(llm)),
        CompressionStyle::Detailed => Box::new(DetailedStrategy::new(llm)),
        CompressionStyle::Bullet => Box::new(BulletStrategy::new(llm)),
        CompressionStyle::CodeAware => Box::new(CodeAwareStrategy::new(llm)),
        CompressionStyle::Diff => Box::new(DiffStrategy::new(llm)),
    }
}

/// Size and sampling knobs of a summary-style strategy.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SummaryProfile {
    pub style: CompressionStyle,
    /// Default target as a fraction of the original token count.
    pub default_ratio: f64,
    /// Extra generation budget above the target.
    pub padding: usize,
    pub temperature: f32,
}

impl SummaryProfile {
    /// Explicit target, else the request's ratio, else the style's default ratio.
    pub fn target_tokens(&self, request: &CompressionRequest, original_tokens: usize) -> usize {
        if let Some(target) = request.explicit_target() {
            return target;
        }
        let ratio = request
            .target_ratio
            .filter(|r| *r > 0.0)
            .unwrap_or(self.default_ratio);
        (original_tokens as f64 * ratio) as usize
    }
}

/// Shared summarize → count → score pipeline.
///
/// `suffix` is appended to the rendered prompt; `extra` is merged into the
/// result metadata after `strategy` and `model`.
pub(crate) async fn run_summary(
    llm: &dyn LlmClient,
    profile: SummaryProfile,
    request: &CompressionRequest,
    preserve: Vec<String>,
    model_hint: Option<&str>,
    suffix: Option<&str>,
    extra: Metadata,
) -> Result<CompressionResult, CompressionError> {
    let original_tokens = llm.count_tokens(&request.text).await;
    let target_tokens = profile.target_tokens(request, original_tokens);

    let mut prompt = prompts::summarize(&request.text, target_tokens, profile.style, &preserve)?;
    if let Some(suffix) = suffix {
        prompt.push_str(suffix);
    }

    let response = llm
        .generate(
            GenerateRequest::new(prompt)
                .with_system_prompt(prompts::SYSTEM_PROMPT)
                .with_max_tokens(target_tokens.saturating_add(profile.padding))
                .with_temperature(profile.temperature)
                .with_model(model_hint.map(str::to_string)),
        )
        .await?;

    let compressed_tokens = llm.count_tokens(&response.content).await;
    let quality = quality::quality_score(
        &response.content,
        original_tokens,
        compressed_tokens,
        &preserve,
    );

    let mut metadata = Metadata::new();
    metadata.insert("strategy".into(), Value::from(profile.style.as_str()));
    metadata.insert("model".into(), Value::from(response.model));
    metadata.extend(extra);

    tracing::debug!(
        strategy = profile.style.as_str(),
        original_tokens,
        target_tokens,
        compressed_tokens,
        "Compression finished"
    );

    Ok(CompressionResult::new(
        response.content,
        original_tokens,
        compressed_tokens,
        preserve,
        quality,
        metadata,
    ))
}

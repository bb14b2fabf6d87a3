//! Compression engine: the entry point for every compression operation.

use super::strategy::strategy_for;
use super::types::{
    CompressionRequest, CompressionResult, CompressionStyle, DiffInput, Document,
    MODEL_SELECTION_KEY, Metadata, ProgressiveStage,
};
use super::{CompressionError, prompts};
use crate::config::{Config, LlmConfig};
use crate::provider::{self, GenerateRequest, LlmClient, LlmResponse, create_client};
use crate::selector::{ModelSelection, ModelSelector};
use serde_json::{Value, json};
use std::sync::Arc;

/// Characters of input shown to the model selector.
pub const PREVIEW_CHARS: usize = 500;
/// Characters of each diff side shown to the model selector.
const DIFF_PREVIEW_CHARS: usize = 250;

const CONTEXT_PADDING: usize = 100;
const CONTEXT_TEMPERATURE: f32 = 0.3;
const CONTEXT_QUALITY: f64 = 0.85;

const ESSENCE_RATIO: f64 = 0.4;
const ESSENCE_TEMPERATURE: f32 = 0.4;
const ESSENCE_QUALITY: f64 = 0.8;

const UNIFY_RATIO: f64 = 0.3;
const UNIFY_TEMPERATURE: f32 = 0.5;
const UNIFY_QUALITY: f64 = 0.8;

const PROGRESSIVE_PADDING: usize = 100;
const PROGRESSIVE_TEMPERATURE: f32 = 0.3;
const PROGRESSIVE_QUALITY: f64 = 0.8;

/// Owns the LLM client and, when smart selection applies, a model selector.
pub struct CompressionEngine {
    llm: Arc<dyn LlmClient>,
    selector: Option<ModelSelector>,
}

impl CompressionEngine {
    /// Selection is attached only when enabled in `config` and `llm` reports capabilities.
    pub fn new(llm: Arc<dyn LlmClient>, config: &LlmConfig) -> Self {
        let selector = if config.smart_selection.enabled {
            match llm.capabilities() {
                Some(source) => Some(ModelSelector::new(source, config)),
                None => {
                    tracing::info!(
                        provider = llm.id(),
                        "Smart selection enabled but provider reports no capabilities"
                    );
                    None
                }
            }
        } else {
            None
        };

        Self { llm, selector }
    }

    /// Build the configured client and wrap it.
    pub fn from_config(config: &Config) -> Result<Self, provider::Error> {
        let llm = create_client(&config.llm)?;
        Ok(Self::new(llm, &config.llm))
    }

    pub fn llm(&self) -> &Arc<dyn LlmClient> {
        &self.llm
    }

    pub fn selector(&self) -> Option<&ModelSelector> {
        self.selector.as_ref()
    }

    async fn select(&self, style: CompressionStyle, preview: &str) -> Option<ModelSelection> {
        let selector = self.selector.as_ref()?;
        Some(selector.select_model(style, Some(preview)).await)
    }

    /// Summarize `text` with the strategy for `style`.
    pub async fn summarize(
        &self,
        text: &str,
        max_tokens: usize,
        style: CompressionStyle,
        preserve: Vec<String>,
    ) -> Result<CompressionResult, CompressionError> {
        let selection = self.select(style, preview(text, PREVIEW_CHARS)).await;

        let mut request = CompressionRequest::new(text, style)
            .with_target_tokens(max_tokens)
            .with_preserve(preserve);
        if let Some(selection) = &selection {
            request = request.with_metadata(MODEL_SELECTION_KEY, selection_value(selection));
        }

        let strategy = strategy_for(style, Arc::clone(&self.llm));
        let mut result = strategy.compress(&request, model_hint(&selection)).await?;
        annotate(&mut result.metadata, selection.as_ref());
        Ok(result)
    }

    /// Keep only the parts of `context` relevant to `task`.
    pub async fn compress_context(
        &self,
        context: &str,
        task: &str,
        target_tokens: usize,
    ) -> Result<CompressionResult, CompressionError> {
        let selection = self
            .select(CompressionStyle::Concise, preview(context, PREVIEW_CHARS))
            .await;

        let original_tokens = self.llm.count_tokens(context).await;
        let prompt = prompts::compress_context(context, task, target_tokens)?;
        let response = self
            .generate(
                prompt,
                target_tokens.saturating_add(CONTEXT_PADDING),
                CONTEXT_TEMPERATURE,
                &selection,
            )
            .await?;

        let mut metadata = Metadata::new();
        metadata.insert("task".into(), Value::from(task));
        self.finish(
            response,
            original_tokens,
            vec![task.to_string()],
            CONTEXT_QUALITY,
            metadata,
            selection.as_ref(),
        )
        .await
    }

    /// Pull the essential information out of `document`.
    pub async fn extract_essence(
        &self,
        document: &str,
        focus_areas: Vec<String>,
    ) -> Result<CompressionResult, CompressionError> {
        let selection = self
            .select(CompressionStyle::Detailed, preview(document, PREVIEW_CHARS))
            .await;

        let original_tokens = self.llm.count_tokens(document).await;
        let target_tokens = (original_tokens as f64 * ESSENCE_RATIO) as usize;
        let prompt = prompts::extract_essence(document, &focus_areas)?;
        let response = self
            .generate(prompt, target_tokens, ESSENCE_TEMPERATURE, &selection)
            .await?;

        let mut metadata = Metadata::new();
        metadata.insert("focus_areas".into(), json!(focus_areas));
        self.finish(
            response,
            original_tokens,
            focus_areas,
            ESSENCE_QUALITY,
            metadata,
            selection.as_ref(),
        )
        .await
    }

    /// Merge several documents into one summary. Preserved elements are the titles.
    pub async fn unify_summaries(
        &self,
        documents: &[Document],
        purpose: &str,
    ) -> Result<CompressionResult, CompressionError> {
        let combined = documents
            .iter()
            .map(|doc| doc.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let selection = self
            .select(CompressionStyle::Detailed, preview(&combined, PREVIEW_CHARS))
            .await;

        let original_tokens = self.llm.count_tokens(&combined).await;
        let target_tokens = (original_tokens as f64 * UNIFY_RATIO) as usize;
        let prompt = prompts::unify(documents, purpose)?;
        let response = self
            .generate(prompt, target_tokens, UNIFY_TEMPERATURE, &selection)
            .await?;

        let mut metadata = Metadata::new();
        metadata.insert("purpose".into(), Value::from(purpose));
        metadata.insert("document_count".into(), Value::from(documents.len()));
        let titles = documents.iter().map(|doc| doc.title.clone()).collect();
        self.finish(
            response,
            original_tokens,
            titles,
            UNIFY_QUALITY,
            metadata,
            selection.as_ref(),
        )
        .await
    }

    /// Summarize the changes between `before` and `after`.
    pub async fn summarize_diff(
        &self,
        before: &str,
        after: &str,
        focus: Option<String>,
    ) -> Result<CompressionResult, CompressionError> {
        let diff_preview = format!(
            "Before:\n{}\n\nAfter:\n{}",
            preview(before, DIFF_PREVIEW_CHARS),
            preview(after, DIFF_PREVIEW_CHARS)
        );
        let selection = self.select(CompressionStyle::Diff, &diff_preview).await;

        let input = DiffInput {
            before: before.to_string(),
            after: after.to_string(),
            focus,
        };
        let mut request = CompressionRequest::for_diff(&input);
        if let Some(selection) = &selection {
            request = request.with_metadata(MODEL_SELECTION_KEY, selection_value(selection));
        }

        let strategy = strategy_for(CompressionStyle::Diff, Arc::clone(&self.llm));
        let mut result = strategy.compress(&request, model_hint(&selection)).await?;
        annotate(&mut result.metadata, selection.as_ref());
        Ok(result)
    }

    /// Run `stages` in order, each compressing the previous stage's output.
    pub async fn progressive_compress(
        &self,
        text: &str,
        stages: &[ProgressiveStage],
    ) -> Result<Vec<CompressionResult>, CompressionError> {
        let mut results = Vec::with_capacity(stages.len());
        let mut current = text.to_string();

        for (index, stage) in stages.iter().enumerate() {
            let stage_number = index + 1;
            let selection = self
                .select(CompressionStyle::Concise, preview(&current, PREVIEW_CHARS))
                .await;

            let original_tokens = self.llm.count_tokens(&current).await;
            // Negative ratios saturate to zero.
            let target_tokens = (original_tokens as f64 * stage.target_ratio) as usize;
            let prompt = prompts::progressive(&current, stage, stage_number, stages.len())?;
            let response = self
                .generate(
                    prompt,
                    target_tokens.saturating_add(PROGRESSIVE_PADDING),
                    PROGRESSIVE_TEMPERATURE,
                    &selection,
                )
                .await?;

            let mut metadata = Metadata::new();
            metadata.insert("stage".into(), Value::from(stage_number));
            metadata.insert("target_ratio".into(), Value::from(stage.target_ratio));
            let result = self
                .finish(
                    response,
                    original_tokens,
                    stage.preserve.clone(),
                    PROGRESSIVE_QUALITY,
                    metadata,
                    selection.as_ref(),
                )
                .await?;

            tracing::debug!(
                stage = stage_number,
                original_tokens = result.original_tokens,
                compressed_tokens = result.compressed_tokens,
                "Progressive stage finished"
            );
            current.clone_from(&result.compressed_text);
            results.push(result);
        }

        Ok(results)
    }

    async fn generate(
        &self,
        prompt: String,
        max_tokens: usize,
        temperature: f32,
        selection: &Option<ModelSelection>,
    ) -> Result<LlmResponse, CompressionError> {
        let request = GenerateRequest::new(prompt)
            .with_system_prompt(prompts::SYSTEM_PROMPT)
            .with_max_tokens(max_tokens)
            .with_temperature(temperature)
            .with_model(model_hint(selection).map(str::to_string));
        Ok(self.llm.generate(request).await?)
    }

    /// Count output tokens and assemble a fixed-quality result.
    async fn finish(
        &self,
        response: LlmResponse,
        original_tokens: usize,
        preserved: Vec<String>,
        quality: f64,
        extra: Metadata,
        selection: Option<&ModelSelection>,
    ) -> Result<CompressionResult, CompressionError> {
        let compressed_tokens = self.llm.count_tokens(&response.content).await;
        let mut metadata = extra;
        metadata.insert("model".into(), Value::from(response.model));
        annotate(&mut metadata, selection);
        Ok(CompressionResult::new(
            response.content,
            original_tokens,
            compressed_tokens,
            preserved,
            quality,
            metadata,
        ))
    }
}

/// Longest prefix of `text` with at most `max_chars` characters.
fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

fn model_hint(selection: &Option<ModelSelection>) -> Option<&str> {
    selection.as_ref().map(|s| s.model_id.as_str())
}

fn selection_value(selection: &ModelSelection) -> Value {
    json!({
        "model_id": selection.model_id,
        "method": selection.method.as_str(),
        "capability": selection.capability,
        "confidence": selection.confidence,
    })
}

fn annotate(metadata: &mut Metadata, selection: Option<&ModelSelection>) {
    if let Some(selection) = selection {
        metadata.insert("selected_model".into(), Value::from(selection.model_id.as_str()));
        metadata.insert(
            "selection_method".into(),
            Value::from(selection.method.as_str()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::strategies::DIFF_PRESERVED_ELEMENTS;
    use crate::provider::testing::{ScriptedClient, ScriptedSource};
    use crate::provider::{MockClient, ModelCapability};
    use std::sync::atomic::Ordering;

    const SAMPLE: &str = "
        The API uses REST endpoints for all client communication.
        Authentication is required before any request is served.
        Rate limiting protects the service from abusive clients.
    ";

    fn mock_engine() -> CompressionEngine {
        CompressionEngine::new(Arc::new(MockClient::new()), &LlmConfig::default())
    }

    fn smart_config() -> LlmConfig {
        let mut config = LlmConfig {
            model: "default-model".into(),
            ..LlmConfig::default()
        };
        config.smart_selection.enabled = true;
        config
    }

    fn scripted_engine() -> (CompressionEngine, Arc<ScriptedClient>) {
        let source = Arc::new(ScriptedSource::with_models(vec![
            ModelCapability::new("summarizer-7b", &["summarization"]),
            ModelCapability::new("coder-13b", &["code"]),
            ModelCapability::new("thinker-70b", &["reasoning"]),
        ]));
        let client = Arc::new(ScriptedClient::new(source));
        let engine = CompressionEngine::new(client.clone(), &smart_config());
        (engine, client)
    }

    #[tokio::test]
    async fn test_summarize_end_to_end() {
        let engine = mock_engine();
        let result = engine
            .summarize(SAMPLE, 100, CompressionStyle::Concise, vec![])
            .await
            .unwrap();

        assert!(!result.compressed_text.is_empty());
        assert!(result.compression_ratio < 1.0);
        assert!((0.0..=1.0).contains(&result.quality_score));
        assert_eq!(result.metadata["strategy"], "concise");
        assert!(!result.metadata.contains_key("selected_model"));
    }

    #[tokio::test]
    async fn test_no_selector_without_capabilities() {
        let engine = CompressionEngine::new(Arc::new(MockClient::new()), &smart_config());
        assert!(engine.selector().is_none());

        let (engine, _) = scripted_engine();
        assert!(engine.selector().is_some());

        let source = Arc::new(ScriptedSource::default());
        let engine =
            CompressionEngine::new(Arc::new(ScriptedClient::new(source)), &LlmConfig::default());
        assert!(engine.selector().is_none());
    }

    #[tokio::test]
    async fn test_summarize_records_selection() {
        let (engine, client) = scripted_engine();
        let result = engine
            .summarize(SAMPLE, 100, CompressionStyle::CodeAware, vec![])
            .await
            .unwrap();

        assert_eq!(result.metadata["selected_model"], "coder-13b");
        assert_eq!(result.metadata["selection_method"], "capability_match");
        assert_eq!(result.metadata["strategy"], "code_aware");
        let sent = client.last_request().unwrap();
        assert_eq!(sent.model.as_deref(), Some("coder-13b"));
    }

    #[tokio::test]
    async fn test_selection_does_not_change_other_fields() {
        let (engine, _) = scripted_engine();
        let with_selection = engine
            .summarize(SAMPLE, 100, CompressionStyle::Bullet, vec!["API".into()])
            .await
            .unwrap();
        let without = mock_engine()
            .summarize(SAMPLE, 100, CompressionStyle::Bullet, vec!["API".into()])
            .await
            .unwrap();

        assert_eq!(with_selection.compressed_text, without.compressed_text);
        assert_eq!(with_selection.original_tokens, without.original_tokens);
        assert_eq!(with_selection.compressed_tokens, without.compressed_tokens);
        assert_eq!(with_selection.quality_score, without.quality_score);
        assert_eq!(with_selection.preserved_elements, without.preserved_elements);
    }

    #[tokio::test]
    async fn test_summarize_diff_style_needs_payload() {
        let err = mock_engine()
            .summarize(SAMPLE, 100, CompressionStyle::Diff, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, CompressionError::MissingDiffInput));
    }

    #[tokio::test]
    async fn test_compress_context() {
        let (engine, client) = scripted_engine();
        let result = engine
            .compress_context(SAMPLE, "add OAuth support", 40)
            .await
            .unwrap();

        assert_eq!(result.preserved_elements, vec!["add OAuth support"]);
        assert!((result.quality_score - 0.85).abs() < f64::EPSILON);
        assert_eq!(result.metadata["task"], "add OAuth support");
        assert_eq!(result.metadata["model"], "mock-model");
        assert_eq!(result.metadata["selected_model"], "summarizer-7b");

        let sent = client.last_request().unwrap();
        assert_eq!(sent.max_tokens, Some(140));
        assert!((sent.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_extract_essence() {
        let (engine, client) = scripted_engine();
        let focus = vec!["security".to_string()];
        let result = engine.extract_essence(SAMPLE, focus.clone()).await.unwrap();

        assert_eq!(result.preserved_elements, focus);
        assert!((result.quality_score - 0.8).abs() < f64::EPSILON);
        assert_eq!(result.metadata["focus_areas"], json!(["security"]));

        let sent = client.last_request().unwrap();
        let expected = (result.original_tokens as f64 * 0.4) as usize;
        assert_eq!(sent.max_tokens, Some(expected));
        assert!((sent.temperature - 0.4).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_unify_summaries() {
        let engine = mock_engine();
        let documents = vec![
            Document {
                title: "Design Patterns".into(),
                content: "The Strategy pattern selects algorithms at runtime.".into(),
                metadata: Metadata::new(),
            },
            Document {
                title: "Architecture".into(),
                content: "Layered architecture separates the concerns cleanly.".into(),
                metadata: Metadata::new(),
            },
        ];
        let result = engine.unify_summaries(&documents, "onboarding").await.unwrap();

        let combined = format!("{}\n{}", documents[0].content, documents[1].content);
        assert_eq!(result.original_tokens, combined.len() / 4);
        assert_eq!(result.preserved_elements, vec!["Design Patterns", "Architecture"]);
        assert_eq!(result.metadata["document_count"], 2);
        assert_eq!(result.metadata["purpose"], "onboarding");
        assert!((result.quality_score - 0.8).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_summarize_diff() {
        let (engine, client) = scripted_engine();
        let result = engine
            .summarize_diff(
                "fn login(user: &str) {}",
                "fn login(user: &str, otp: u32) {}",
                Some("signatures".into()),
            )
            .await
            .unwrap();

        assert_eq!(result.preserved_elements, DIFF_PRESERVED_ELEMENTS);
        assert_eq!(result.metadata["focus"], "signatures");
        assert_eq!(result.metadata["selected_model"], "thinker-70b");
        assert_eq!(client.last_request().unwrap().model.as_deref(), Some("thinker-70b"));
    }

    #[tokio::test]
    async fn test_progressive_chains_stages() {
        let engine = mock_engine();
        let text = "Compression keeps the key facts intact. ".repeat(100);
        let stages = vec![
            ProgressiveStage {
                target_ratio: 0.5,
                preserve: vec![],
            },
            ProgressiveStage {
                target_ratio: 0.5,
                preserve: vec!["facts".into()],
            },
        ];
        let results = engine.progressive_compress(&text, &stages).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].original_tokens, 1000);
        assert_eq!(results[1].original_tokens, results[0].compressed_tokens);
        assert_eq!(results[0].metadata["stage"], 1);
        assert_eq!(results[1].metadata["stage"], 2);
        assert_eq!(results[1].preserved_elements, vec!["facts"]);
        assert!((results[1].quality_score - 0.8).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_padding_saturates_at_max_budget() {
        let (engine, client) = scripted_engine();
        engine
            .compress_context(SAMPLE, "task", usize::MAX)
            .await
            .unwrap();
        assert_eq!(client.last_request().unwrap().max_tokens, Some(usize::MAX));

        engine
            .summarize(SAMPLE, usize::MAX, CompressionStyle::Concise, vec![])
            .await
            .unwrap();
        assert_eq!(client.last_request().unwrap().max_tokens, Some(usize::MAX));

        let stages = [ProgressiveStage {
            target_ratio: f64::MAX,
            preserve: vec![],
        }];
        engine.progressive_compress(SAMPLE, &stages).await.unwrap();
        assert_eq!(client.last_request().unwrap().max_tokens, Some(usize::MAX));
    }

    #[tokio::test]
    async fn test_progressive_without_stages() {
        let results = mock_engine().progressive_compress("text", &[]).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let (engine, client) = scripted_engine();
        client.fail_generate.store(true, Ordering::SeqCst);
        let err = engine
            .compress_context(SAMPLE, "task", 50)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CompressionError::Provider(provider::Error::Status { status: 500, .. })
        ));
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let text = "é".repeat(600);
        let cut = preview(&text, PREVIEW_CHARS);
        assert_eq!(cut.chars().count(), PREVIEW_CHARS);
        assert_eq!(preview("short", PREVIEW_CHARS), "short");
    }
}

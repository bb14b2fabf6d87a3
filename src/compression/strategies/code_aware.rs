use crate::compression::prompts::CODE_AWARE_SUFFIX;
use crate::compression::strategy::{CompressionStrategy, SummaryProfile, run_summary};
use crate::compression::types::{CompressionRequest, CompressionResult, CompressionStyle, Metadata};
use crate::compression::CompressionError;
use crate::provider::LlmClient;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

/// Most detected signatures added to the preserve list.
pub const MAX_FOLDED_SIGNATURES: usize = 5;

const PROFILE: SummaryProfile = SummaryProfile {
    style: CompressionStyle::CodeAware,
    default_ratio: 0.4,
    padding: 200,
    temperature: 0.3,
};

static FUNCTION_SIGNATURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:async\s+)?(?:def|function)\s+(\w+)\s*\(")
        .expect("function signature regex must compile")
});

static CLASS_SIGNATURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"class\s+(\w+)").expect("class signature regex must compile"));

/// Unique function and class names declared in `text`, functions first, in source order.
pub fn extract_code_signatures(text: &str) -> Vec<String> {
    let mut signatures: Vec<String> = Vec::new();
    for pattern in [&*FUNCTION_SIGNATURE, &*CLASS_SIGNATURE] {
        for name in pattern
            .captures_iter(text)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
        {
            if !signatures.iter().any(|s| s == name) {
                signatures.push(name.to_string());
            }
        }
    }
    signatures
}

/// Keeps class/function structure while compressing prose around it.
pub struct CodeAwareStrategy {
    llm: Arc<dyn LlmClient>,
}

impl CodeAwareStrategy {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl CompressionStrategy for CodeAwareStrategy {
    fn style(&self) -> CompressionStyle {
        CompressionStyle::CodeAware
    }

    fn description(&self) -> &'static str {
        "Code-aware compression that keeps structure and compresses explanations"
    }

    async fn compress(
        &self,
        request: &CompressionRequest,
        model_hint: Option<&str>,
    ) -> Result<CompressionResult, CompressionError> {
        let signatures = extract_code_signatures(&request.text);

        let mut preserve = request.preserve.clone();
        for signature in signatures.iter().take(MAX_FOLDED_SIGNATURES) {
            if !preserve.contains(signature) {
                preserve.push(signature.clone());
            }
        }

        let mut extra = Metadata::new();
        extra.insert(
            "detected_signatures".into(),
            Value::from(signatures.clone()),
        );

        run_summary(
            self.llm.as_ref(),
            PROFILE,
            request,
            preserve,
            model_hint,
            Some(CODE_AWARE_SUFFIX),
            extra,
        )
        .await
    }
}

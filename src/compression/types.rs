//! Compression data model.

use super::CompressionError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Free-form result/request metadata.
pub type Metadata = serde_json::Map<String, Value>;

/// Request metadata key holding the diff payload.
pub const DIFF_INPUT_KEY: &str = "diff_input";
/// Request metadata key holding the model selection made by the engine.
pub const MODEL_SELECTION_KEY: &str = "model_selection";

/// Compression policy: prompt shape and default size ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionStyle {
    #[default]
    Concise,
    Detailed,
    Bullet,
    CodeAware,
    Diff,
}

impl CompressionStyle {
    pub const ALL: &'static [CompressionStyle] = &[
        CompressionStyle::Concise,
        CompressionStyle::Detailed,
        CompressionStyle::Bullet,
        CompressionStyle::CodeAware,
        CompressionStyle::Diff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionStyle::Concise => "concise",
            CompressionStyle::Detailed => "detailed",
            CompressionStyle::Bullet => "bullet",
            CompressionStyle::CodeAware => "code_aware",
            CompressionStyle::Diff => "diff",
        }
    }
}

impl fmt::Display for CompressionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionStyle {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|style| style.as_str() == s)
            .ok_or_else(|| CompressionError::UnknownStyle(s.to_string()))
    }
}

/// Input to a compression strategy. Built once, then read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionRequest {
    pub text: String,
    pub style: CompressionStyle,
    pub target_tokens: Option<usize>,
    pub target_ratio: Option<f64>,
    pub preserve: Vec<String>,
    pub context: Option<String>,
    pub metadata: Metadata,
}

impl CompressionRequest {
    pub fn new(text: impl Into<String>, style: CompressionStyle) -> Self {
        Self {
            text: text.into(),
            style,
            target_tokens: None,
            target_ratio: None,
            preserve: Vec::new(),
            context: None,
            metadata: Metadata::new(),
        }
    }

    #[must_use]
    pub fn with_target_tokens(mut self, target_tokens: usize) -> Self {
        self.target_tokens = Some(target_tokens);
        self
    }

    #[must_use]
    pub fn with_target_ratio(mut self, target_ratio: f64) -> Self {
        self.target_ratio = Some(target_ratio);
        self
    }

    #[must_use]
    pub fn with_preserve(mut self, preserve: Vec<String>) -> Self {
        self.preserve = preserve;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    /// Request for the diff strategy, carrying `input` under [`DIFF_INPUT_KEY`].
    pub fn for_diff(input: &DiffInput) -> Self {
        Self::new(String::new(), CompressionStyle::Diff)
            .with_metadata(DIFF_INPUT_KEY, serde_json::to_value(input).unwrap_or(Value::Null))
    }

    /// Explicit positive target, if any. Zero counts as unset.
    pub fn explicit_target(&self) -> Option<usize> {
        self.target_tokens.filter(|t| *t > 0)
    }
}

/// `compressed / original`, or 0 when the original is empty.
#[must_use]
pub fn compression_ratio(compressed_tokens: usize, original_tokens: usize) -> f64 {
    if original_tokens == 0 {
        0.0
    } else {
        compressed_tokens as f64 / original_tokens as f64
    }
}

/// Output of one compression run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressionResult {
    pub compressed_text: String,
    pub original_tokens: usize,
    pub compressed_tokens: usize,
    /// Always derived from the token counts.
    pub compression_ratio: f64,
    /// What the run tried to keep, not a verified subset of the output.
    pub preserved_elements: Vec<String>,
    pub quality_score: f64,
    pub metadata: Metadata,
}

impl CompressionResult {
    pub fn new(
        compressed_text: String,
        original_tokens: usize,
        compressed_tokens: usize,
        preserved_elements: Vec<String>,
        quality_score: f64,
        metadata: Metadata,
    ) -> Self {
        Self {
            compressed_text,
            original_tokens,
            compressed_tokens,
            compression_ratio: compression_ratio(compressed_tokens, original_tokens),
            preserved_elements,
            quality_score,
            metadata,
        }
    }

    /// Percentage of tokens saved.
    pub fn savings_percent(&self) -> f64 {
        (1.0 - self.compression_ratio) * 100.0
    }
}

/// A titled document for unification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Before/after pair for diff summarisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffInput {
    pub before: String,
    pub after: String,
    #[serde(default)]
    pub focus: Option<String>,
}

/// One pass of a progressive compression pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressiveStage {
    /// Fraction of the current text's size to retain.
    pub target_ratio: f64,
    #[serde(default)]
    pub preserve: Vec<String>,
}

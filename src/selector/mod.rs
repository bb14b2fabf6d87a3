//! Smart model selection.
//!
//! Resolves a model for each compression call through four tiers, first
//! success wins:
//!
//! 1. the gateway's task classifier (when enabled and a preview exists)
//! 2. a cached model advertising the style's capability
//! 3. content heuristics over the preview
//! 4. the configured default model
//!
//! Selection never fails. Collaborator errors are logged and the next tier runs.

mod heuristics;

use crate::compression::CompressionStyle;
use crate::config::{LlmConfig, SmartSelectionConfig};
use crate::provider::{CapabilityRegistry, CapabilitySource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use heuristics::{HEURISTIC_PATTERNS, matching_capabilities};

/// Capability used when a style has no entry in the capability map.
pub const GENERAL_CAPABILITY: &str = "general";
/// Confidence reported for heuristic matches.
pub const HEURISTIC_CONFIDENCE: f64 = 0.7;

/// Which tier produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    Classification,
    CapabilityMatch,
    Heuristic,
    Default,
}

impl SelectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMethod::Classification => "classification",
            SelectionMethod::CapabilityMatch => "capability_match",
            SelectionMethod::Heuristic => "heuristic",
            SelectionMethod::Default => "default",
        }
    }
}

/// A chosen model and how it was chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSelection {
    pub model_id: String,
    pub method: SelectionMethod,
    pub capability: Option<String>,
    pub confidence: f64,
}

impl ModelSelection {
    fn new(model_id: impl Into<String>, method: SelectionMethod, capability: Option<String>) -> Self {
        Self {
            model_id: model_id.into(),
            method,
            capability,
            confidence: 1.0,
        }
    }

    #[must_use]
    fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }
}

/// Picks a model per compression request.
pub struct ModelSelector {
    registry: CapabilityRegistry,
    default_model: String,
    smart: SmartSelectionConfig,
}

impl ModelSelector {
    #[must_use]
    pub fn new(source: Arc<dyn CapabilitySource>, config: &LlmConfig) -> Self {
        Self {
            registry: CapabilityRegistry::new(source, config.smart_selection.cache_ttl_seconds),
            default_model: config.model.clone(),
            smart: config.smart_selection.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.smart.enabled
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Capability tag required by `style`.
    pub fn capability_for_style(&self, style: CompressionStyle) -> String {
        self.smart
            .strategy_capability_map
            .get(style.as_str())
            .cloned()
            .unwrap_or_else(|| GENERAL_CAPABILITY.to_string())
    }

    /// Resolve a model for `style`, using `preview` for classification and heuristics.
    pub async fn select_model(&self, style: CompressionStyle, preview: Option<&str>) -> ModelSelection {
        if !self.is_enabled() {
            return ModelSelection::new(&self.default_model, SelectionMethod::Default, None);
        }

        let capability = self.capability_for_style(style);
        let preview = preview.filter(|p| !p.is_empty());

        let selection = match self.resolve(&capability, preview).await {
            Some(selection) => selection,
            None if self.smart.fallback_to_default => ModelSelection::new(
                &self.default_model,
                SelectionMethod::Default,
                Some(capability),
            ),
            None => ModelSelection::new(&self.default_model, SelectionMethod::Default, None)
                .with_confidence(0.0),
        };

        tracing::debug!(
            style = style.as_str(),
            model = %selection.model_id,
            method = selection.method.as_str(),
            capability = ?selection.capability,
            confidence = selection.confidence,
            "Model selected"
        );
        selection
    }

    async fn resolve(&self, capability: &str, preview: Option<&str>) -> Option<ModelSelection> {
        if self.smart.classify_tasks
            && let Some(preview) = preview
            && let Some(selection) = self.try_classification(preview).await
        {
            return Some(selection);
        }

        if let Some(selection) = self.try_capability_match(capability).await {
            return Some(selection);
        }

        preview.and_then(|p| self.try_heuristics(p))
    }

    async fn try_classification(&self, preview: &str) -> Option<ModelSelection> {
        let result = match self.registry.source().classify_task(preview).await {
            Ok(Some(result)) => result,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Task classification failed, skipping");
                return None;
            }
        };

        let model_id = result
            .recommended_model
            .clone()
            .filter(|m| !m.is_empty())
            .or_else(|| self.registry.find_by_capability(&result.recommended_capability))?;

        Some(
            ModelSelection::new(
                model_id,
                SelectionMethod::Classification,
                Some(result.recommended_capability),
            )
            .with_confidence(result.confidence),
        )
    }

    async fn try_capability_match(&self, capability: &str) -> Option<ModelSelection> {
        let cache = self.registry.get(false).await?;
        let model_id = cache.find_by_capability(capability)?;
        Some(ModelSelection::new(
            model_id,
            SelectionMethod::CapabilityMatch,
            Some(capability.to_string()),
        ))
    }

    /// First capability in table order whose patterns match and that has a cached model.
    fn try_heuristics(&self, preview: &str) -> Option<ModelSelection> {
        matching_capabilities(preview).find_map(|capability| {
            self.registry.find_by_capability(capability).map(|model_id| {
                ModelSelection::new(
                    model_id,
                    SelectionMethod::Heuristic,
                    Some(capability.to_string()),
                )
                .with_confidence(HEURISTIC_CONFIDENCE)
            })
        })
    }

    /// Force a capability refresh. True when a snapshot is available afterwards.
    pub async fn refresh_capabilities(&self) -> bool {
        self.registry.get(true).await.is_some()
    }
}

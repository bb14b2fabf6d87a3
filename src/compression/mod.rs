//! Text compression: data model, prompts, strategies and the engine.
//!
//! [`CompressionEngine`] is the entry point. Each summarize call is routed to
//! the [`CompressionStrategy`] for its [`CompressionStyle`]; the remaining
//! operations build their prompts directly.

mod engine;
pub mod prompts;
pub mod quality;
pub mod strategies;
mod strategy;
mod types;

use thiserror::Error;

pub use engine::{CompressionEngine, PREVIEW_CHARS};
pub use strategy::{CompressionStrategy, strategy_for};
pub use types::{
    CompressionRequest, CompressionResult, CompressionStyle, DIFF_INPUT_KEY, DiffInput, Document,
    MODEL_SELECTION_KEY, Metadata, ProgressiveStage, compression_ratio,
};

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("Unknown compression style: {0}")]
    UnknownStyle(String),

    #[error("Diff compression requires a diff_input payload")]
    MissingDiffInput,

    #[error("Invalid diff_input payload: {0}")]
    InvalidDiffInput(String),

    #[error("Failed to render prompt: {0}")]
    Prompt(#[from] minijinja::Error),

    #[error(transparent)]
    Provider(#[from] crate::provider::Error),
}

//! Deterministic offline backend for tests and local development.

use super::error::Error;
use super::types::{GenerateRequest, LlmResponse};
use super::{LlmClient, estimate_tokens};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Model id reported in every mock response.
pub const MOCK_MODEL: &str = "mock-model";

/// Reply used when the prompt has no sentence long enough to keep.
const FALLBACK_SUMMARY: &str = "Summary of the provided text.";

/// Sentences at or below this many characters (after trimming) are dropped.
const MIN_SENTENCE_CHARS: usize = 20;

/// Number of sentences kept in the reply.
const KEPT_SENTENCES: usize = 3;

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("sentence terminator regex must compile"));

static INPUT_BODY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<input[^>]*>(.*?)</input>").expect("input body regex must compile")
});

/// Mock client that "summarises" by keeping the first few long sentences.
#[derive(Debug, Default)]
pub struct MockClient {
    call_count: AtomicUsize,
}

impl MockClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `generate` calls made so far.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Text the mock reads from: the `<input>` bodies when the prompt has any,
    /// otherwise the whole prompt.
    fn source_text(prompt: &str) -> String {
        let bodies: Vec<&str> = INPUT_BODY
            .captures_iter(prompt)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();
        if bodies.is_empty() {
            prompt.to_string()
        } else {
            bodies.join("\n")
        }
    }

    fn summarize(prompt: &str, max_tokens: Option<usize>) -> String {
        let source = Self::source_text(prompt);
        let key_sentences: Vec<&str> = SENTENCE_END
            .split(&source)
            .map(str::trim)
            .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
            .take(KEPT_SENTENCES)
            .collect();

        let summary = if key_sentences.is_empty() {
            FALLBACK_SUMMARY.to_string()
        } else {
            format!("{}.", key_sentences.join(". "))
        };

        match max_tokens {
            Some(limit) if limit > 0 => summary
                .split_whitespace()
                .take(limit / 2)
                .collect::<Vec<_>>()
                .join(" "),
            _ => summary,
        }
    }
}

#[async_trait]
impl LlmClient for MockClient {
    fn id(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<LlmResponse, Error> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        let content = Self::summarize(&request.prompt, request.max_tokens);
        let tokens_used = content.split_whitespace().count();

        Ok(LlmResponse {
            content,
            model: MOCK_MODEL.to_string(),
            tokens_used,
            finish_reason: Some("stop".to_string()),
        })
    }

    async fn count_tokens(&self, text: &str) -> usize {
        estimate_tokens(text)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

//! Provider error types.

use thiserror::Error;

/// Format an API error for display, unwrapping the message from a JSON body.
///
/// `"HTTP 429: {"error": {"message": "Slow down"}}"` becomes `"HTTP 429: Slow down"`.
/// Text without a parseable JSON body is returned unchanged.
#[must_use]
pub fn format_api_error(error: &str) -> String {
    let Some(json_start) = error.find('{') else {
        return error.to_string();
    };

    let message = serde_json::from_str::<serde_json::Value>(&error[json_start..])
        .ok()
        .and_then(|json| extract_error_message(&json));

    match message {
        Some(msg) => {
            let prefix = error[..json_start].trim();
            if prefix.is_empty() {
                msg
            } else {
                format!("{prefix} {msg}")
            }
        }
        None => error.to_string(),
    }
}

/// Pull a readable message out of the error body shapes gateways return:
/// `{"error": {"message", "code" | "status"}}`, `{"error": "..."}`, `{"message": "..."}`
/// and FastAPI-style `{"detail": "..."}`.
fn extract_error_message(json: &serde_json::Value) -> Option<String> {
    if let Some(error_obj) = json.get("error") {
        if let Some(msg) = error_obj.get("message").and_then(|v| v.as_str()) {
            let qualifier = error_obj
                .get("code")
                .and_then(|v| v.as_str())
                .map(|code| format!(" (code: {code})"))
                .or_else(|| {
                    error_obj
                        .get("status")
                        .and_then(|v| v.as_str())
                        .map(|status| format!(" (status: {status})"))
                })
                .unwrap_or_default();
            return Some(format!("{msg}{qualifier}"));
        }
        if let Some(msg) = error_obj.as_str() {
            return Some(msg.to_string());
        }
    }

    ["message", "detail"]
        .iter()
        .find_map(|key| json.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing API key for {backend}. Set one of: {}", env_vars.join(", "))]
    MissingApiKey {
        backend: String,
        env_vars: Vec<String>,
    },

    #[error("API error: {0}")]
    Api(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limited, retry after {retry_after:?}s")]
    RateLimited { retry_after: Option<u64> },

    #[error("Unsupported by {backend}: {operation}")]
    Unsupported { backend: String, operation: String },
}

impl Error {
    /// Whether the failure is transient and the request may be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::MissingApiKey { .. } | Self::Api(_) | Self::Unsupported { .. } => false,
        }
    }

    /// Human-readable message with JSON error bodies unwrapped.
    #[must_use]
    pub fn display_message(&self) -> String {
        format_api_error(&self.to_string())
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] crate::provider::Error),

    #[error("Compression error: {0}")]
    Compression(#[from] crate::compression::CompressionError),

    #[error("Tool error: {0}")]
    Tool(#[from] crate::tool::ToolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

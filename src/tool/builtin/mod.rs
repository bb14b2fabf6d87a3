//! The six compression tools.

mod compress_context;
mod extract_essence;
mod progressive;
mod summarize;
mod summarize_diff;
mod unify;

pub use compress_context::CompressContextTool;
pub use extract_essence::ExtractEssenceTool;
pub use progressive::ProgressiveCompressTool;
pub use summarize::SummarizeTool;
pub use summarize_diff::SummarizeDiffTool;
pub use unify::UnifySummariesTool;

#[cfg(test)]
pub(crate) fn test_context() -> crate::tool::ToolContext {
    use crate::compression::CompressionEngine;
    use crate::config::Config;
    use crate::provider::MockClient;
    use std::sync::Arc;

    let config = Config::for_testing();
    let engine = CompressionEngine::new(Arc::new(MockClient::new()), &config.llm);
    crate::tool::ToolContext::new(Arc::new(engine), config.summarization)
}

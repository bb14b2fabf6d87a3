use crate::compression::CompressionStyle;
use crate::tool::{Tool, ToolContext, ToolError, parse_args};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

pub struct SummarizeTool;

#[derive(Deserialize)]
struct Args {
    text: String,
    max_tokens: Option<usize>,
    style: Option<String>,
    #[serde(default)]
    preserve: Vec<String>,
}

#[async_trait]
impl Tool for SummarizeTool {
    fn name(&self) -> &str {
        "summarize"
    }

    fn description(&self) -> &str {
        "Summarize text in the requested style"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "Text to summarize"
                },
                "max_tokens": {
                    "type": "integer",
                    "description": "Maximum tokens in the summary (default: 500)"
                },
                "style": {
                    "type": "string",
                    "enum": ["concise", "detailed", "bullet", "code_aware"],
                    "description": "Summary style (default: concise)"
                },
                "preserve": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Terms the summary must keep"
                }
            },
            "required": ["text"]
        })
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<serde_json::Value, ToolError> {
        let args: Args = parse_args(args)?;
        let style: CompressionStyle = args
            .style
            .as_deref()
            .unwrap_or(ctx.summarization.default_style.as_str())
            .parse()?;
        let max_tokens = args
            .max_tokens
            .unwrap_or(ctx.summarization.default_max_tokens);

        let result = ctx
            .engine
            .summarize(&args.text, max_tokens, style, args.preserve)
            .await?;

        Ok(json!({
            "summary": result.compressed_text,
            "original_tokens": result.original_tokens,
            "compressed_tokens": result.compressed_tokens,
            "compression_ratio": result.compression_ratio,
            "savings_percent": result.savings_percent(),
            "quality_score": result.quality_score,
        }))
    }
}

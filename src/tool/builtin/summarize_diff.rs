use crate::tool::{Tool, ToolContext, ToolError, parse_args};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

pub struct SummarizeDiffTool;

#[derive(Deserialize)]
struct Args {
    before: String,
    after: String,
    focus: Option<String>,
}

#[async_trait]
impl Tool for SummarizeDiffTool {
    fn name(&self) -> &str {
        "summarize_diff"
    }

    fn description(&self) -> &str {
        "Summarize the differences between two versions of a text"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "before": {
                    "type": "string",
                    "description": "Original version"
                },
                "after": {
                    "type": "string",
                    "description": "Modified version"
                },
                "focus": {
                    "type": "string",
                    "description": "Aspect to focus on, e.g. \"breaking changes\""
                }
            },
            "required": ["before", "after"]
        })
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<serde_json::Value, ToolError> {
        let args: Args = parse_args(args)?;
        let result = ctx
            .engine
            .summarize_diff(&args.before, &args.after, args.focus.clone())
            .await?;

        Ok(json!({
            "diff_summary": result.compressed_text,
            "original_tokens": result.original_tokens,
            "compressed_tokens": result.compressed_tokens,
            "focus": args.focus,
        }))
    }
}

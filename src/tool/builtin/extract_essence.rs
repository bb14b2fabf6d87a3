use crate::tool::{Tool, ToolContext, ToolError, parse_args};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

pub struct ExtractEssenceTool;

#[derive(Deserialize)]
struct Args {
    document: String,
    focus_areas: Option<Vec<String>>,
}

#[async_trait]
impl Tool for ExtractEssenceTool {
    fn name(&self) -> &str {
        "extract_essence"
    }

    fn description(&self) -> &str {
        "Extract the essential information from a document"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "document": {
                    "type": "string",
                    "description": "Document to analyze"
                },
                "focus_areas": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Areas to prioritise during extraction"
                }
            },
            "required": ["document"]
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
            .extract_essence(&args.document, args.focus_areas.clone().unwrap_or_default())
            .await?;

        // focus_areas echoes the argument as given, null when omitted.
        Ok(json!({
            "essence": result.compressed_text,
            "original_tokens": result.original_tokens,
            "compressed_tokens": result.compressed_tokens,
            "focus_areas": args.focus_areas,
        }))
    }
}

use crate::compression::Document;
use crate::tool::{Tool, ToolContext, ToolError, parse_args};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

pub struct UnifySummariesTool;

#[derive(Deserialize)]
struct Args {
    documents: Vec<Document>,
    purpose: String,
}

#[async_trait]
impl Tool for UnifySummariesTool {
    fn name(&self) -> &str {
        "unify_summaries"
    }

    fn description(&self) -> &str {
        "Merge several documents into one coherent summary"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "documents": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "content": { "type": "string" },
                            "metadata": { "type": "object" }
                        },
                        "required": ["title", "content"]
                    },
                    "description": "Documents to merge"
                },
                "purpose": {
                    "type": "string",
                    "description": "What the unified summary is for"
                }
            },
            "required": ["documents", "purpose"]
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
            .unify_summaries(&args.documents, &args.purpose)
            .await?;

        Ok(json!({
            "unified_summary": result.compressed_text,
            "original_tokens": result.original_tokens,
            "compressed_tokens": result.compressed_tokens,
            "document_count": args.documents.len(),
            "purpose": args.purpose,
        }))
    }
}

use crate::compression::{ProgressiveStage, compression_ratio};
use crate::tool::{Tool, ToolContext, ToolError, parse_args};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

pub struct ProgressiveCompressTool;

#[derive(Deserialize)]
struct Args {
    text: String,
    stages: Vec<ProgressiveStage>,
}

#[async_trait]
impl Tool for ProgressiveCompressTool {
    fn name(&self) -> &str {
        "progressive_compress"
    }

    fn description(&self) -> &str {
        "Compress text through several stages, each working on the previous output"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "Text to compress"
                },
                "stages": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "target_ratio": { "type": "number" },
                            "preserve": {
                                "type": "array",
                                "items": { "type": "string" }
                            }
                        },
                        "required": ["target_ratio"]
                    },
                    "description": "Stages applied in order"
                }
            },
            "required": ["text", "stages"]
        })
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<serde_json::Value, ToolError> {
        let args: Args = parse_args(args)?;
        let results = ctx
            .engine
            .progressive_compress(&args.text, &args.stages)
            .await?;

        let stages: Vec<_> = results
            .iter()
            .enumerate()
            .map(|(i, r)| {
                json!({
                    "stage": i + 1,
                    "compressed_text": r.compressed_text,
                    "compression_ratio": r.compression_ratio,
                    "tokens": r.compressed_tokens,
                })
            })
            .collect();

        let (final_text, overall) = match (results.first(), results.last()) {
            (Some(first), Some(last)) => (
                last.compressed_text.clone(),
                compression_ratio(last.compressed_tokens, first.original_tokens),
            ),
            _ => (args.text, 1.0),
        };

        Ok(json!({
            "final_text": final_text,
            "stages": stages,
            "total_stages": results.len(),
            "overall_compression": overall,
        }))
    }
}

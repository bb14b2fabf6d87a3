use crate::tool::{Tool, ToolContext, ToolError, parse_args};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

const DEFAULT_TARGET_TOKENS: usize = 500;

pub struct CompressContextTool;

#[derive(Deserialize)]
struct Args {
    full_context: String,
    task_description: String,
    #[serde(default = "default_target_tokens")]
    target_tokens: usize,
}

fn default_target_tokens() -> usize {
    DEFAULT_TARGET_TOKENS
}

#[async_trait]
impl Tool for CompressContextTool {
    fn name(&self) -> &str {
        "compress_context"
    }

    fn description(&self) -> &str {
        "Compress a context down to what a specific task needs"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "full_context": {
                    "type": "string",
                    "description": "Full context to compress"
                },
                "task_description": {
                    "type": "string",
                    "description": "The task the context will be used for"
                },
                "target_tokens": {
                    "type": "integer",
                    "description": "Target token count (default: 500)"
                }
            },
            "required": ["full_context", "task_description"]
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
            .compress_context(&args.full_context, &args.task_description, args.target_tokens)
            .await?;

        Ok(json!({
            "compressed_context": result.compressed_text,
            "original_tokens": result.original_tokens,
            "compressed_tokens": result.compressed_tokens,
            "compression_ratio": result.compression_ratio,
            "task": args.task_description,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::builtin::test_context;

    #[tokio::test]
    async fn test_compress_context_shape() {
        let out = CompressContextTool
            .execute(
                json!({
                    "full_context": "The login handler validates passwords with bcrypt. \
                        The billing module talks to the payment provider over HTTPS.",
                    "task_description": "fix the login bug",
                }),
                &test_context(),
            )
            .await
            .unwrap();

        assert_eq!(out["task"], "fix the login bug");
        assert!(out["compressed_context"].is_string());
        assert!(out["compression_ratio"].is_number());
        assert!(out["original_tokens"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_huge_target_does_not_overflow() {
        let out = CompressContextTool
            .execute(
                json!({
                    "full_context": "The login handler validates passwords with bcrypt.",
                    "task_description": "fix the login bug",
                    "target_tokens": u64::MAX,
                }),
                &test_context(),
            )
            .await
            .unwrap();
        assert!(out["compressed_context"].is_string());
    }

    #[tokio::test]
    async fn test_requires_task() {
        let err = CompressContextTool
            .execute(json!({ "full_context": "ctx" }), &test_context())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgs(ref msg) if msg.contains("task_description")));
    }
}

pub mod builtin;
pub mod types;

pub use types::*;

use std::collections::HashMap;

/// Name → tool lookup for the compression tool surface.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register_tool(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub async fn call_tool(
        &self,
        name: &str,
        args: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<serde_json::Value, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        tracing::debug!(tool = name, "Calling tool");
        let result = tool.execute(args, ctx).await;
        if let Err(e) = &result {
            tracing::warn!(tool = name, error = %e, "Tool call failed");
        }
        result
    }

    /// Registered tools, sorted by name.
    pub fn list_tools(&self) -> Vec<&dyn Tool> {
        let mut tools: Vec<&dyn Tool> = self.tools.values().map(|t| t.as_ref()).collect();
        tools.sort_by(|a, b| a.name().cmp(b.name()));
        tools
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_tool(Box::new(builtin::SummarizeTool));
        registry.register_tool(Box::new(builtin::CompressContextTool));
        registry.register_tool(Box::new(builtin::ExtractEssenceTool));
        registry.register_tool(Box::new(builtin::UnifySummariesTool));
        registry.register_tool(Box::new(builtin::SummarizeDiffTool));
        registry.register_tool(Box::new(builtin::ProgressiveCompressTool));
        registry
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

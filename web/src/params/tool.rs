use domain::ToolArgs;
use serde::Deserialize;

/// Body of `POST /mcp`, e.g. `{"tool": "math", "args": {"operation": "add", "a": 5, "b": 3}}`.
#[derive(Debug, Deserialize)]
pub struct ToolRequest {
    /// A missing name is reported as an unknown tool rather than a parse error.
    #[serde(default)]
    pub tool: String,
    /// Absent or `null` args behave like an empty object.
    #[serde(default)]
    pub args: Option<ToolArgs>,
}

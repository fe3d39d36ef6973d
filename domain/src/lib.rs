//! Request-level logic of the MCP SSE server: tool dispatch and the error
//! type shared by everything the web layer calls.

pub mod error;
pub mod tool;

pub use tool::{invoke as invoke_tool, Args as ToolArgs, Tool};

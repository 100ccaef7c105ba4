//! Tool wrappers for LLM tool-calling loops
//!
//! A [`ToolSet`] turns action schemas into [`Tool`]s whose execution callback
//! goes through any [`ExecutionBackend`](composio_core::ExecutionBackend),
//! and feeds model tool calls back through the same path.

pub mod entity;
pub mod error;
pub mod tool;
pub mod toolset;

pub use entity::Entity;
pub use error::{ToolError, ToolResult};
pub use tool::{FunctionDefinition, Tool, ToolCall, ToolCallOutput, ToolDefinition};
pub use toolset::ToolSet;

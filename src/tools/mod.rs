//! Tool system for session analysis
//!
//! This module provides:
//! - `Tool` trait - Interface for implementing tools
//! - `ToolResult` - Result type for tool execution
//! - `ToolRegistry` - Registry for managing available tools
//! - `session_tools` - Read-only tools over a loaded session

mod registry;
mod tool;

pub mod session_tools;

pub use registry::ToolRegistry;
pub use session_tools::session_tool_registry;
pub use tool::{Tool, ToolResult};

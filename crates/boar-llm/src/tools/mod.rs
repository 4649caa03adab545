//! Tool system for the Agent Surface's tool-calling loop.
//!
//! Defines the `Tool` trait every handler implements, plus a registry for
//! converting them to LLM API tool definitions.

pub mod get_attendance_record;
pub mod get_company_policy;
pub mod get_employee_info;
pub mod get_leave_balance;
pub mod get_payroll_summary;
pub mod link_identity;
pub mod list_my_tasks;
pub mod request_leave;
pub mod tool_loop;
pub mod unlink_identity;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::provider::ToolDefinition;

/// Result of executing a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Text content returned to the LLM.
    pub content: String,
    /// Whether the tool execution failed.
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: message.into(),
            is_error: true,
        }
    }
}

/// Trait every ERP-backed tool implements.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn input_schema(&self) -> serde_json::Value;
    async fn execute(&self, input: serde_json::Value) -> ToolResult;
}

/// Static catalog of the tool roster (name, description), for `/health`-style
/// introspection without needing a live gateway.
pub fn tool_catalog() -> Vec<(&'static str, &'static str)> {
    vec![
        ("get_employee_info", "Look up an employee's HR profile"),
        ("get_leave_balance", "Get an employee's remaining leave balance"),
        ("request_leave", "Submit a leave request for an employee"),
        ("get_payroll_summary", "Summarize an employee's recent payroll"),
        ("get_attendance_record", "Fetch an employee's attendance log"),
        ("list_my_tasks", "List open tasks assigned to an employee"),
        ("get_company_policy", "Look up a company policy document"),
        ("link_identity", "Start binding a chat identity to an ERP employee"),
        ("unlink_identity", "Remove a chat identity's ERP binding"),
    ]
}

/// Converts a slice of tools to API-level tool definitions.
pub fn to_definitions(tools: &[Box<dyn Tool>]) -> Vec<ToolDefinition> {
    tools
        .iter()
        .map(|t| ToolDefinition {
            name: t.name().to_string(),
            description: t.description().to_string(),
            input_schema: t.input_schema(),
        })
        .collect()
}

use std::sync::Arc;

use async_trait::async_trait;
use boar_erp::ErpGateway;
use serde_json::json;

use super::{Tool, ToolResult};

pub struct GetEmployeeInfo {
    erp: Arc<ErpGateway>,
}

impl GetEmployeeInfo {
    pub fn new(erp: Arc<ErpGateway>) -> Self {
        Self { erp }
    }
}

#[async_trait]
impl Tool for GetEmployeeInfo {
    fn name(&self) -> &str {
        "get_employee_info"
    }

    fn description(&self) -> &str {
        "Look up an employee's HR profile (job title, department, manager, work email)."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "employee_id": {"type": "integer", "description": "hr.employee record id"},
            },
            "required": ["employee_id"],
        })
    }

    async fn execute(&self, input: serde_json::Value) -> ToolResult {
        let Some(employee_id) = input.get("employee_id").and_then(|v| v.as_i64()) else {
            return ToolResult::error("employee_id is required");
        };

        if self.erp.require_model("hr.employee").await.is_err() {
            return ToolResult::error("the employee directory module is not installed");
        }

        let fields = vec!["name", "job_title", "department_id", "parent_id", "work_email"];
        match self.erp.read("hr.employee", vec![employee_id], fields).await {
            Ok(rows) => match rows.into_iter().next() {
                Some(row) => ToolResult::success(row.to_string()),
                None => ToolResult::error(format!("no employee found with id {employee_id}")),
            },
            Err(e) => ToolResult::error(e.to_string()),
        }
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use boar_erp::ErpGateway;
use serde_json::json;

use super::{Tool, ToolResult};

pub struct GetLeaveBalance {
    erp: Arc<ErpGateway>,
}

impl GetLeaveBalance {
    pub fn new(erp: Arc<ErpGateway>) -> Self {
        Self { erp }
    }
}

#[async_trait]
impl Tool for GetLeaveBalance {
    fn name(&self) -> &str {
        "get_leave_balance"
    }

    fn description(&self) -> &str {
        "Get an employee's remaining leave balance, optionally filtered by leave type."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "employee_id": {"type": "integer"},
                "leave_type": {"type": "string", "description": "optional hr.leave.type name filter"},
            },
            "required": ["employee_id"],
        })
    }

    async fn execute(&self, input: serde_json::Value) -> ToolResult {
        let Some(employee_id) = input.get("employee_id").and_then(|v| v.as_i64()) else {
            return ToolResult::error("employee_id is required");
        };

        if self.erp.require_model("hr.leave").await.is_err() {
            return ToolResult::error("the leave management module is not installed");
        }

        let mut domain = json!([["employee_id", "=", employee_id], ["state", "=", "validate"]]);
        if let Some(leave_type) = input.get("leave_type").and_then(|v| v.as_str()) {
            if let Some(arr) = domain.as_array_mut() {
                arr.push(json!(["holiday_status_id.name", "=", leave_type]));
            }
        }

        match self
            .erp
            .search_read("hr.leave", domain, vec!["holiday_status_id", "number_of_days"], None, None, None)
            .await
        {
            Ok(rows) => ToolResult::success(json!({ "approved_leaves": rows }).to_string()),
            Err(e) => ToolResult::error(e.to_string()),
        }
    }
}

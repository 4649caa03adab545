use std::sync::Arc;

use async_trait::async_trait;
use boar_erp::ErpGateway;
use serde_json::json;

use super::{Tool, ToolResult};

pub struct GetAttendanceRecord {
    erp: Arc<ErpGateway>,
}

impl GetAttendanceRecord {
    pub fn new(erp: Arc<ErpGateway>) -> Self {
        Self { erp }
    }
}

#[async_trait]
impl Tool for GetAttendanceRecord {
    fn name(&self) -> &str {
        "get_attendance_record"
    }

    fn description(&self) -> &str {
        "Fetch an employee's recent check-in/check-out attendance log."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "employee_id": {"type": "integer"},
                "limit": {"type": "integer", "description": "max rows, default 10"},
            },
            "required": ["employee_id"],
        })
    }

    async fn execute(&self, input: serde_json::Value) -> ToolResult {
        let Some(employee_id) = input.get("employee_id").and_then(|v| v.as_i64()) else {
            return ToolResult::error("employee_id is required");
        };
        let limit = input.get("limit").and_then(|v| v.as_i64()).unwrap_or(10);

        if self.erp.require_model("hr.attendance").await.is_err() {
            return ToolResult::error("the attendance module is not installed");
        }

        let domain = json!([["employee_id", "=", employee_id]]);
        match self
            .erp
            .search_read(
                "hr.attendance",
                domain,
                vec!["check_in", "check_out"],
                Some(limit),
                None,
                Some("check_in desc"),
            )
            .await
        {
            Ok(rows) => ToolResult::success(json!({ "records": rows }).to_string()),
            Err(e) => ToolResult::error(e.to_string()),
        }
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use boar_erp::ErpGateway;
use serde_json::json;

use super::{Tool, ToolResult};

pub struct RequestLeave {
    erp: Arc<ErpGateway>,
}

impl RequestLeave {
    pub fn new(erp: Arc<ErpGateway>) -> Self {
        Self { erp }
    }
}

#[async_trait]
impl Tool for RequestLeave {
    fn name(&self) -> &str {
        "request_leave"
    }

    fn description(&self) -> &str {
        "Submit a leave request for an employee over a date range."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "employee_id": {"type": "integer"},
                "date_from": {"type": "string", "description": "ISO-8601 start date"},
                "date_to": {"type": "string", "description": "ISO-8601 end date"},
                "reason": {"type": "string"},
            },
            "required": ["employee_id", "date_from", "date_to"],
        })
    }

    async fn execute(&self, input: serde_json::Value) -> ToolResult {
        let (Some(employee_id), Some(date_from), Some(date_to)) = (
            input.get("employee_id").and_then(|v| v.as_i64()),
            input.get("date_from").and_then(|v| v.as_str()),
            input.get("date_to").and_then(|v| v.as_str()),
        ) else {
            return ToolResult::error("employee_id, date_from and date_to are required");
        };

        if self.erp.require_model("hr.leave").await.is_err() {
            return ToolResult::error("the leave management module is not installed");
        }

        let values = json!({
            "employee_id": employee_id,
            "date_from": date_from,
            "date_to": date_to,
            "name": input.get("reason").and_then(|v| v.as_str()).unwrap_or("Requested via chat"),
        });

        match self.erp.create("hr.leave", values).await {
            Ok(id) => ToolResult::success(json!({ "leave_id": id, "state": "pending approval" }).to_string()),
            Err(e) => ToolResult::error(e.to_string()),
        }
    }
}

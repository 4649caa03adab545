use std::sync::Arc;

use async_trait::async_trait;
use boar_erp::ErpGateway;
use serde_json::json;

use super::{Tool, ToolResult};

pub struct GetPayrollSummary {
    erp: Arc<ErpGateway>,
}

impl GetPayrollSummary {
    pub fn new(erp: Arc<ErpGateway>) -> Self {
        Self { erp }
    }
}

#[async_trait]
impl Tool for GetPayrollSummary {
    fn name(&self) -> &str {
        "get_payroll_summary"
    }

    fn description(&self) -> &str {
        "Summarize an employee's recent contract and compensation details."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "employee_id": {"type": "integer"},
            },
            "required": ["employee_id"],
        })
    }

    async fn execute(&self, input: serde_json::Value) -> ToolResult {
        let Some(employee_id) = input.get("employee_id").and_then(|v| v.as_i64()) else {
            return ToolResult::error("employee_id is required");
        };

        if self.erp.require_model("hr.contract").await.is_err() {
            return ToolResult::error("the contract module is not installed");
        }

        let domain = json!([["employee_id", "=", employee_id], ["state", "=", "open"]]);
        match self
            .erp
            .search_read("hr.contract", domain, vec!["name", "wage", "date_start", "date_end"], Some(1), None, None)
            .await
        {
            Ok(rows) => match rows.into_iter().next() {
                Some(row) => ToolResult::success(row.to_string()),
                None => ToolResult::error(format!("no active contract found for employee {employee_id}")),
            },
            Err(e) => ToolResult::error(e.to_string()),
        }
    }
}

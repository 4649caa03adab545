use std::sync::Arc;

use async_trait::async_trait;
use boar_erp::ErpGateway;
use serde_json::json;

use super::{Tool, ToolResult};

pub struct ListMyTasks {
    erp: Arc<ErpGateway>,
}

impl ListMyTasks {
    pub fn new(erp: Arc<ErpGateway>) -> Self {
        Self { erp }
    }
}

#[async_trait]
impl Tool for ListMyTasks {
    fn name(&self) -> &str {
        "list_my_tasks"
    }

    fn description(&self) -> &str {
        "List open project tasks assigned to an employee, ordered by deadline then priority."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "employee_id": {"type": "integer"},
                "limit": {"type": "integer", "description": "max rows, default 20"},
            },
            "required": ["employee_id"],
        })
    }

    async fn execute(&self, input: serde_json::Value) -> ToolResult {
        let Some(employee_id) = input.get("employee_id").and_then(|v| v.as_i64()) else {
            return ToolResult::error("employee_id is required");
        };
        let limit = input.get("limit").and_then(|v| v.as_i64()).unwrap_or(20);

        if self.erp.require_model("project.task").await.is_err() {
            return ToolResult::error("the project task module is not installed");
        }

        let domain = json!([
            ["user_ids", "in", [employee_id]],
            ["stage_id.is_closed", "=", false],
        ]);

        match self
            .erp
            .search_read(
                "project.task",
                domain,
                vec!["name", "date_deadline", "priority", "stage_id"],
                Some(limit),
                None,
                Some("date_deadline asc, priority desc"),
            )
            .await
        {
            Ok(rows) => ToolResult::success(json!({ "tasks": rows }).to_string()),
            Err(e) => ToolResult::error(e.to_string()),
        }
    }
}

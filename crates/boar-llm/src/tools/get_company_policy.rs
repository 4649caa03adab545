use std::sync::Arc;

use async_trait::async_trait;
use boar_erp::ErpGateway;
use serde_json::json;

use super::{Tool, ToolResult};

pub struct GetCompanyPolicy {
    erp: Arc<ErpGateway>,
}

impl GetCompanyPolicy {
    pub fn new(erp: Arc<ErpGateway>) -> Self {
        Self { erp }
    }
}

#[async_trait]
impl Tool for GetCompanyPolicy {
    fn name(&self) -> &str {
        "get_company_policy"
    }

    fn description(&self) -> &str {
        "Look up a company policy document by keyword (e.g. \"remote work\", \"expense reimbursement\")."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "keyword": {"type": "string"},
            },
            "required": ["keyword"],
        })
    }

    async fn execute(&self, input: serde_json::Value) -> ToolResult {
        let Some(keyword) = input.get("keyword").and_then(|v| v.as_str()) else {
            return ToolResult::error("keyword is required");
        };

        if self.erp.require_model("knowledge.article").await.is_err() {
            return ToolResult::error("the knowledge base module is not installed");
        }

        let domain = json!([["name", "ilike", keyword]]);
        match self
            .erp
            .search_read("knowledge.article", domain, vec!["name", "body"], Some(3), None, None)
            .await
        {
            Ok(rows) if rows.is_empty() => {
                ToolResult::error(format!("no policy found matching \"{keyword}\""))
            }
            Ok(rows) => ToolResult::success(json!({ "articles": rows }).to_string()),
            Err(e) => ToolResult::error(e.to_string()),
        }
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use super::link_identity::IdentityLinker;
use super::{Tool, ToolResult};

pub struct UnlinkIdentity {
    linker: Arc<dyn IdentityLinker>,
}

impl UnlinkIdentity {
    pub fn new(linker: Arc<dyn IdentityLinker>) -> Self {
        Self { linker }
    }
}

#[async_trait]
impl Tool for UnlinkIdentity {
    fn name(&self) -> &str {
        "unlink_identity"
    }

    fn description(&self) -> &str {
        "Remove this chat identity's binding to its ERP employee record."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "external_id": {"type": "string"},
            },
            "required": ["external_id"],
        })
    }

    async fn execute(&self, input: serde_json::Value) -> ToolResult {
        let Some(external_id) = input.get("external_id").and_then(|v| v.as_str()) else {
            return ToolResult::error("external_id is required");
        };
        match self.linker.unlink(external_id).await {
            Ok(()) => ToolResult::success("your identity has been unlinked"),
            Err(e) => ToolResult::error(e),
        }
    }
}

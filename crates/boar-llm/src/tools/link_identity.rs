use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use super::{Tool, ToolResult};

/// Narrow seam onto the OTP authenticator so the tool registry doesn't need
/// a direct dependency on it — the concrete binding is wired at startup.
#[async_trait]
pub trait IdentityLinker: Send + Sync {
    async fn link_start(&self, external_id: &str, work_email: &str) -> Result<(), String>;
    async fn unlink(&self, external_id: &str) -> Result<(), String>;
}

pub struct LinkIdentity {
    linker: Arc<dyn IdentityLinker>,
}

impl LinkIdentity {
    pub fn new(linker: Arc<dyn IdentityLinker>) -> Self {
        Self { linker }
    }
}

#[async_trait]
impl Tool for LinkIdentity {
    fn name(&self) -> &str {
        "link_identity"
    }

    fn description(&self) -> &str {
        "Start binding this chat identity to an ERP employee by sending a one-time code to their work email."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "external_id": {"type": "string"},
                "work_email": {"type": "string"},
            },
            "required": ["external_id", "work_email"],
        })
    }

    async fn execute(&self, input: serde_json::Value) -> ToolResult {
        let (Some(external_id), Some(work_email)) = (
            input.get("external_id").and_then(|v| v.as_str()),
            input.get("work_email").and_then(|v| v.as_str()),
        ) else {
            return ToolResult::error("external_id and work_email are required");
        };

        match self.linker.link_start(external_id, work_email).await {
            Ok(()) => ToolResult::success("a one-time code has been sent to your work email"),
            Err(e) => ToolResult::error(e),
        }
    }
}

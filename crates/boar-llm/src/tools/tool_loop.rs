//! Tool execution loop — the core agentic behavior.
//!
//! Flow: prompt → LLM → if tool_use → execute tools → inject results → LLM → repeat
//! Stops when: stop_reason is not "tool_use", the iteration cap is reached, or an error occurs.

use tracing::{debug, info, warn};

use crate::provider::{ChatRequest, ChatResponse, LlmProvider, ToolCall};

use super::{Tool, ToolResult};

/// Maximum tool loop iterations before giving up and returning whatever text
/// the model last produced.
const MAX_ITERATIONS: usize = 5;

/// Runs the tool execution loop to completion.
///
/// `context` supplies default values (e.g. a resolved `employee_id`) used to
/// fill in required tool parameters the model omits — this is what lets a
/// handler declare `employee_id` as required without forcing every prompt to
/// repeat it.
pub async fn run_tool_loop(
    provider: &dyn LlmProvider,
    initial_request: ChatRequest,
    tools: &[Box<dyn Tool>],
    context: &serde_json::Value,
) -> Result<ChatResponse, crate::provider::ProviderError> {
    let mut raw_messages: Vec<serde_json::Value> =
        if let Some(ref raw) = initial_request.raw_messages {
            raw.clone()
        } else {
            initial_request
                .messages
                .iter()
                .map(|m| serde_json::json!({ "role": m.role, "content": m.content }))
                .collect()
        };

    let mut last_response: Option<ChatResponse> = None;

    for iteration in 0..MAX_ITERATIONS {
        let mut req = initial_request.clone();
        req.raw_messages = Some(raw_messages.clone());

        debug!(iteration, "tool loop iteration");

        let response = provider.send(&req).await?;

        if response.tool_calls.is_empty() || response.stop_reason != "tool_use" {
            info!(iteration, "tool loop complete — no more tool calls");
            return Ok(response);
        }

        let mut assistant_content: Vec<serde_json::Value> = Vec::new();

        if !response.content.is_empty() {
            assistant_content.push(serde_json::json!({
                "type": "text",
                "text": response.content,
            }));
        }

        for call in &response.tool_calls {
            assistant_content.push(serde_json::json!({
                "type": "tool_use",
                "id": call.id,
                "name": call.name,
                "input": call.input,
            }));
        }

        raw_messages.push(serde_json::json!({
            "role": "assistant",
            "content": assistant_content,
        }));

        let mut tool_result_content: Vec<serde_json::Value> = Vec::new();

        for call in &response.tool_calls {
            let resolved = resolve_arguments(call, tools, context);
            let result = execute_tool(tools, &call.name, resolved).await;
            tool_result_content.push(serde_json::json!({
                "type": "tool_result",
                "tool_use_id": call.id,
                "content": result.content,
                "is_error": result.is_error,
            }));
        }

        raw_messages.push(serde_json::json!({
            "role": "user",
            "content": tool_result_content,
        }));

        last_response = Some(response);
    }

    warn!(
        max_iterations = MAX_ITERATIONS,
        "tool loop hit the iteration cap"
    );

    match last_response {
        Some(resp) if !resp.content.is_empty() => Ok(resp),
        Some(mut resp) => {
            resp.content = generic_apology();
            Ok(resp)
        }
        None => Err(crate::provider::ProviderError::Parse(format!(
            "tool loop exceeded {MAX_ITERATIONS} iterations without a response"
        ))),
    }
}

fn generic_apology() -> String {
    "I wasn't able to finish that request — please try rephrasing or ask something more specific.".to_string()
}

/// Fills in any required parameter missing from the model's tool call
/// arguments using the caller-supplied context (e.g. `employee_id`).
fn resolve_arguments(call: &ToolCall, tools: &[Box<dyn Tool>], context: &serde_json::Value) -> serde_json::Value {
    let mut input = call.input.clone();
    let Some(tool) = tools.iter().find(|t| t.name() == call.name) else {
        return input;
    };
    let schema = tool.input_schema();
    let required = schema
        .get("required")
        .and_then(|r| r.as_array())
        .cloned()
        .unwrap_or_default();

    if let (Some(obj), Some(ctx_obj)) = (input.as_object_mut(), context.as_object()) {
        for field in required {
            let Some(name) = field.as_str() else { continue };
            let missing = !obj.contains_key(name) || obj.get(name).is_some_and(|v| v.is_null());
            if missing {
                if let Some(default) = ctx_obj.get(name) {
                    obj.insert(name.to_string(), default.clone());
                }
            }
        }
    }

    input
}

async fn execute_tool(tools: &[Box<dyn Tool>], name: &str, input: serde_json::Value) -> ToolResult {
    match tools.iter().find(|t| t.name() == name) {
        Some(tool) => {
            debug!(tool = %name, "executing tool");
            tool.execute(input).await
        }
        None => ToolResult::error(format!("unknown tool: {name}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "get_leave_balance"
        }
        fn description(&self) -> &str {
            "test tool"
        }
        fn input_schema(&self) -> serde_json::Value {
            json!({
                "type": "object",
                "properties": { "employee_id": {"type": "integer"} },
                "required": ["employee_id"],
            })
        }
        async fn execute(&self, input: serde_json::Value) -> ToolResult {
            ToolResult::success(input.to_string())
        }
    }

    #[test]
    fn fills_missing_required_param_from_context() {
        let tools: Vec<Box<dyn Tool>> = vec![Box::new(EchoTool)];
        let call = ToolCall {
            id: "call_1".into(),
            name: "get_leave_balance".into(),
            input: json!({}),
        };
        let context = json!({ "employee_id": 42 });
        let resolved = resolve_arguments(&call, &tools, &context);
        assert_eq!(resolved["employee_id"], 42);
    }

    #[test]
    fn does_not_override_an_explicit_argument() {
        let tools: Vec<Box<dyn Tool>> = vec![Box::new(EchoTool)];
        let call = ToolCall {
            id: "call_1".into(),
            name: "get_leave_balance".into(),
            input: json!({ "employee_id": 7 }),
        };
        let context = json!({ "employee_id": 42 });
        let resolved = resolve_arguments(&call, &tools, &context);
        assert_eq!(resolved["employee_id"], 7);
    }
}

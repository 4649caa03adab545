use std::sync::Arc;

use boar_core::{BoarError, Result};
use tracing::warn;

use crate::language::{detect_language, Language};
use crate::memory::ConversationMemory;
use crate::provider::{ChatRequest, LlmProvider, Message, Role};
use crate::tools::tool_loop::run_tool_loop;
use crate::tools::{to_definitions, Tool};

/// The three entry points every caller (Agent Surface, Analytical Pipelines)
/// goes through instead of talking to `LlmProvider` directly.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    model: String,
    memory: ConversationMemory,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn LlmProvider>, model: String) -> Self {
        Self {
            provider,
            model,
            memory: ConversationMemory::default(),
        }
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Plain text completion, no tools, no structured output.
    pub async fn generate(&self, prompt: &str, system: Option<&str>, temperature: Option<f32>, max_tokens: u32) -> Result<String> {
        let mut req = ChatRequest::simple(self.model.clone(), system.unwrap_or_default(), prompt);
        req.temperature = temperature;
        req.max_tokens = max_tokens;
        let resp = self
            .provider
            .send(&req)
            .await
            .map_err(BoarError::from)?;
        Ok(resp.content)
    }

    /// Appends `data` as a fenced JSON block, forces a JSON-only system
    /// instruction, and parses the first well-formed JSON object in the
    /// reply. Raises `AiBadJson` on parse failure rather than panicking —
    /// callers are expected to fall back to a deterministic computation.
    pub async fn analyze_json(&self, prompt: &str, data: &serde_json::Value, system: &str) -> Result<serde_json::Value> {
        let full_system = format!(
            "{system}\n\nRespond with a single JSON object only. Do not include prose, \
             explanations, or markdown code fences."
        );
        let full_prompt = format!("{prompt}\n\n```json\n{}\n```", data);

        let req = ChatRequest::simple(self.model.clone(), full_system, full_prompt);
        let resp = self.provider.send(&req).await.map_err(BoarError::from)?;

        parse_first_json_object(&resp.content).ok_or_else(|| BoarError::AiBadJson {
            preview: preview(&resp.content),
        })
    }

    /// Runs the bounded tool-calling loop for a single conversational turn.
    ///
    /// `context` is merged into tool arguments the model leaves unset (e.g.
    /// a resolved `employee_id`); the bracketed suffix it appends to the
    /// user-visible message is how the model learns that default exists.
    pub async fn tool_call(
        &self,
        external_id: &str,
        user_message: &str,
        tools: &[Box<dyn Tool>],
        context: &serde_json::Value,
        system: &str,
    ) -> Result<String> {
        let lang = detect_language(user_message);
        let suffixed = append_context_hint(user_message, context);
        self.memory.append(external_id, Role::User, suffixed.clone());

        let mut raw_messages: Vec<serde_json::Value> = self
            .memory
            .messages(external_id)
            .into_iter()
            .map(|m| serde_json::json!({ "role": m.role, "content": m.content }))
            .collect();
        if raw_messages.is_empty() {
            raw_messages.push(serde_json::json!({ "role": "user", "content": suffixed }));
        }

        let request = ChatRequest {
            model: self.model.clone(),
            system: system_for_language(system, lang),
            messages: Vec::new(),
            max_tokens: 2048,
            temperature: None,
            tools: to_definitions(tools),
            raw_messages: Some(raw_messages),
        };

        let response = run_tool_loop(self.provider.as_ref(), request, tools, context)
            .await
            .map_err(|e| {
                warn!(error = %e, "tool loop failed");
                BoarError::from(e)
            })?;

        self.memory.append(external_id, Role::Assistant, response.content.clone());
        Ok(response.content)
    }
}

fn system_for_language(system: &str, lang: Language) -> String {
    match lang {
        Language::Arabic => format!("{system}\n\nReply in Arabic."),
        Language::English => format!("{system}\n\nReply in English."),
    }
}

fn append_context_hint(user_message: &str, context: &serde_json::Value) -> String {
    if let Some(employee_id) = context.get("employee_id") {
        format!("{user_message} [context: employee_id={employee_id}]")
    } else {
        user_message.to_string()
    }
}

/// Extracts the first balanced `{...}` span in `text`, stripping optional
/// leading/trailing markdown code fences, and parses it as JSON. Braces
/// inside string literals don't affect depth — an in-string flag, toggled on
/// unescaped `"`, is tracked alongside the backslash-escape state.
fn parse_first_json_object(text: &str) -> Option<serde_json::Value> {
    let stripped = text.trim().trim_start_matches("```json").trim_start_matches("```").trim_end_matches("```");
    let start = stripped.find('{')?;
    let bytes = stripped.as_bytes();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return serde_json::from_str(&stripped[start..=i]).ok();
                }
            }
            _ => {}
        }
    }
    None
}

fn preview(text: &str) -> String {
    text.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_wrapped_in_code_fence() {
        let text = "```json\n{\"status\": \"ok\", \"count\": 3}\n```";
        let parsed = parse_first_json_object(text).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["count"], 3);
    }

    #[test]
    fn parses_json_with_leading_prose() {
        let text = "Here is the analysis: {\"ok\": true}";
        let parsed = parse_first_json_object(text).unwrap();
        assert_eq!(parsed["ok"], true);
    }

    #[test]
    fn returns_none_for_unparseable_text() {
        assert!(parse_first_json_object("not json at all").is_none());
    }

    #[test]
    fn braces_inside_string_literals_do_not_affect_depth() {
        let text = r#"{"text": "a } b", "count": 1}"#;
        let parsed = parse_first_json_object(text).unwrap();
        assert_eq!(parsed["text"], "a } b");
        assert_eq!(parsed["count"], 1);
    }

    #[test]
    fn context_hint_is_appended_when_employee_id_present() {
        let context = serde_json::json!({ "employee_id": 42 });
        let hinted = append_context_hint("what's my leave balance", &context);
        assert!(hinted.contains("employee_id=42"));
    }
}

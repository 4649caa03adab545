use serde::{Deserialize, Serialize};
use std::fmt;

/// Channel-agnostic identifier for the human on the other end of a chat
/// session (e.g. a phone number, a Telegram user id, an email address).
/// Bound to an ERP employee via the OTP link flow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalId(pub String);

impl ExternalId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ExternalId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ExternalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// `hr.employee` record id in the ERP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub i64);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EmployeeId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Binding state of an external identity to an ERP employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    #[default]
    None,
    AwaitingCode,
    Bound,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkState::None => write!(f, "none"),
            LinkState::AwaitingCode => write!(f, "awaiting_code"),
            LinkState::Bound => write!(f, "bound"),
        }
    }
}

/// Normalized facts handed to the LLM Orchestrator by an analytical
/// pipeline. Derived fresh per request from live ERP reads; never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisEnvelope {
    pub pipeline: String,
    pub facts: serde_json::Value,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

impl AnalysisEnvelope {
    pub fn new(pipeline: impl Into<String>, facts: serde_json::Value) -> Self {
        Self {
            pipeline: pipeline.into(),
            facts,
            generated_at: chrono::Utc::now(),
        }
    }
}

/// Output of an analytical pipeline run: deterministic facts merged with
/// (when available) the model's qualitative insights. Held in process
/// memory keyed by `id`; no durable store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportArtifact {
    pub id: uuid::Uuid,
    pub report_type: String,
    pub period: Option<String>,
    pub facts: serde_json::Value,
    pub insights: serde_json::Value,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

impl ReportArtifact {
    pub fn new(report_type: impl Into<String>, period: Option<String>, facts: serde_json::Value, insights: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            report_type: report_type.into(),
            period,
            facts,
            insights,
            generated_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_id_from_str_roundtrips() {
        let id: ExternalId = "+15551234567".into();
        assert_eq!(id.as_str(), "+15551234567");
        assert_eq!(id.to_string(), "+15551234567");
    }

    #[test]
    fn link_state_defaults_to_none() {
        assert_eq!(LinkState::default(), LinkState::None);
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifies the emitting service in every envelope's `source` field.
const SOURCE: &str = "boar-gateway";

/// The envelope every webhook delivery carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub data: serde_json::Value,
}

impl WebhookEnvelope {
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self { event_type: event_type.into(), timestamp: Utc::now(), source: SOURCE.to_string(), data }
    }

    /// Canonical JSON bytes: object keys sorted, exactly what gets signed
    /// and posted. `#[derive(Serialize)]` writes struct fields in
    /// declaration order, so this goes through `serde_json::Value` first —
    /// its `Map` is `BTreeMap`-backed without the `preserve_order` feature,
    /// which is what actually sorts the keys.
    pub fn canonical_json(&self) -> serde_json::Result<Vec<u8>> {
        let value = serde_json::to_value(self)?;
        serde_json::to_vec(&value)
    }
}

/// Severity assigned to a contract-expiry or milestone notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

/// Urgency for a contract approaching or past its expiry date.
pub fn contract_expiry_urgency(days_remaining: i64) -> Urgency {
    if days_remaining <= 7 {
        Urgency::Critical
    } else if days_remaining <= 14 {
        Urgency::High
    } else if days_remaining <= 30 {
        Urgency::Medium
    } else {
        Urgency::Low
    }
}

/// Urgency for a delivery milestone. `days_until` is negative (or the
/// milestone is flagged overdue) once the due date has passed.
pub fn milestone_urgency(days_until: i64, overdue: bool) -> Urgency {
    if overdue || days_until < 0 {
        Urgency::Critical
    } else if days_until <= 1 {
        Urgency::High
    } else if days_until <= 3 {
        Urgency::Medium
    } else {
        Urgency::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_urgency_thresholds() {
        assert_eq!(contract_expiry_urgency(0), Urgency::Critical);
        assert_eq!(contract_expiry_urgency(7), Urgency::Critical);
        assert_eq!(contract_expiry_urgency(10), Urgency::High);
        assert_eq!(contract_expiry_urgency(25), Urgency::Medium);
        assert_eq!(contract_expiry_urgency(90), Urgency::Low);
    }

    #[test]
    fn milestone_urgency_thresholds() {
        assert_eq!(milestone_urgency(-1, true), Urgency::Critical);
        assert_eq!(milestone_urgency(0, false), Urgency::High);
        assert_eq!(milestone_urgency(1, false), Urgency::High);
        assert_eq!(milestone_urgency(3, false), Urgency::Medium);
        assert_eq!(milestone_urgency(10, false), Urgency::Low);
    }

    #[test]
    fn envelope_serializes_with_sorted_keys() {
        let env = WebhookEnvelope::new("task.overdue", serde_json::json!({"b": 1, "a": 2}));
        let bytes = env.canonical_json().unwrap();
        let s = String::from_utf8(bytes).unwrap();
        // data sorts before event_type sorts before source sorts before timestamp.
        assert!(s.find("\"data\"").unwrap() < s.find("event_type").unwrap());
        assert!(s.find("event_type").unwrap() < s.find("source").unwrap());
        assert!(s.find("source").unwrap() < s.find("timestamp").unwrap());
        assert!(s.find("\"a\"").unwrap() < s.find("\"b\"").unwrap());
    }
}

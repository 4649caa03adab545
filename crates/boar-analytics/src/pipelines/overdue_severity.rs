use async_trait::async_trait;
use boar_core::{ReportArtifact, Result};
use boar_erp::ErpGateway;
use boar_llm::orchestrator::Orchestrator;
use chrono::{NaiveDate, Utc};
use serde_json::json;

use crate::facts::overdue_severity as severity_of;
use crate::pipeline::{synthesize, Pipeline};

const SYSTEM: &str = "You are a delivery manager triaging overdue work. \
Summarize the overdue backlog by severity and recommend which items need \
immediate escalation.";

const PROMPT: &str = "Summarize the following overdue task list by severity.";

/// Feeds the `overdue_monitor` scheduled job: every open task past its
/// deadline, classified by days overdue.
pub struct OverdueSeverity;

#[async_trait]
impl Pipeline for OverdueSeverity {
    fn name(&self) -> &'static str {
        "overdue_severity"
    }

    async fn run(&self, gateway: &ErpGateway, orchestrator: &Orchestrator) -> Result<ReportArtifact> {
        let facts = gather(gateway).await?;
        Ok(synthesize(orchestrator, self.name(), None, facts, PROMPT, SYSTEM).await)
    }
}

async fn gather(gateway: &ErpGateway) -> Result<serde_json::Value> {
    gateway.require_model("project.task").await?;

    let tasks = gateway
        .search_read(
            "project.task",
            json!([["stage_id.is_closed", "=", false], ["date_deadline", "!=", false]]),
            vec!["id", "name", "date_deadline", "user_ids"],
            None,
            None,
            Some("date_deadline asc"),
        )
        .await?;

    let today = Utc::now().date_naive();
    let mut by_severity = std::collections::HashMap::<&'static str, u32>::new();
    let overdue: Vec<serde_json::Value> = tasks
        .iter()
        .filter_map(|t| {
            let deadline = t.get("date_deadline")?.as_str()?;
            let deadline_date = NaiveDate::parse_from_str(&deadline[..10.min(deadline.len())], "%Y-%m-%d").ok()?;
            let days_overdue = (today - deadline_date).num_days();
            if days_overdue <= 0 {
                return None;
            }
            let severity = severity_of(days_overdue);
            *by_severity.entry(severity.as_str()).or_insert(0) += 1;
            Some(json!({
                "id": t.get("id"),
                "name": t.get("name"),
                "days_overdue": days_overdue,
                "severity": severity.as_str(),
                "assignees": t.get("user_ids"),
            }))
        })
        .collect();

    Ok(json!({
        "overdue_tasks": overdue,
        "critical_count": by_severity.get("critical").copied().unwrap_or(0),
        "high_count": by_severity.get("high").copied().unwrap_or(0),
        "medium_count": by_severity.get("medium").copied().unwrap_or(0),
        "low_count": by_severity.get("low").copied().unwrap_or(0),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_report_keeps_severity_counts_as_facts() {
        let pipeline = OverdueSeverity;
        let facts = json!({ "critical_count": 1, "high_count": 2 });
        let report = pipeline.fallback(facts.clone());
        assert_eq!(report.facts, facts);
        assert_eq!(report.report_type, "overdue_severity");
    }
}

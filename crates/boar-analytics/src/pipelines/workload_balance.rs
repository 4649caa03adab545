use std::collections::HashMap;

use async_trait::async_trait;
use boar_core::{ReportArtifact, Result};
use boar_erp::ErpGateway;
use boar_llm::orchestrator::Orchestrator;
use chrono::{NaiveDate, Utc};
use serde_json::json;

use crate::facts::{balance_score, needs_manager_alert, utilization_pct, utilization_status};
use crate::pipeline::{synthesize, Pipeline};

const SYSTEM: &str = "You are a resource planning expert for a back-office operations team. \
Given per-employee utilization data, summarize workload balance, call out \
employees at risk of burnout or idleness, and recommend concrete \
reassignments. Be specific and actionable.";

const PROMPT: &str = "Analyze the following workload balance data and provide \
a short narrative summary plus a list of recommended actions.";

pub struct WorkloadBalance;

#[async_trait]
impl Pipeline for WorkloadBalance {
    fn name(&self) -> &'static str {
        "workload_balance"
    }

    async fn run(&self, gateway: &ErpGateway, orchestrator: &Orchestrator) -> Result<ReportArtifact> {
        let facts = gather(gateway).await?;
        Ok(synthesize(orchestrator, self.name(), None, facts, PROMPT, SYSTEM).await)
    }

    fn fallback(&self, facts: serde_json::Value) -> ReportArtifact {
        let score = facts.get("balance_score").and_then(|v| v.as_f64()).unwrap_or(100.0);
        let overloaded = facts.get("overloaded_count").and_then(|v| v.as_u64()).unwrap_or(0);
        let alert = needs_manager_alert(score, overloaded as usize);
        ReportArtifact::new(
            self.name(),
            None,
            facts,
            json!({ "source": "fallback", "manager_alert": alert }),
        )
    }
}

async fn gather(gateway: &ErpGateway) -> Result<serde_json::Value> {
    gateway.require_model("project.task").await?;

    let employees = gateway
        .search_read("hr.employee", json!([]), vec!["id", "name"], None, None, None)
        .await?;

    let tasks = gateway
        .search_read(
            "project.task",
            json!([["stage_id.is_closed", "=", false]]),
            vec!["id", "user_ids", "remaining_hours", "allocated_hours", "priority", "date_deadline"],
            None,
            None,
            None,
        )
        .await?;

    let today = Utc::now().date_naive();
    let mut per_employee: HashMap<i64, (f64, u32, u32, u32)> = HashMap::new(); // remaining, count, overdue, high_priority

    for task in &tasks {
        // `remaining_hours` availability depends on the ERP deployment; fall
        // back to `allocated_hours` when absent.
        let remaining = task
            .get("remaining_hours")
            .and_then(|v| v.as_f64())
            .or_else(|| task.get("allocated_hours").and_then(|v| v.as_f64()))
            .unwrap_or(0.0);
        let priority_high = task.get("priority").and_then(|v| v.as_str()).map(|p| p == "2" || p == "3").unwrap_or(false);
        let overdue = task
            .get("date_deadline")
            .and_then(|v| v.as_str())
            .and_then(|s| NaiveDate::parse_from_str(&s[..10.min(s.len())], "%Y-%m-%d").ok())
            .map(|d| d < today)
            .unwrap_or(false);

        let assignees = task.get("user_ids").and_then(|v| v.as_array()).cloned().unwrap_or_default();
        for uid in assignees.iter().filter_map(|v| v.as_i64()) {
            let entry = per_employee.entry(uid).or_insert((0.0, 0, 0, 0));
            entry.0 += remaining / assignees.len().max(1) as f64;
            entry.1 += 1;
            if overdue {
                entry.2 += 1;
            }
            if priority_high {
                entry.3 += 1;
            }
        }
    }

    let mut utilizations = Vec::new();
    let mut overloaded_count = 0u32;
    let mut underutilized_count = 0u32;
    let employee_facts: Vec<serde_json::Value> = employees
        .iter()
        .filter_map(|e| e.get("id").and_then(|v| v.as_i64()).map(|id| (id, e)))
        .map(|(id, e)| {
            let (remaining, count, overdue, high_priority) = per_employee.get(&id).copied().unwrap_or((0.0, 0, 0, 0));
            let pct = utilization_pct(remaining, 40.0);
            let status = utilization_status(pct);
            utilizations.push(pct);
            match status {
                crate::facts::UtilizationStatus::Overloaded => overloaded_count += 1,
                crate::facts::UtilizationStatus::Underutilized => underutilized_count += 1,
                crate::facts::UtilizationStatus::Balanced => {}
            }
            json!({
                "employee_id": id,
                "employee_name": e.get("name"),
                "task_count": count,
                "remaining_hours": remaining,
                "utilization": (pct * 10.0).round() / 10.0,
                "overdue_count": overdue,
                "high_priority_count": high_priority,
                "status": status.as_str(),
            })
        })
        .collect();

    let score = balance_score(&utilizations);

    Ok(json!({
        "employees": employee_facts,
        "balance_score": (score * 10.0).round() / 10.0,
        "overloaded_count": overloaded_count,
        "underutilized_count": underutilized_count,
        "manager_alert": needs_manager_alert(score, overloaded_count as usize),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_flags_manager_alert_on_low_score() {
        let pipeline = WorkloadBalance;
        let facts = json!({ "balance_score": 30.0, "overloaded_count": 0 });
        let report = pipeline.fallback(facts);
        assert_eq!(report.insights["manager_alert"], true);
    }
}

//! Handlers bound to the default scheduled-job catalog. Each wraps an
//! analytical pipeline run (or, for `delivery_monitor`, a direct ERP read)
//! and turns the result into notifications per the event catalog.

use std::collections::HashMap;

use boar_analytics::pipelines::{
    BottleneckDetection, ComplianceScorePipeline, ContractStatusPipeline, OverdueSeverity,
    Period, ProductivityReport, WorkloadBalance,
};
use boar_analytics::Pipeline;
use boar_erp::ErpGateway;
use boar_llm::orchestrator::Orchestrator;
use boar_notify::Notifier;
use chrono::{NaiveDate, Utc};
use serde_json::json;
use tracing::warn;

/// Employees whose `hr.employee` record is referenced as someone else's
/// `parent_id` (manager). There is no dedicated "manager" flag in the fixed
/// module discovery list, so this is the closest thing `hr.employee` has to
/// one.
async fn manager_emails(gateway: &ErpGateway) -> Vec<String> {
    let employees = match gateway
        .search_read("hr.employee", json!([]), vec!["id", "parent_id"], None, None, None)
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            warn!(error = %e, "manager lookup failed");
            return Vec::new();
        }
    };

    let manager_ids: Vec<i64> = employees
        .iter()
        .filter_map(|e| e.get("parent_id").and_then(|v| v.as_array()).and_then(|a| a.first()).and_then(|v| v.as_i64()))
        .collect::<std::collections::HashSet<_>>()
        .into_iter()
        .collect();
    if manager_ids.is_empty() {
        return Vec::new();
    }

    gateway
        .read("hr.employee", manager_ids, vec!["work_email"])
        .await
        .unwrap_or_default()
        .into_iter()
        .filter_map(|e| e.get("work_email").and_then(|v| v.as_str()).map(str::to_string))
        .collect()
}

async fn employee_emails_by_user_ids(gateway: &ErpGateway, user_ids: &[i64]) -> HashMap<i64, String> {
    if user_ids.is_empty() {
        return HashMap::new();
    }
    let rows = gateway
        .search_read(
            "hr.employee",
            json!([["user_id", "in", user_ids]]),
            vec!["user_id", "work_email"],
            None,
            None,
            None,
        )
        .await
        .unwrap_or_default();

    rows.into_iter()
        .filter_map(|e| {
            let uid = e.get("user_id").and_then(|v| v.as_array()).and_then(|a| a.first()).and_then(|v| v.as_i64())?;
            let email = e.get("work_email").and_then(|v| v.as_str())?.to_string();
            Some((uid, email))
        })
        .collect()
}

pub async fn overdue_monitor(gateway: &ErpGateway, orchestrator: &Orchestrator, notifier: &Notifier) -> anyhow::Result<()> {
    let report = OverdueSeverity.run(gateway, orchestrator).await?;
    let tasks = report.facts["overdue_tasks"].as_array().cloned().unwrap_or_default();

    let user_ids: Vec<i64> = tasks
        .iter()
        .filter_map(|t| t.get("assignees").and_then(|v| v.as_array()).and_then(|a| a.first()).and_then(|v| v.as_i64()))
        .collect();
    let emails = employee_emails_by_user_ids(gateway, &user_ids).await;

    for task in &tasks {
        let severity = task.get("severity").and_then(|v| v.as_str()).unwrap_or("low");
        if !matches!(severity, "critical" | "high") {
            continue;
        }
        let Some(uid) = task.get("assignees").and_then(|v| v.as_array()).and_then(|a| a.first()).and_then(|v| v.as_i64()) else {
            continue;
        };
        let Some(email) = emails.get(&uid) else { continue };
        let subject = format!("Overdue task: {}", task.get("name").and_then(|v| v.as_str()).unwrap_or("untitled"));
        let body = format!(
            "Task \"{}\" is {} days overdue ({} priority).",
            task.get("name").and_then(|v| v.as_str()).unwrap_or("untitled"),
            task.get("days_overdue").and_then(|v| v.as_i64()).unwrap_or(0),
            severity,
        );
        notifier.task_overdue(email, &subject, &body, task.clone()).await;
    }
    Ok(())
}

pub async fn expiry_monitor(gateway: &ErpGateway, orchestrator: &Orchestrator, notifier: &Notifier) -> anyhow::Result<()> {
    let report = ContractStatusPipeline.run(gateway, orchestrator).await?;
    let contracts = report.facts["contracts"].as_array().cloned().unwrap_or_default();

    for contract in contracts {
        let status = contract.get("status").and_then(|v| v.as_str()).unwrap_or("active");
        match status {
            "expired" => {
                notifier.contract_event(true, contract).await;
            }
            "expiring_soon" => {
                notifier.contract_event(false, contract).await;
            }
            _ => {}
        }
    }
    Ok(())
}

/// No dedicated milestone model exists in the fixed module discovery list;
/// `project.task` stands in via a custom `is_milestone` boolean field,
/// following the same extend-the-existing-model convention used for
/// `hr.contract.compliance_items`.
pub async fn delivery_monitor(gateway: &ErpGateway, notifier: &Notifier) -> anyhow::Result<()> {
    gateway.require_model("project.task").await?;

    let tasks = gateway
        .search_read(
            "project.task",
            json!([["is_milestone", "=", true], ["stage_id.is_closed", "=", false], ["date_deadline", "!=", false]]),
            vec!["id", "name", "date_deadline"],
            None,
            None,
            None,
        )
        .await?;

    let today = Utc::now().date_naive();
    for task in tasks {
        let Some(deadline) = task.get("date_deadline").and_then(|v| v.as_str()) else { continue };
        let Some(deadline_date) = NaiveDate::parse_from_str(&deadline[..10.min(deadline.len())], "%Y-%m-%d").ok() else { continue };
        let days_until = (deadline_date - today).num_days();
        let overdue = days_until < 0;
        if overdue || days_until <= 3 {
            notifier.milestone_event(overdue, task).await;
        }
    }
    Ok(())
}

pub async fn compliance_checker(gateway: &ErpGateway, orchestrator: &Orchestrator, notifier: &Notifier) -> anyhow::Result<()> {
    let report = ComplianceScorePipeline.run(gateway, orchestrator).await?;
    let contracts = report.facts["contracts"].as_array().cloned().unwrap_or_default();
    let alert_ids: Vec<i64> = report.facts["alert_contract_ids"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .filter_map(|v| v.as_i64())
        .collect();

    for contract in contracts {
        let Some(id) = contract.get("contract_id").and_then(|v| v.as_i64()) else { continue };
        if alert_ids.contains(&id) {
            notifier.compliance_alert(contract).await;
        }
    }
    Ok(())
}

pub async fn workload_balance_job(gateway: &ErpGateway, orchestrator: &Orchestrator, notifier: &Notifier) -> anyhow::Result<()> {
    let report = WorkloadBalance.run(gateway, orchestrator).await?;
    let alert = report.facts.get("manager_alert").and_then(|v| v.as_bool()).unwrap_or(false);
    if !alert {
        return Ok(());
    }
    let managers = manager_emails(gateway).await;
    let subject = "Workload imbalance detected".to_string();
    let body = format!(
        "Balance score {} with {} overloaded employee(s). Review assignments.",
        report.facts.get("balance_score").cloned().unwrap_or_default(),
        report.facts.get("overloaded_count").cloned().unwrap_or_default(),
    );
    notifier.alert("workload", &managers, &subject, &body, report.facts).await;
    Ok(())
}

async fn productivity_report(gateway: &ErpGateway, orchestrator: &Orchestrator, notifier: &Notifier, period: Period) -> anyhow::Result<()> {
    let report = ProductivityReport { period }.run(gateway, orchestrator).await?;
    let managers = manager_emails(gateway).await;
    let subject = format!("{} productivity report", report.facts.get("period").and_then(|v| v.as_str()).unwrap_or("periodic"));
    let body = format!(
        "{} task(s) completed, {} created.",
        report.facts.get("completed_count").cloned().unwrap_or_default(),
        report.facts.get("created_count").cloned().unwrap_or_default(),
    );
    notifier.report_ready(&managers, &subject, &body, report.facts).await;
    Ok(())
}

pub async fn daily_report(gateway: &ErpGateway, orchestrator: &Orchestrator, notifier: &Notifier) -> anyhow::Result<()> {
    productivity_report(gateway, orchestrator, notifier, Period::Daily).await
}

pub async fn weekly_report(gateway: &ErpGateway, orchestrator: &Orchestrator, notifier: &Notifier) -> anyhow::Result<()> {
    productivity_report(gateway, orchestrator, notifier, Period::Weekly).await
}

/// Resolve the six pipelines' underlying analytical types by name, for the
/// `GET /api/v1/analytics/{pipeline}` endpoint.
pub async fn run_pipeline_by_name(name: &str, gateway: &ErpGateway, orchestrator: &Orchestrator) -> Option<anyhow::Result<serde_json::Value>> {
    let result = match name {
        "workload_balance" => WorkloadBalance.run(gateway, orchestrator).await,
        "bottleneck_detection" => BottleneckDetection.run(gateway, orchestrator).await,
        "overdue_severity" => OverdueSeverity.run(gateway, orchestrator).await,
        "contract_status" => ContractStatusPipeline.run(gateway, orchestrator).await,
        "compliance_score" => ComplianceScorePipeline.run(gateway, orchestrator).await,
        "daily_report" => ProductivityReport { period: Period::Daily }.run(gateway, orchestrator).await,
        "weekly_report" => ProductivityReport { period: Period::Weekly }.run(gateway, orchestrator).await,
        _ => return None,
    };
    Some(result.map(|r| serde_json::to_value(r).unwrap_or_default()).map_err(anyhow::Error::from))
}

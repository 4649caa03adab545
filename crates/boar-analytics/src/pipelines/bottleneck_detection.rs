use std::collections::HashMap;

use async_trait::async_trait;
use boar_core::{ReportArtifact, Result};
use boar_erp::ErpGateway;
use boar_llm::orchestrator::Orchestrator;
use chrono::{NaiveDate, Utc};
use serde_json::json;

use crate::facts::{blocked_ratio_concerning, stage_is_bottleneck};
use crate::pipeline::{synthesize, Pipeline};

const SYSTEM: &str = "You are a process optimization expert. Identify bottlenecks \
in the workflow and provide specific, actionable recommendations. Focus on \
issues that have the highest impact on productivity.";

const PROMPT: &str = "Analyze the following stage and blocked-task metrics and \
identify the highest-impact bottlenecks.";

pub struct BottleneckDetection;

#[async_trait]
impl Pipeline for BottleneckDetection {
    fn name(&self) -> &'static str {
        "bottleneck_detection"
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
            json!([]),
            vec!["id", "name", "stage_id", "kanban_state", "date_deadline", "priority", "user_ids"],
            None,
            None,
            None,
        )
        .await?;

    let stages = gateway
        .search_read("project.task.type", json!([]), vec!["id", "name", "is_closed"], None, None, None)
        .await?;

    let total = tasks.len().max(1);
    let today = Utc::now().date_naive();
    let is_overdue = |t: &serde_json::Value| -> bool {
        t.get("date_deadline")
            .and_then(|v| v.as_str())
            .and_then(|s| NaiveDate::parse_from_str(&s[..10.min(s.len())], "%Y-%m-%d").ok())
            .map(|d| d < today)
            .unwrap_or(false)
    };

    let mut by_stage: HashMap<i64, Vec<&serde_json::Value>> = HashMap::new();
    for task in &tasks {
        if let Some(stage_id) = task.get("stage_id").and_then(|v| v.as_array()).and_then(|a| a.first()).and_then(|v| v.as_i64()) {
            by_stage.entry(stage_id).or_default().push(task);
        }
    }

    let stage_metrics: Vec<serde_json::Value> = stages
        .iter()
        .filter_map(|s| s.get("id").and_then(|v| v.as_i64()).map(|id| (id, s)))
        .map(|(id, s)| {
            let in_stage = by_stage.get(&id).cloned().unwrap_or_default();
            let count = in_stage.len();
            let ratio = count as f64 / total as f64;
            let is_closed = s.get("is_closed").and_then(|v| v.as_bool()).unwrap_or(false);
            let overdue_in_stage = in_stage.iter().filter(|t| is_overdue(t)).count();
            let blocked_in_stage = in_stage.iter().filter(|t| t.get("kanban_state").and_then(|v| v.as_str()) == Some("blocked")).count();
            json!({
                "stage_id": id,
                "stage_name": s.get("name"),
                "is_closed": is_closed,
                "task_count": count,
                "percentage": (ratio * 1000.0).round() / 10.0,
                "overdue_in_stage": overdue_in_stage,
                "blocked_in_stage": blocked_in_stage,
                "is_bottleneck": stage_is_bottleneck(ratio, is_closed),
            })
        })
        .collect();

    let blocked: Vec<&serde_json::Value> = tasks.iter().filter(|t| t.get("kanban_state").and_then(|v| v.as_str()) == Some("blocked")).collect();
    let blocked_ratio = blocked.len() as f64 / total as f64;

    Ok(json!({
        "stage_analysis": stage_metrics,
        "blocked_tasks": {
            "blocked_count": blocked.len(),
            "blocked_ratio": (blocked_ratio * 1000.0).round() / 10.0,
            "is_concerning": blocked_ratio_concerning(blocked_ratio),
            "tasks": blocked.iter().take(10).map(|t| json!({
                "id": t.get("id"),
                "name": t.get("name"),
                "priority": t.get("priority"),
            })).collect::<Vec<_>>(),
        },
        "summary": {
            "total_tasks": tasks.len(),
            "overdue_count": tasks.iter().filter(|t| is_overdue(t)).count(),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fallback_wraps_facts_unchanged() {
        let pipeline = BottleneckDetection;
        let facts = json!({ "summary": { "total_tasks": 5 } });
        let report = pipeline.fallback(facts.clone());
        assert_eq!(report.facts, facts);
    }
}

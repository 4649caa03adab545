use async_trait::async_trait;
use boar_core::{ReportArtifact, Result};
use boar_erp::ErpGateway;
use boar_llm::orchestrator::Orchestrator;
use chrono::Utc;
use serde_json::json;

use crate::pipeline::{synthesize, Pipeline};

const SYSTEM: &str = "You are an operations analyst producing a periodic \
productivity report. Highlight trends, call out teams or individuals \
falling behind, and keep the narrative to a few paragraphs.";

const PROMPT: &str = "Produce a productivity report narrative from the \
following task completion data.";

/// Feeds both `daily_report` and `weekly_report`; `period` selects the
/// lookback window.
pub struct ProductivityReport {
    pub period: Period,
}

#[derive(Debug, Clone, Copy)]
pub enum Period {
    Daily,
    Weekly,
}

impl Period {
    fn label(self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
        }
    }

    fn lookback_days(self) -> i64 {
        match self {
            Period::Daily => 1,
            Period::Weekly => 7,
        }
    }
}

#[async_trait]
impl Pipeline for ProductivityReport {
    fn name(&self) -> &'static str {
        "productivity_report"
    }

    async fn run(&self, gateway: &ErpGateway, orchestrator: &Orchestrator) -> Result<ReportArtifact> {
        let facts = gather(gateway, self.period).await?;
        Ok(synthesize(orchestrator, self.name(), Some(self.period.label().to_string()), facts, PROMPT, SYSTEM).await)
    }
}

async fn gather(gateway: &ErpGateway, period: Period) -> Result<serde_json::Value> {
    gateway.require_model("project.task").await?;

    let since = Utc::now() - chrono::Duration::days(period.lookback_days());
    let since_str = since.format("%Y-%m-%d %H:%M:%S").to_string();

    let completed = gateway
        .search_read(
            "project.task",
            json!([["stage_id.is_closed", "=", true], ["write_date", ">=", since_str]]),
            vec!["id", "name", "user_ids", "write_date"],
            None,
            None,
            None,
        )
        .await?;

    let created = gateway
        .search_count("project.task", json!([["create_date", ">=", since_str]]))
        .await?;

    Ok(json!({
        "period": period.label(),
        "lookback_days": period.lookback_days(),
        "completed_count": completed.len(),
        "created_count": created,
        "completed_tasks": completed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_labels_and_lookbacks() {
        assert_eq!(Period::Daily.label(), "daily");
        assert_eq!(Period::Daily.lookback_days(), 1);
        assert_eq!(Period::Weekly.label(), "weekly");
        assert_eq!(Period::Weekly.lookback_days(), 7);
    }
}

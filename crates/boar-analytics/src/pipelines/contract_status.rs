use async_trait::async_trait;
use boar_core::{ReportArtifact, Result};
use boar_erp::ErpGateway;
use boar_llm::orchestrator::Orchestrator;
use chrono::{NaiveDate, Utc};
use serde_json::json;

use crate::facts::contract_status as status_of;
use crate::pipeline::{synthesize, Pipeline};

const SYSTEM: &str = "You are a contracts administrator. Summarize which \
contracts need renewal attention soonest and flag any already expired.";

const PROMPT: &str = "Summarize the following contract expiry data.";

/// Feeds the `expiry_monitor` scheduled job. Odoo's `hr.contract` model
/// stores the contract end date in its `date_end` field.
pub struct ContractStatusPipeline;

#[async_trait]
impl Pipeline for ContractStatusPipeline {
    fn name(&self) -> &'static str {
        "contract_status"
    }

    async fn run(&self, gateway: &ErpGateway, orchestrator: &Orchestrator) -> Result<ReportArtifact> {
        let facts = gather(gateway).await?;
        Ok(synthesize(orchestrator, self.name(), None, facts, PROMPT, SYSTEM).await)
    }
}

async fn gather(gateway: &ErpGateway) -> Result<serde_json::Value> {
    gateway.require_model("hr.contract").await?;

    let contracts = gateway
        .search_read(
            "hr.contract",
            json!([["date_end", "!=", false]]),
            vec!["id", "name", "employee_id", "date_end"],
            None,
            None,
            Some("date_end asc"),
        )
        .await?;

    let today = Utc::now().date_naive();
    let mut expired = 0u32;
    let mut expiring_soon = 0u32;
    let mut active = 0u32;

    let rows: Vec<serde_json::Value> = contracts
        .iter()
        .filter_map(|c| {
            let end = c.get("date_end")?.as_str()?;
            let end_date = NaiveDate::parse_from_str(&end[..10.min(end.len())], "%Y-%m-%d").ok()?;
            let (status, days_until_expiry) = status_of(end_date, today);
            match status {
                crate::facts::ContractStatus::Expired => expired += 1,
                crate::facts::ContractStatus::ExpiringSoon => expiring_soon += 1,
                crate::facts::ContractStatus::Active => active += 1,
            }
            Some(json!({
                "id": c.get("id"),
                "name": c.get("name"),
                "employee": c.get("employee_id"),
                "status": status.as_str(),
                "days_until_expiry": days_until_expiry,
            }))
        })
        .collect();

    Ok(json!({
        "contracts": rows,
        "expired_count": expired,
        "expiring_soon_count": expiring_soon,
        "active_count": active,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_preserves_status_counts() {
        let pipeline = ContractStatusPipeline;
        let facts = json!({ "expired_count": 1, "expiring_soon_count": 2, "active_count": 10 });
        let report = pipeline.fallback(facts.clone());
        assert_eq!(report.facts, facts);
    }
}

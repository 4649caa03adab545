use async_trait::async_trait;
use boar_core::{ReportArtifact, Result};
use boar_erp::ErpGateway;
use boar_llm::orchestrator::Orchestrator;
use serde_json::json;

use crate::facts::compliance_score as score_of;
use crate::pipeline::{synthesize, Pipeline};

const SYSTEM: &str = "You are a compliance officer. Summarize per-contract \
compliance posture and flag any contract whose score warrants an alert.";

const PROMPT: &str = "Summarize the following per-contract compliance scores.";

/// Feeds the `compliance_checker` scheduled job. Compliance items are
/// stored as a JSON array in `hr.contract.compliance_items`, following the
/// structured-data-as-JSON-text-field convention used elsewhere for
/// contract analysis results; each item carries a `status` of
/// `compliant`, `non_compliant`, `pending_review`, `exempted`, or
/// `not_applicable`.
pub struct ComplianceScorePipeline;

#[async_trait]
impl Pipeline for ComplianceScorePipeline {
    fn name(&self) -> &'static str {
        "compliance_score"
    }

    async fn run(&self, gateway: &ErpGateway, orchestrator: &Orchestrator) -> Result<ReportArtifact> {
        let facts = gather(gateway).await?;
        Ok(synthesize(orchestrator, self.name(), None, facts, PROMPT, SYSTEM).await)
    }
}

fn satisfies(status: &str) -> bool {
    matches!(status, "compliant" | "exempted" | "not_applicable")
}

async fn gather(gateway: &ErpGateway) -> Result<serde_json::Value> {
    gateway.require_model("hr.contract").await?;

    let contracts = gateway
        .search_read(
            "hr.contract",
            json!([]),
            vec!["id", "name", "compliance_items"],
            None,
            None,
            None,
        )
        .await?;

    let mut alerts = Vec::new();
    let rows: Vec<serde_json::Value> = contracts
        .iter()
        .map(|c| {
            let items: Vec<serde_json::Value> = c
                .get("compliance_items")
                .and_then(|v| v.as_str())
                .and_then(|s| serde_json::from_str(s).ok())
                .unwrap_or_default();
            let total = items.len();
            let satisfied = items
                .iter()
                .filter(|i| i.get("status").and_then(|v| v.as_str()).map(satisfies).unwrap_or(false))
                .count();
            let score = score_of(satisfied, total);
            if score < 70.0 {
                alerts.push(c.get("id").cloned().unwrap_or(serde_json::Value::Null));
            }
            json!({
                "contract_id": c.get("id"),
                "contract_name": c.get("name"),
                "item_count": total,
                "compliance_score": (score * 10.0).round() / 10.0,
            })
        })
        .collect();

    Ok(json!({
        "contracts": rows,
        "alert_contract_ids": alerts,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn satisfies_treats_exempted_and_na_as_compliant() {
        assert!(satisfies("compliant"));
        assert!(satisfies("exempted"));
        assert!(satisfies("not_applicable"));
        assert!(!satisfies("non_compliant"));
        assert!(!satisfies("pending_review"));
    }
}

use async_trait::async_trait;
use boar_core::{AnalysisEnvelope, ReportArtifact, Result};
use boar_erp::ErpGateway;
use boar_llm::orchestrator::Orchestrator;

/// Common shape every analytical pipeline follows: gather bounded ERP
/// records, compute deterministic facts, hand them to the Orchestrator for
/// qualitative synthesis, and merge. `fallback` reruns step 6 with no model
/// input so the endpoint degrades gracefully when the LLM is unavailable.
#[async_trait]
pub trait Pipeline: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, gateway: &ErpGateway, orchestrator: &Orchestrator) -> Result<ReportArtifact>;

    fn fallback(&self, facts: serde_json::Value) -> ReportArtifact {
        ReportArtifact::new(self.name(), None, facts, serde_json::json!({ "source": "fallback" }))
    }
}

/// Shared plumbing for the `analyze_json` step: builds the envelope, calls
/// the Orchestrator, and merges the qualitative result with the facts on
/// success, falling back to a facts-only artifact on any failure.
pub(crate) async fn synthesize(
    orchestrator: &Orchestrator,
    pipeline: &str,
    period: Option<String>,
    facts: serde_json::Value,
    prompt: &str,
    system: &str,
) -> ReportArtifact {
    let envelope = AnalysisEnvelope::new(pipeline, facts.clone());
    match orchestrator.analyze_json(prompt, &envelope.facts, system).await {
        Ok(insights) => ReportArtifact::new(pipeline, period, facts, insights),
        Err(e) => {
            tracing::warn!(pipeline, error = %e, "analytical synthesis failed, returning facts-only report");
            ReportArtifact::new(pipeline, period, facts, serde_json::json!({ "source": "fallback", "reason": e.to_string() }))
        }
    }
}

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{
    routing::{get, post},
    Json, Router,
};
use boar_auth::OtpAuthenticator;
use boar_core::BoarConfig;
use boar_erp::ErpGateway;
use boar_llm::orchestrator::Orchestrator;
use boar_llm::tools::Tool;
use boar_llm::{tools::link_identity::IdentityLinker, OpenAiCompatProvider};
use boar_notify::Notifier;
use boar_scheduler::{HandlerFn, SchedulerEngine};
use tracing::error;

use crate::jobs;

/// Central shared state — passed as `Arc<AppState>` to all Axum handlers.
pub struct AppState {
    pub config: BoarConfig,
    pub erp: Arc<ErpGateway>,
    pub orchestrator: Arc<Orchestrator>,
    pub notifier: Arc<Notifier>,
    pub auth: Arc<OtpAuthenticator>,
    pub scheduler: Arc<SchedulerEngine>,
    pub tools: Vec<Box<dyn Tool>>,
}

pub const AGENT_SYSTEM_PROMPT: &str = "You are the back-office assistant for this \
company's HR and project operations. Use the available tools to answer \
questions about leave, payroll, attendance, tasks, and policy. Only act on \
the employee identity resolved for this conversation.";

impl AppState {
    pub fn new(config: BoarConfig) -> anyhow::Result<Self> {
        let erp = Arc::new(ErpGateway::new(&config)?);

        let provider: Arc<dyn boar_llm::LlmProvider> = Arc::new(OpenAiCompatProvider::new(
            config.llm.api_key.clone().unwrap_or_default(),
            config.llm.base_url.clone(),
            config.llm.timeout_secs,
        ));
        let orchestrator = Arc::new(Orchestrator::new(provider, config.llm.model.clone()));

        let notifier = Arc::new(Notifier::new(config.webhooks.clone(), config.smtp.clone()));
        let auth = Arc::new(OtpAuthenticator::new(erp.clone(), &config));
        let linker: Arc<dyn IdentityLinker> = auth.clone();
        let tools = crate::tools::build_tools(erp.clone(), linker);

        let scheduler = Arc::new(SchedulerEngine::new(config.scheduler.worker_pool_size));

        Ok(Self {
            config,
            erp,
            orchestrator,
            notifier,
            auth,
            scheduler,
            tools,
        })
    }

    /// Registers the seven default scheduled jobs, binding each to this
    /// instance's live `ErpGateway`/`Orchestrator`/`Notifier`. Called once
    /// at startup, before `scheduler.start()`.
    pub async fn register_default_jobs(&self) {
        for (id, name, schedule) in boar_scheduler::default_schedules() {
            let handler = self.handler_for(id);
            if let Err(e) = self.scheduler.register(id, name, schedule, handler).await {
                error!(job_id = id, error = %e, "failed to register scheduled job");
            }
        }
    }

    fn handler_for(&self, id: &str) -> HandlerFn {
        let erp = self.erp.clone();
        let orchestrator = self.orchestrator.clone();
        let notifier = self.notifier.clone();

        match id {
            "overdue_monitor" => Arc::new(move || {
                let (erp, orchestrator, notifier) = (erp.clone(), orchestrator.clone(), notifier.clone());
                Box::pin(async move { jobs::overdue_monitor(&erp, &orchestrator, &notifier).await })
            }),
            "expiry_monitor" => Arc::new(move || {
                let (erp, orchestrator, notifier) = (erp.clone(), orchestrator.clone(), notifier.clone());
                Box::pin(async move { jobs::expiry_monitor(&erp, &orchestrator, &notifier).await })
            }),
            "delivery_monitor" => Arc::new(move || {
                let (erp, notifier) = (erp.clone(), notifier.clone());
                Box::pin(async move { jobs::delivery_monitor(&erp, &notifier).await })
            }),
            "compliance_checker" => Arc::new(move || {
                let (erp, orchestrator, notifier) = (erp.clone(), orchestrator.clone(), notifier.clone());
                Box::pin(async move { jobs::compliance_checker(&erp, &orchestrator, &notifier).await })
            }),
            "workload_balance" => Arc::new(move || {
                let (erp, orchestrator, notifier) = (erp.clone(), orchestrator.clone(), notifier.clone());
                Box::pin(async move { jobs::workload_balance_job(&erp, &orchestrator, &notifier).await })
            }),
            "daily_report" => Arc::new(move || {
                let (erp, orchestrator, notifier) = (erp.clone(), orchestrator.clone(), notifier.clone());
                Box::pin(async move { jobs::daily_report(&erp, &orchestrator, &notifier).await })
            }),
            "weekly_report" => Arc::new(move || {
                let (erp, orchestrator, notifier) = (erp.clone(), orchestrator.clone(), notifier.clone());
                Box::pin(async move { jobs::weekly_report(&erp, &orchestrator, &notifier).await })
            }),
            other => {
                // Unreachable in practice: every id in `default_schedules()`
                // is matched above. Guards against the catalog and this
                // match drifting apart rather than panicking at startup.
                let id = other.to_string();
                Arc::new(move || {
                    let id = id.clone();
                    Box::pin(async move {
                        anyhow::bail!("no handler bound for scheduled job '{id}'")
                    })
                })
            }
        }
    }
}

/// Rejects any `/api/v1/*` request missing a matching `X-API-Key` header.
/// A no-op when `server.api_key` is unset — matches local/dev deployments
/// that haven't configured one yet.
async fn require_api_key(State(state): State<Arc<AppState>>, headers: HeaderMap, request: Request, next: Next) -> Response {
    let Some(expected) = state.config.server.api_key.as_deref() else {
        return next.run(request).await;
    };
    let provided = headers.get("x-api-key").and_then(|v| v.to_str().ok());
    if provided == Some(expected) {
        next.run(request).await
    } else {
        (StatusCode::UNAUTHORIZED, Json(serde_json::json!({ "error": "missing or invalid X-API-Key" }))).into_response()
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let mut cors = tower_http::cors::CorsLayer::new();
    cors = if state.config.server.allowed_origins.is_empty() {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<http::HeaderValue> = state
            .config
            .server
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    };

    let api = Router::new()
        .route("/chat", post(crate::http::chat::chat_handler))
        .route("/otp/link", post(crate::http::otp::link_handler))
        .route("/otp/verify", post(crate::http::otp::verify_handler))
        .route("/otp/unlink", post(crate::http::otp::unlink_handler))
        .route("/scheduler/jobs", get(crate::http::scheduler::list_handler))
        .route("/scheduler/jobs/{id}/trigger", post(crate::http::scheduler::trigger_handler))
        .route("/scheduler/jobs/{id}/pause", post(crate::http::scheduler::pause_handler))
        .route("/scheduler/jobs/{id}/resume", post(crate::http::scheduler::resume_handler))
        .route("/analytics/{pipeline}", get(crate::http::analytics::run_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/", get(crate::http::health::root_handler))
        .route("/health", get(crate::http::health::health_handler))
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

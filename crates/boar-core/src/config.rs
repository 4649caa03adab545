use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_SCHEDULER_TIMEZONE: &str = "UTC";
pub const DEFAULT_ERP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 30;
pub const OTP_SESSION_TTL_SECS: u64 = 600;
pub const SCHEDULER_MISFIRE_GRACE_SECS: u64 = 60;

/// Top-level config (boar.toml + BOAR_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoarConfig {
    pub erp: ErpConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub webhooks: WebhooksConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// ERP connection settings. Required per the Credential invariant — startup
/// refuses to proceed if any of these four is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErpConfig {
    pub url: String,
    pub db: String,
    pub user: String,
    pub password: String,
    #[serde(default = "default_erp_timeout_secs")]
    pub timeout_secs: u64,
}

/// LLM provider settings. Absence of `api_key` is not fatal — LLM-dependent
/// code paths check `is_configured()` and degrade to `AiUnavailable` instead.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

impl Default for ErpConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            db: String::new(),
            user: String::new(),
            password: String::new(),
            timeout_secs: default_erp_timeout_secs(),
        }
    }
}

/// SMTP settings. `is_configured()` requires host, port, user and password
/// all present — matching the degrade-silently contract for email delivery.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub from_email: Option<String>,
}

impl SmtpConfig {
    pub fn is_configured(&self) -> bool {
        self.host.as_deref().is_some_and(|v| !v.is_empty())
            && self.port.is_some()
            && self.user.as_deref().is_some_and(|v| !v.is_empty())
            && self.password.as_deref().is_some_and(|v| !v.is_empty())
    }
}

/// Outbound webhook settings: a shared HMAC secret plus one URL per event
/// category. An absent URL means that category is silently skipped.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WebhooksConfig {
    pub secret: Option<String>,
    pub overdue_url: Option<String>,
    pub assignment_url: Option<String>,
    pub report_url: Option<String>,
    pub manager_url: Option<String>,
    pub contract_expiry_url: Option<String>,
    pub milestone_url: Option<String>,
    pub compliance_url: Option<String>,
    #[serde(default = "default_webhook_timeout_secs")]
    pub timeout_secs: u64,
}

impl WebhooksConfig {
    /// Resolves the configured URL for a dotted event type, e.g. `task.overdue`.
    pub fn url_for_event(&self, event_type: &str) -> Option<&str> {
        let category = event_type.split('.').next().unwrap_or(event_type);
        match category {
            "overdue" | "task" if event_type == "task.overdue" => self.overdue_url.as_deref(),
            "task" if event_type == "task.assigned" => self.assignment_url.as_deref(),
            "report" => self.report_url.as_deref(),
            "alert" => self.manager_url.as_deref(),
            "contract" => self.contract_expiry_url.as_deref(),
            "milestone" => self.milestone_url.as_deref(),
            "compliance" => self.compliance_url.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_scheduler_timezone")]
    pub timezone: String,
    #[serde(default = "default_misfire_grace_secs")]
    pub misfire_grace_secs: u64,
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timezone: default_scheduler_timezone(),
            misfire_grace_secs: default_misfire_grace_secs(),
            worker_pool_size: default_worker_pool_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub api_key: Option<String>,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub debug: bool,
    /// When true, OTP verification degrades to echoing the code in the
    /// response when SMTP delivery fails, instead of silently dropping it.
    #[serde(default)]
    pub otp_demo_mode: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: None,
            allowed_origins: Vec::new(),
            log_level: default_log_level(),
            debug: false,
            otp_demo_mode: false,
        }
    }
}

fn default_erp_timeout_secs() -> u64 {
    DEFAULT_ERP_TIMEOUT_SECS
}
fn default_llm_timeout_secs() -> u64 {
    DEFAULT_LLM_TIMEOUT_SECS
}
fn default_webhook_timeout_secs() -> u64 {
    DEFAULT_WEBHOOK_TIMEOUT_SECS
}
fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_llm_base_url() -> String {
    "https://api.openai.com".to_string()
}
fn default_scheduler_timezone() -> String {
    DEFAULT_SCHEDULER_TIMEZONE.to_string()
}
fn default_misfire_grace_secs() -> u64 {
    SCHEDULER_MISFIRE_GRACE_SECS
}
fn default_worker_pool_size() -> usize {
    10
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_log_level() -> String {
    "info".to_string()
}

impl BoarConfig {
    /// Loads config from an optional TOML file with `BOAR_*` env var
    /// overrides layered on top, then enforces the Credential invariant.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(|| "boar.toml".to_string());

        let mut config: BoarConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("BOAR_").split("_"))
            .extract()
            .map_err(|e| crate::error::BoarError::Config(e.to_string()))?;

        apply_webhook_env_overrides(&mut config.webhooks);
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.erp.url.is_empty()
            || self.erp.db.is_empty()
            || self.erp.user.is_empty()
            || self.erp.password.is_empty()
        {
            return Err(crate::error::BoarError::Config(
                "ERP_URL, ERP_DB, ERP_USER and ERP_PASSWORD are all required".to_string(),
            ));
        }
        Ok(())
    }
}

/// `figment`'s `split("_")` nesting can't express the flat
/// `WEBHOOK_<EVENT>_URL` family, so those are read directly.
fn apply_webhook_env_overrides(webhooks: &mut WebhooksConfig) {
    let read = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
    webhooks.secret = webhooks.secret.take().or_else(|| read("WEBHOOK_SECRET"));
    webhooks.overdue_url = webhooks
        .overdue_url
        .take()
        .or_else(|| read("WEBHOOK_OVERDUE_URL"));
    webhooks.assignment_url = webhooks
        .assignment_url
        .take()
        .or_else(|| read("WEBHOOK_ASSIGNMENT_URL"));
    webhooks.report_url = webhooks
        .report_url
        .take()
        .or_else(|| read("WEBHOOK_REPORT_URL"));
    webhooks.manager_url = webhooks
        .manager_url
        .take()
        .or_else(|| read("WEBHOOK_MANAGER_URL"));
    webhooks.contract_expiry_url = webhooks
        .contract_expiry_url
        .take()
        .or_else(|| read("WEBHOOK_CONTRACT_EXPIRY_URL"));
    webhooks.milestone_url = webhooks
        .milestone_url
        .take()
        .or_else(|| read("WEBHOOK_MILESTONE_URL"));
    webhooks.compliance_url = webhooks
        .compliance_url
        .take()
        .or_else(|| read("WEBHOOK_COMPLIANCE_URL"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smtp_requires_all_four_fields() {
        let mut smtp = SmtpConfig {
            host: Some("smtp.example.com".into()),
            port: Some(587),
            user: Some("svc".into()),
            password: None,
            from_email: None,
        };
        assert!(!smtp.is_configured());
        smtp.password = Some("secret".into());
        assert!(smtp.is_configured());
    }

    #[test]
    fn llm_configured_requires_nonempty_key() {
        let mut llm = LlmConfig::default();
        assert!(!llm.is_configured());
        llm.api_key = Some(String::new());
        assert!(!llm.is_configured());
        llm.api_key = Some("sk-test".into());
        assert!(llm.is_configured());
    }

    #[test]
    fn webhook_url_for_event_resolves_by_category() {
        let webhooks = WebhooksConfig {
            overdue_url: Some("https://hooks.example.com/overdue".into()),
            report_url: Some("https://hooks.example.com/report".into()),
            ..Default::default()
        };
        assert_eq!(
            webhooks.url_for_event("task.overdue"),
            Some("https://hooks.example.com/overdue")
        );
        assert_eq!(
            webhooks.url_for_event("report.ready"),
            Some("https://hooks.example.com/report")
        );
        assert_eq!(webhooks.url_for_event("task.assigned"), None);
    }
}

use boar_core::config::{SmtpConfig, WebhooksConfig};
use tracing::warn;

use crate::email::EmailDispatcher;
use crate::webhook::WebhookDispatcher;

/// The webhook-channel category each event routes to, per the event catalog.
fn webhook_category(event_type: &str) -> &'static str {
    if event_type.starts_with("contract.") {
        "contract"
    } else if event_type.starts_with("milestone.") {
        "milestone"
    } else if event_type == "compliance.alert" {
        "compliance"
    } else if event_type == "report.ready" {
        "report"
    } else if event_type == "task.overdue" {
        "overdue"
    } else if event_type == "task.assigned" {
        "assignment"
    } else if event_type.starts_with("alert.") {
        "manager"
    } else {
        "manager"
    }
}

/// Ties a [`WebhookDispatcher`] and [`EmailDispatcher`] together behind the
/// fixed event→channel routing table from the event catalog. Unlike the
/// teacher's long-lived, reconnecting `Channel` adapters, webhook and email
/// delivery here are one-shot calls per event — there's no persistent
/// connection to hold open or reconnect, so that shape doesn't carry over.
pub struct Notifier {
    webhooks: WebhooksConfig,
    webhook: WebhookDispatcher,
    email: EmailDispatcher,
}

impl Notifier {
    pub fn new(webhooks: WebhooksConfig, smtp: SmtpConfig) -> Self {
        let secret = webhooks.secret.clone().unwrap_or_default();
        Self { webhook: WebhookDispatcher::new(secret), email: EmailDispatcher::new(smtp), webhooks }
    }

    /// Fire the webhook leg of `event_type`, if a URL is configured for its
    /// channel. A missing URL is a silent no-op (the category is simply not
    /// wired up), matching the spec's "absent URL = category skipped" rule.
    pub async fn notify_webhook(&self, event_type: &str, payload: serde_json::Value) -> bool {
        match self.webhooks.url_for_event(event_type) {
            Some(url) => self.webhook.send(url, event_type, payload).await,
            None => {
                warn!(%event_type, category = webhook_category(event_type), "no webhook URL configured, skipping");
                false
            }
        }
    }

    /// Fire the email leg for events that also go to per-user or manager
    /// inboxes (`report.ready`, `task.overdue`, `task.assigned`, `alert.*`).
    pub async fn notify_email(&self, recipients: &[String], subject: &str, text_body: &str, html_body: &str) -> bool {
        self.email.send(recipients, subject, text_body, html_body).await
    }

    /// `task.overdue`: per-user email + webhook(overdue).
    pub async fn task_overdue(&self, assignee_email: &str, subject: &str, body: &str, payload: serde_json::Value) {
        self.notify_email(std::slice::from_ref(&assignee_email.to_string()), subject, body, body).await;
        self.notify_webhook("task.overdue", payload).await;
    }

    /// `task.assigned`: per-user email + webhook(assignment).
    pub async fn task_assigned(&self, assignee_email: &str, subject: &str, body: &str, payload: serde_json::Value) {
        self.notify_email(std::slice::from_ref(&assignee_email.to_string()), subject, body, body).await;
        self.notify_webhook("task.assigned", payload).await;
    }

    /// `report.ready`: webhook(report) + email to managers.
    pub async fn report_ready(&self, managers: &[String], subject: &str, body: &str, payload: serde_json::Value) {
        self.notify_webhook("report.ready", payload).await;
        self.notify_email(managers, subject, body, body).await;
    }

    /// `alert.<type>`: webhook(manager) + email to managers.
    pub async fn alert(&self, alert_type: &str, managers: &[String], subject: &str, body: &str, payload: serde_json::Value) {
        self.notify_webhook(&format!("alert.{alert_type}"), payload).await;
        self.notify_email(managers, subject, body, body).await;
    }

    /// `contract.expiring` / `contract.expired`: webhook(contract-expiry) only.
    pub async fn contract_event(&self, expired: bool, payload: serde_json::Value) -> bool {
        let event_type = if expired { "contract.expired" } else { "contract.expiring" };
        self.notify_webhook(event_type, payload).await
    }

    /// `milestone.upcoming` / `milestone.overdue`: webhook(milestone) only.
    pub async fn milestone_event(&self, overdue: bool, payload: serde_json::Value) -> bool {
        let event_type = if overdue { "milestone.overdue" } else { "milestone.upcoming" };
        self.notify_webhook(event_type, payload).await
    }

    /// `compliance.alert`: webhook(compliance) only.
    pub async fn compliance_alert(&self, payload: serde_json::Value) -> bool {
        self.notify_webhook("compliance.alert", payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webhook_category_routes_match_the_event_catalog() {
        assert_eq!(webhook_category("contract.expiring"), "contract");
        assert_eq!(webhook_category("contract.expired"), "contract");
        assert_eq!(webhook_category("milestone.upcoming"), "milestone");
        assert_eq!(webhook_category("milestone.overdue"), "milestone");
        assert_eq!(webhook_category("compliance.alert"), "compliance");
        assert_eq!(webhook_category("report.ready"), "report");
        assert_eq!(webhook_category("task.overdue"), "overdue");
        assert_eq!(webhook_category("task.assigned"), "assignment");
        assert_eq!(webhook_category("alert.workload"), "manager");
    }

    #[tokio::test]
    async fn webhook_leg_is_a_noop_when_url_is_unconfigured() {
        let notifier = Notifier::new(WebhooksConfig::default(), SmtpConfig::default());
        let ok = notifier.notify_webhook("task.overdue", serde_json::json!({})).await;
        assert!(!ok);
    }
}

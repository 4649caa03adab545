use boar_core::config::SmtpConfig;
use lettre::message::{header::ContentType, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

/// Sends multipart (plain + HTML) mail over SMTP with STARTTLS. Degrades
/// silently — logging and returning `false` — whenever credentials are
/// missing or the transport fails, so callers never need to special-case
/// "notifications aren't configured".
pub struct EmailDispatcher {
    config: SmtpConfig,
}

impl EmailDispatcher {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    pub async fn send(&self, to: &[String], subject: &str, text_body: &str, html_body: &str) -> bool {
        if !self.is_configured() || to.is_empty() {
            warn!("email delivery skipped: SMTP not configured or no recipients");
            return false;
        }

        let from = self.config.from_email.as_deref().unwrap_or("noreply@boar.local");
        let mut builder = Message::builder().from(from.parse().unwrap_or_else(|_| "noreply@boar.local".parse().unwrap())).subject(subject);
        for addr in to {
            builder = match addr.parse() {
                Ok(mailbox) => builder.to(mailbox),
                Err(e) => {
                    warn!(%addr, error = %e, "skipping invalid recipient address");
                    builder
                }
            };
        }

        let message = match builder.multipart(
            MultiPart::alternative()
                .singlepart(SinglePart::builder().header(ContentType::TEXT_PLAIN).body(text_body.to_string()))
                .singlepart(SinglePart::builder().header(ContentType::TEXT_HTML).body(html_body.to_string())),
        ) {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "failed to build email message");
                return false;
            }
        };

        let host = self.config.host.as_deref().unwrap_or_default();
        let transport = match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host) {
            Ok(builder) => builder
                .credentials(Credentials::new(
                    self.config.user.clone().unwrap_or_default(),
                    self.config.password.clone().unwrap_or_default(),
                ))
                .port(self.config.port.unwrap_or(587))
                .build(),
            Err(e) => {
                warn!(%host, error = %e, "failed to build SMTP transport");
                return false;
            }
        };

        match transport.send(message).await {
            Ok(_) => {
                info!(recipients = to.len(), %subject, "email delivered");
                true
            }
            Err(e) => {
                warn!(error = %e, %subject, "email delivery failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_returns_false_when_unconfigured() {
        let dispatcher = EmailDispatcher::new(SmtpConfig::default());
        let ok = dispatcher.send(&["a@example.com".to_string()], "subj", "text", "<b>html</b>").await;
        assert!(!ok);
    }

    #[tokio::test]
    async fn send_returns_false_with_no_recipients() {
        let config = SmtpConfig {
            host: Some("smtp.example.com".to_string()),
            port: Some(587),
            user: Some("u".to_string()),
            password: Some("p".to_string()),
            from_email: None,
        };
        let dispatcher = EmailDispatcher::new(config);
        assert!(!dispatcher.send(&[], "subj", "text", "html").await);
    }
}

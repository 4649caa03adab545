use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use boar_core::{BoarConfig, LinkState};
use boar_erp::ErpGateway;
use boar_llm::tools::link_identity::IdentityLinker;
use boar_notify::EmailDispatcher;
use chrono::{Duration, Utc};
use rand::Rng;
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::{AuthError, Result};
use crate::types::{LinkOutcome, OtpSession, VerifyOutcome};

const OTP_CODE_LEN: usize = 6;
const MAX_ATTEMPTS: u8 = 3;

/// Implements the NONE → AWAITING_CODE → BOUND state machine. Sessions live
/// in process memory only (an `OtpSession` never outlives the process); the
/// durable half of the state — the `telegram_link_<external_id>` binding —
/// lives in ERP `ir.config_parameter` rows, the one store this service is
/// allowed to own.
pub struct OtpAuthenticator {
    gateway: Arc<ErpGateway>,
    email: EmailDispatcher,
    sessions: Mutex<HashMap<String, OtpSession>>,
    demo_mode: bool,
}

impl OtpAuthenticator {
    pub fn new(gateway: Arc<ErpGateway>, config: &BoarConfig) -> Self {
        Self {
            gateway,
            email: EmailDispatcher::new(config.smtp.clone()),
            sessions: Mutex::new(HashMap::new()),
            demo_mode: config.server.otp_demo_mode,
        }
    }

    /// Current state of `external_id`: `Bound` if an ERP binding exists,
    /// `AwaitingCode` if a live session is pending, else `None`.
    pub async fn state(&self, external_id: &str) -> Result<LinkState> {
        if self.sessions.lock().await.contains_key(external_id) {
            return Ok(LinkState::AwaitingCode);
        }
        match self.resolve(external_id).await? {
            Some(_) => Ok(LinkState::Bound),
            None => Ok(LinkState::None),
        }
    }

    /// `resolve(external_id) -> employee_id`: reads the ERP binding and
    /// returns the pipe-separated employee id, if any.
    pub async fn resolve(&self, external_id: &str) -> Result<Option<i64>> {
        let key = binding_key(external_id);
        let Some(value) = self.gateway.get_config_parameter(&key).await? else {
            return Ok(None);
        };
        Ok(value.split('|').next().and_then(|s| s.parse::<i64>().ok()))
    }

    /// Begin a link attempt: resolves the employee by work email, creates a
    /// session, and emails the code (or echoes it back in demo mode if
    /// delivery fails).
    pub async fn link_start(&self, external_id: &str, work_email: &str) -> Result<LinkOutcome> {
        if self.resolve(external_id).await?.is_some() {
            return Err(AuthError::AlreadyLinked(external_id.to_string()));
        }

        self.gateway.require_model("hr.employee").await.map_err(AuthError::Erp)?;
        let rows = self
            .gateway
            .search_read("hr.employee", serde_json::json!([["work_email", "=", work_email]]), vec!["id"], Some(1), None, None)
            .await?;
        let employee_id = rows
            .first()
            .and_then(|r| r.get("id"))
            .and_then(|v| v.as_i64())
            .ok_or_else(|| AuthError::EmployeeNotFound(work_email.to_string()))?;

        let code = generate_code();
        let session = OtpSession {
            external_id: external_id.to_string(),
            employee_id,
            email: work_email.to_string(),
            code: code.clone(),
            expires_at: Utc::now() + Duration::minutes(10),
            attempts_remaining: MAX_ATTEMPTS,
            created_at: Utc::now(),
        };
        self.sessions.lock().await.insert(external_id.to_string(), session);

        let subject = "Your BOAR verification code";
        let body = format!("Your one-time verification code is {code}. It expires in 10 minutes.");
        let sent = self.email.send(std::slice::from_ref(&work_email.to_string()), subject, &body, &body).await;

        if sent {
            info!(external_id, "otp code emailed");
            Ok(LinkOutcome { email_sent: true, demo_code: None })
        } else if self.demo_mode {
            warn!(external_id, "smtp delivery failed, falling back to demo code echo");
            Ok(LinkOutcome { email_sent: false, demo_code: Some(code) })
        } else {
            warn!(external_id, "smtp delivery failed, code withheld (demo mode disabled)");
            Ok(LinkOutcome { email_sent: false, demo_code: None })
        }
    }

    /// Verify a submitted code in constant time. On success, persists the
    /// ERP binding and deletes the session. On mismatch, decrements
    /// attempts; on zero attempts or expiry, deletes the session. A lapsed
    /// session (already removed, or no session was ever started) also
    /// reports `Expired` rather than an error, so repeated calls after
    /// expiry converge on the same response.
    pub async fn verify(&self, external_id: &str, code: &str) -> Result<VerifyOutcome> {
        let mut sessions = self.sessions.lock().await;
        let session = match sessions.get_mut(external_id) {
            Some(session) => session,
            None => return Ok(VerifyOutcome::Expired),
        };

        if session.is_expired(Utc::now()) {
            sessions.remove(external_id);
            return Ok(VerifyOutcome::Expired);
        }

        if codes_match(&session.code, code) {
            let employee_id = session.employee_id;
            sessions.remove(external_id);
            drop(sessions);

            let key = binding_key(external_id);
            let value = format!("{employee_id}|");
            self.gateway.set_config_parameter(&key, &value).await?;
            info!(external_id, employee_id, "identity bound");
            return Ok(VerifyOutcome::Bound { employee_id });
        }

        session.attempts_remaining = session.attempts_remaining.saturating_sub(1);
        if session.attempts_remaining == 0 {
            sessions.remove(external_id);
            return Ok(VerifyOutcome::Expired);
        }
        Ok(VerifyOutcome::Invalid { attempts_remaining: session.attempts_remaining })
    }

    /// Delete the ERP binding. Idempotent: unlinking an already-unbound
    /// identity is a no-op, not an error. Conversation-memory cleanup is
    /// wired in by the caller (`boar-gateway`'s composition root), since
    /// that memory lives in `boar-llm`, not here.
    pub async fn unlink(&self, external_id: &str) -> Result<()> {
        self.sessions.lock().await.remove(external_id);
        if self.resolve(external_id).await?.is_none() {
            return Ok(());
        }
        let key = binding_key(external_id);
        self.gateway.delete_config_parameter(&key).await?;
        info!(external_id, "identity unlinked");
        Ok(())
    }
}

/// Adapts the richer direct API down to the tool registry's generic
/// `Result<(), String>` contract. Deliberately drops `LinkOutcome` — the
/// chat surface must never echo a raw OTP code into persisted conversation
/// history, demo mode or not.
#[async_trait]
impl IdentityLinker for OtpAuthenticator {
    async fn link_start(&self, external_id: &str, work_email: &str) -> std::result::Result<(), String> {
        self.link_start(external_id, work_email).await.map(|_| ()).map_err(|e| e.to_string())
    }

    async fn unlink(&self, external_id: &str) -> std::result::Result<(), String> {
        self.unlink(external_id).await.map_err(|e| e.to_string())
    }
}

fn binding_key(external_id: &str) -> String {
    format!("telegram_link_{external_id}")
}

fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..OTP_CODE_LEN).map(|_| rng.gen_range(0..=9).to_string()).collect()
}

fn codes_match(expected: &str, actual: &str) -> bool {
    expected.as_bytes().ct_eq(actual.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_code_is_six_digits() {
        let code = generate_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn codes_match_is_constant_time_equality() {
        assert!(codes_match("123456", "123456"));
        assert!(!codes_match("123456", "654321"));
        assert!(!codes_match("123456", "12345"));
    }

    #[test]
    fn binding_key_matches_the_documented_pattern() {
        assert_eq!(binding_key("7777777"), "telegram_link_7777777");
    }
}

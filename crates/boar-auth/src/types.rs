use chrono::{DateTime, Utc};

/// A live, unverified link attempt: one per external identity, process-memory
/// only, deleted on success, expiry, or exhausted attempts.
#[derive(Debug, Clone)]
pub struct OtpSession {
    pub external_id: String,
    pub employee_id: i64,
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub attempts_remaining: u8,
    pub created_at: DateTime<Utc>,
}

impl OtpSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Outcome of `link_start`: whether the code was actually emailed, and — in
/// demo mode only — the code itself, for callers with no real mailbox to
/// check.
#[derive(Debug, Clone)]
pub struct LinkOutcome {
    pub email_sent: bool,
    pub demo_code: Option<String>,
}

/// Outcome of `verify`.
#[derive(Debug, Clone)]
pub enum VerifyOutcome {
    Bound { employee_id: i64 },
    Invalid { attempts_remaining: u8 },
    Expired,
}

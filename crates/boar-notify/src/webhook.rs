use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{info, warn};

use crate::types::WebhookEnvelope;

const MAX_ATTEMPTS: u32 = 3;
const TIMEOUT_SECS: u64 = 30;

/// Delivers webhook events with HMAC-signed, canonical-JSON bodies and a
/// fixed 1-2-4 second exponential retry schedule.
pub struct WebhookDispatcher {
    client: reqwest::Client,
    secret: String,
}

impl WebhookDispatcher {
    pub fn new(secret: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(TIMEOUT_SECS))
            .build()
            .expect("reqwest client builds with static config");
        Self { client, secret: secret.into() }
    }

    /// POST `payload` under `event_type` to `url`. Returns `true` once a
    /// 2xx response is received; exhausts all retries before giving up.
    pub async fn send(&self, url: &str, event_type: &str, payload: serde_json::Value) -> bool {
        let envelope = WebhookEnvelope::new(event_type, payload);
        let body = match envelope.canonical_json() {
            Ok(b) => b,
            Err(e) => {
                warn!(%event_type, error = %e, "failed to serialize webhook envelope");
                return false;
            }
        };
        let signature = self.sign(&body);

        for attempt in 0..MAX_ATTEMPTS {
            let result = self
                .client
                .post(url)
                .header("X-Webhook-Signature", &signature)
                .header("X-Event-Type", event_type)
                .header("X-Timestamp", envelope.timestamp.to_rfc3339())
                .header("Content-Type", "application/json")
                .body(body.clone())
                .send()
                .await;

            match result {
                Ok(resp) if resp.status().is_success() => {
                    info!(%event_type, url, attempt, "webhook delivered");
                    return true;
                }
                Ok(resp) => {
                    warn!(%event_type, url, attempt, status = resp.status().as_u16(), "webhook rejected");
                }
                Err(e) => {
                    warn!(%event_type, url, attempt, error = %e, "webhook transport error");
                }
            }

            if attempt + 1 < MAX_ATTEMPTS {
                let backoff_secs = 2u64.pow(attempt);
                tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
            }
        }

        warn!(%event_type, url, attempts = MAX_ATTEMPTS, "webhook delivery exhausted retries");
        false
    }

    /// `sha256=<hex>`, or the literal `none` when no secret is configured.
    fn sign(&self, body: &[u8]) -> String {
        if self.secret.is_empty() {
            return "none".to_string();
        }
        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts a key of any length");
        mac.update(body);
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_secret_signs_as_none() {
        let dispatcher = WebhookDispatcher::new("");
        assert_eq!(dispatcher.sign(b"body"), "none");
    }

    #[test]
    fn nonempty_secret_produces_a_hex_signature() {
        let dispatcher = WebhookDispatcher::new("shh");
        let sig = dispatcher.sign(b"body");
        assert!(sig.starts_with("sha256="));
        assert_eq!(sig.len(), "sha256=".len() + 64);
    }

    #[test]
    fn signature_is_deterministic_for_the_same_body() {
        let dispatcher = WebhookDispatcher::new("shh");
        assert_eq!(dispatcher.sign(b"same"), dispatcher.sign(b"same"));
        assert_ne!(dispatcher.sign(b"same"), dispatcher.sign(b"different"));
    }
}

pub mod email;
pub mod notifier;
pub mod types;
pub mod webhook;

pub use email::EmailDispatcher;
pub use notifier::Notifier;
pub use types::{contract_expiry_urgency, milestone_urgency, Urgency, WebhookEnvelope};
pub use webhook::WebhookDispatcher;

//! Telegram/external-identity linking via one-time email codes.
//!
//! `OtpAuthenticator` owns the NONE → AWAITING_CODE → BOUND state machine
//! described by the chat surface's `link_identity`/`unlink_identity` tools.
//! Durable state (the binding itself) lives in ERP; everything else is
//! process memory and is allowed to be lost on restart.

pub mod authenticator;
pub mod error;
pub mod types;

pub use authenticator::OtpAuthenticator;
pub use error::{AuthError, Result};
pub use types::{LinkOutcome, OtpSession, VerifyOutcome};

use thiserror::Error;

/// The workspace-wide error taxonomy. Every crate returns `boar_core::Result`
/// rather than inventing its own error enum, so the gateway's HTTP layer has
/// a single place to map failures onto status codes.
#[derive(Debug, Error)]
pub enum BoarError {
    #[error("ERP is unreachable: {0}")]
    ErpUnreachable(String),

    #[error("ERP authentication failed: {0}")]
    ErpAuthFailed(String),

    #[error("ERP call failed: {model}.{method}: {cause}")]
    ErpCallFailed {
        model: String,
        method: String,
        cause: String,
    },

    #[error("ERP module missing: {model}")]
    ErpModuleMissing { model: String },

    #[error("AI is unavailable: {0}")]
    AiUnavailable(String),

    #[error("AI returned malformed JSON: {preview}")]
    AiBadJson { preview: String },

    #[error("AI generation failed: {0}")]
    AiGenerationFailed(String),

    #[error("{what} not found")]
    EntityNotFound { what: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("authentication required")]
    AuthRequired,

    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("integration timed out after {ms}ms")]
    IntegrationTimeout { ms: u64 },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl BoarError {
    /// Short machine-readable code for logging and metrics.
    pub fn code(&self) -> &'static str {
        match self {
            BoarError::ErpUnreachable(_) => "ERP_UNREACHABLE",
            BoarError::ErpAuthFailed(_) => "ERP_AUTH_FAILED",
            BoarError::ErpCallFailed { .. } => "ERP_CALL_FAILED",
            BoarError::ErpModuleMissing { .. } => "ERP_MODULE_MISSING",
            BoarError::AiUnavailable(_) => "AI_UNAVAILABLE",
            BoarError::AiBadJson { .. } => "AI_BAD_JSON",
            BoarError::AiGenerationFailed(_) => "AI_GENERATION_FAILED",
            BoarError::EntityNotFound { .. } => "ENTITY_NOT_FOUND",
            BoarError::ValidationError { .. } => "VALIDATION_ERROR",
            BoarError::AuthRequired => "AUTH_REQUIRED",
            BoarError::RateLimited { .. } => "RATE_LIMITED",
            BoarError::IntegrationTimeout { .. } => "INTEGRATION_TIMEOUT",
            BoarError::Config(_) => "CONFIG_ERROR",
            BoarError::Serialization(_) => "SERIALIZATION_ERROR",
            BoarError::Io(_) => "IO_ERROR",
            BoarError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status mapping per the propagation policy.
    pub fn status_code(&self) -> u16 {
        match self {
            BoarError::ErpModuleMissing { .. } | BoarError::AiUnavailable(_) => 503,
            BoarError::EntityNotFound { .. } => 404,
            BoarError::ValidationError { .. } => 400,
            BoarError::AuthRequired => 401,
            BoarError::RateLimited { .. } => 429,
            _ => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, BoarError>;

use thiserror::Error;

/// Errors that can occur during OTP/session authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No employee record matches the given work email.
    #[error("no employee found with work email {0}")]
    EmployeeNotFound(String),

    /// `link_start` called while the identity is already `Bound`.
    #[error("identity {0} is already linked")]
    AlreadyLinked(String),

    /// Underlying ERP call failed.
    #[error(transparent)]
    Erp(#[from] boar_core::BoarError),
}

pub type Result<T> = std::result::Result<T, AuthError>;

impl From<AuthError> for boar_core::BoarError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Erp(inner) => inner,
            AuthError::EmployeeNotFound(email) => {
                boar_core::BoarError::EntityNotFound { what: format!("employee with work email {email}") }
            }
            other => boar_core::BoarError::ValidationError { message: other.to_string() },
        }
    }
}

use thiserror::Error;

/// Errors that can occur within the scheduler subsystem.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The provided schedule definition is invalid or unsupported.
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    /// No job with the given ID exists in the store.
    #[error("Job not found: {id}")]
    JobNotFound { id: String },

    /// The schedule is exhausted and has no future fire time to compute.
    #[error("Schedule exhausted for job: {id}")]
    ScheduleExhausted { id: String },
}

pub type Result<T> = std::result::Result<T, SchedulerError>;

impl From<SchedulerError> for boar_core::BoarError {
    fn from(e: SchedulerError) -> Self {
        match e {
            SchedulerError::JobNotFound { id } => {
                boar_core::BoarError::EntityNotFound { what: format!("scheduled job {id}") }
            }
            SchedulerError::InvalidSchedule(msg) => boar_core::BoarError::ValidationError { message: msg },
            SchedulerError::ScheduleExhausted { id } => {
                boar_core::BoarError::ValidationError { message: format!("schedule exhausted for job {id}") }
            }
        }
    }
}

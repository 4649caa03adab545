pub mod config;
pub mod error;
pub mod relation;
pub mod types;

pub use config::BoarConfig;
pub use error::{BoarError, Result};
pub use relation::Relation;
pub use types::{AnalysisEnvelope, EmployeeId, ExternalId, LinkState, ReportArtifact};

pub mod bottleneck_detection;
pub mod compliance_score;
pub mod contract_status;
pub mod overdue_severity;
pub mod productivity_report;
pub mod workload_balance;

pub use bottleneck_detection::BottleneckDetection;
pub use compliance_score::ComplianceScorePipeline;
pub use contract_status::ContractStatusPipeline;
pub use overdue_severity::OverdueSeverity;
pub use productivity_report::{Period, ProductivityReport};
pub use workload_balance::WorkloadBalance;

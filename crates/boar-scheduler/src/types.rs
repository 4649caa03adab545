use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A trigger describes when a job fires. Matches the scheduling model: a
/// cron trigger is a 5-field spec, an interval trigger a positive duration,
/// and `Daily`/`Weekly` are the common sugar cases the default catalog
/// actually uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    /// Fire once at an absolute UTC instant.
    Once { at: DateTime<Utc> },
    /// Fire every `seconds` seconds, first fire one interval after registration.
    Interval { seconds: u64 },
    /// Fire at `hour:minute` every day.
    Daily { hour: u32, minute: u32 },
    /// Fire at `hour:minute` on `weekday` (0 = Monday .. 6 = Sunday).
    Weekly { weekday: u32, hour: u32, minute: u32 },
    /// Arbitrary 5-field cron expression (minute hour day-of-month month day-of-week).
    Cron { expr: String },
}

/// A job's current lifecycle state. `Running` and `Paused` are actively
/// tracked by the engine; `Missed` is a point-in-time event rather than a
/// sticky status, so it lives on [`Job::miss_count`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Idle,
    Running,
    Paused,
}

/// Snapshot of a registered job, as returned by `list()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub name: String,
    pub schedule: Schedule,
    pub status: JobStatus,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
    pub run_count: u32,
    pub miss_count: u32,
    pub created_at: DateTime<Utc>,
}

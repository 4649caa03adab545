//! `boar-scheduler` — Tokio-based job scheduler with an in-memory job table.
//!
//! # Overview
//!
//! Jobs are kept in a process-memory table guarded by an async mutex. The
//! [`engine::SchedulerEngine`] ticks once a second, firing any job whose
//! `next_run` has arrived on a bounded worker pool, subject to coalescing,
//! max-instances=1, and a 60 second misfire grace.
//!
//! # Schedule variants
//!
//! | Variant    | Behaviour                                             |
//! |------------|--------------------------------------------------------|
//! | `Once`     | Single fire at an absolute UTC instant                |
//! | `Interval` | Repeat every N seconds                                |
//! | `Daily`    | Fire at HH:MM every day                               |
//! | `Weekly`   | Fire at HH:MM on a specific weekday                   |
//! | `Cron`     | 5-field cron expression, via the `cron` crate         |

pub mod catalog;
pub mod engine;
pub mod error;
pub mod schedule;
pub mod types;

pub use catalog::default_schedules;
pub use engine::{HandlerFn, JobInfo, SchedulerEngine};
pub use error::{Result, SchedulerError};
pub use types::{Job, JobStatus, Schedule};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures_util::future::BoxFuture;
use tokio::sync::{watch, Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::{Result, SchedulerError};
use crate::schedule::compute_next_run;
use crate::types::{Job, JobStatus, Schedule};

const MISFIRE_GRACE: ChronoDuration = ChronoDuration::seconds(60);

/// A job handler: an async closure with no arguments, returning `Ok(())` on
/// success. Failures are logged by the engine and never propagate — the
/// handler owns whatever context it needs via capture (a `boar_erp::ErpGateway`
/// clone, an `Orchestrator`, etc.).
pub type HandlerFn = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

struct Registration {
    job: Job,
    handler: HandlerFn,
}

/// In-memory job table plus a bounded worker pool, implementing the
/// register/start/shutdown/list/trigger/pause/resume contract. Jobs don't
/// survive a restart — there is no own data store here, only ERP state and
/// the schedule definitions a caller re-registers on startup.
pub struct SchedulerEngine {
    jobs: Arc<Mutex<HashMap<String, Registration>>>,
    semaphore: Arc<Semaphore>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tick_handle: Mutex<Option<JoinHandle<()>>>,
}

/// Snapshot returned by [`SchedulerEngine::list`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct JobInfo {
    pub id: String,
    pub name: String,
    pub schedule: Schedule,
    pub status: JobStatus,
    pub next_run: Option<DateTime<Utc>>,
    pub last_run: Option<DateTime<Utc>>,
    pub run_count: u32,
    pub miss_count: u32,
}

impl SchedulerEngine {
    pub fn new(worker_pool_size: usize) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            jobs: Arc::new(Mutex::new(HashMap::new())),
            semaphore: Arc::new(Semaphore::new(worker_pool_size)),
            shutdown_tx,
            shutdown_rx,
            tick_handle: Mutex::new(None),
        }
    }

    /// Register a job, replacing any prior registration under the same id
    /// atomically (the new registration's next_run is computed fresh).
    pub async fn register(&self, id: &str, name: &str, schedule: Schedule, handler: HandlerFn) -> Result<()> {
        let now = Utc::now();
        let next_run = compute_next_run(&schedule, now);
        let job = Job {
            id: id.to_string(),
            name: name.to_string(),
            schedule,
            status: JobStatus::Idle,
            last_run: None,
            next_run,
            run_count: 0,
            miss_count: 0,
            created_at: now,
        };
        let mut jobs = self.jobs.lock().await;
        jobs.insert(id.to_string(), Registration { job, handler });
        info!(job_id = %id, %name, "job registered");
        Ok(())
    }

    /// Start the tick loop as a background task. Idempotent: calling twice
    /// replaces the previous task handle without stopping the old loop, so
    /// callers should only call this once per engine instance.
    pub fn start(self: &Arc<Self>) {
        let this = Arc::clone(self);
        let mut shutdown = this.shutdown_rx.clone();
        let handle = tokio::spawn(async move {
            info!("scheduler engine started");
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        this.tick().await;
                    }
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            info!("scheduler engine shutting down");
                            break;
                        }
                    }
                }
            }
        });
        // start() is called once at boot before any other task can be
        // holding the mutex, so a synchronous try_lock is safe here.
        if let Ok(mut guard) = self.tick_handle.try_lock() {
            *guard = Some(handle);
        }
    }

    /// Signal the tick loop to stop. When `wait` is true, blocks until the
    /// loop task has actually exited.
    pub async fn shutdown(&self, wait: bool) {
        let _ = self.shutdown_tx.send(true);
        if wait {
            let handle = self.tick_handle.lock().await.take();
            if let Some(handle) = handle {
                let _ = handle.await;
            }
        }
    }

    pub async fn list(&self) -> Vec<JobInfo> {
        let jobs = self.jobs.lock().await;
        let mut out: Vec<JobInfo> = jobs.values().map(|r| to_info(&r.job)).collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    /// Manually fire a job now, independent of its schedule. Still respects
    /// max-instances=1: a currently running job is skipped, not queued.
    pub async fn trigger(&self, id: &str) -> Result<()> {
        let mut jobs = self.jobs.lock().await;
        let reg = jobs.get_mut(id).ok_or_else(|| SchedulerError::JobNotFound { id: id.to_string() })?;
        if reg.job.status == JobStatus::Running {
            warn!(job_id = %id, "manual trigger skipped: job already running");
            return Ok(());
        }
        let permit = match self.semaphore.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!(job_id = %id, "manual trigger skipped: worker pool saturated");
                return Ok(());
            }
        };
        dispatch(id, reg, permit, Arc::clone(&self.jobs));
        Ok(())
    }

    pub async fn pause(&self, id: &str) -> Result<()> {
        let mut jobs = self.jobs.lock().await;
        let reg = jobs.get_mut(id).ok_or_else(|| SchedulerError::JobNotFound { id: id.to_string() })?;
        reg.job.status = JobStatus::Paused;
        info!(job_id = %id, "job paused");
        Ok(())
    }

    pub async fn resume(&self, id: &str) -> Result<()> {
        let mut jobs = self.jobs.lock().await;
        let reg = jobs.get_mut(id).ok_or_else(|| SchedulerError::JobNotFound { id: id.to_string() })?;
        reg.job.status = JobStatus::Idle;
        reg.job.next_run = compute_next_run(&reg.job.schedule, Utc::now());
        info!(job_id = %id, "job resumed");
        Ok(())
    }

    /// One pass over all due jobs. Holds the table lock only long enough to
    /// decide what to do with each job and flip its bookkeeping; handler
    /// futures run detached on the worker pool so a slow handler never
    /// stalls the next tick.
    async fn tick(&self) {
        let now = Utc::now();
        let mut jobs = self.jobs.lock().await;
        let due_ids: Vec<String> = jobs
            .iter()
            .filter(|(_, r)| r.job.status != JobStatus::Paused && r.job.next_run.is_some_and(|t| t <= now))
            .map(|(id, _)| id.clone())
            .collect();

        for id in due_ids {
            let reg = match jobs.get_mut(&id) {
                Some(r) => r,
                None => continue,
            };
            let next_run = reg.job.next_run.expect("filtered above");
            let elapsed = now - next_run;

            if reg.job.status == JobStatus::Running {
                // Max-instances=1: still running from a prior slot.
                reg.job.miss_count += 1;
                warn!(job_id = %id, "skipped: still running from a previous slot");
                advance(reg, now);
                continue;
            }

            if elapsed > MISFIRE_GRACE {
                // Misfire grace exceeded: drop this slot rather than re-run.
                reg.job.miss_count += 1;
                warn!(job_id = %id, missed_by_secs = elapsed.num_seconds(), "dropped: misfire grace exceeded");
                advance(reg, now);
                continue;
            }

            // A permit that can't be acquired immediately counts as
            // still-running for max-instances purposes.
            let permit = match self.semaphore.clone().try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => {
                    reg.job.miss_count += 1;
                    warn!(job_id = %id, "skipped: worker pool saturated");
                    advance(reg, now);
                    continue;
                }
            };

            // Coalesce: `advance` jumps straight past any slots that were
            // missed to the next real future slot, so only the latest
            // missed slot actually fires.
            dispatch(&id, reg, permit, Arc::clone(&self.jobs));
            advance(reg, now);
        }
    }
}

/// Advance a job's `next_run` past `now`, coalescing any slots missed along
/// the way into a single jump to the next real future slot.
fn advance(reg: &mut Registration, now: DateTime<Utc>) {
    let current = reg.job.next_run.expect("caller holds a due job");
    let mut next = compute_next_run(&reg.job.schedule, current);
    while let Some(candidate) = next {
        if candidate > now {
            break;
        }
        next = compute_next_run(&reg.job.schedule, candidate);
    }
    reg.job.next_run = next;
}

/// Mark `id` running, spawn its handler on the worker pool holding `permit`
/// for the duration of the handler future, and mark it idle again (recording
/// run/miss bookkeeping) once the handler resolves. The caller acquires
/// `permit` before calling this — both `tick()` and `trigger()` do so and
/// skip dispatch entirely when the pool is saturated, so no job ever runs
/// without a permit held.
fn dispatch(
    id: &str,
    reg: &mut Registration,
    permit: OwnedSemaphorePermit,
    jobs: Arc<Mutex<HashMap<String, Registration>>>,
) {
    reg.job.status = JobStatus::Running;
    let handler = Arc::clone(&reg.handler);
    let id = id.to_string();
    let fired_at = Utc::now();

    tokio::spawn(async move {
        if let Err(e) = handler().await {
            error!(job_id = %id, error = %e, "job handler failed");
        }
        drop(permit);
        let mut jobs = jobs.lock().await;
        if let Some(r) = jobs.get_mut(&id) {
            r.job.status = JobStatus::Idle;
            r.job.last_run = Some(fired_at);
            r.job.run_count += 1;
        }
    });
}

fn to_info(job: &Job) -> JobInfo {
    JobInfo {
        id: job.id.clone(),
        name: job.name.clone(),
        schedule: job.schedule.clone(),
        status: job.status,
        next_run: job.next_run,
        last_run: job.last_run,
        run_count: job.run_count,
        miss_count: job.miss_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn register_then_list_returns_the_job() {
        let engine = SchedulerEngine::new(10);
        engine
            .register("j1", "test job", Schedule::Interval { seconds: 60 }, Arc::new(|| Box::pin(async { Ok(()) })))
            .await
            .unwrap();
        let jobs = engine.list().await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, "j1");
        assert_eq!(jobs[0].status, JobStatus::Idle);
    }

    #[tokio::test]
    async fn replace_existing_overwrites_the_prior_registration() {
        let engine = SchedulerEngine::new(10);
        engine
            .register("j1", "first", Schedule::Interval { seconds: 60 }, Arc::new(|| Box::pin(async { Ok(()) })))
            .await
            .unwrap();
        engine
            .register("j1", "second", Schedule::Interval { seconds: 30 }, Arc::new(|| Box::pin(async { Ok(()) })))
            .await
            .unwrap();
        let jobs = engine.list().await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, "second");
    }

    #[tokio::test]
    async fn trigger_runs_the_handler_once() {
        let engine = SchedulerEngine::new(10);
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = Arc::clone(&calls);
        engine
            .register(
                "j1",
                "counts",
                Schedule::Interval { seconds: 3600 },
                Arc::new(move || {
                    let calls = Arc::clone(&calls2);
                    Box::pin(async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    })
                }),
            )
            .await
            .unwrap();
        engine.trigger("j1").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn trigger_unknown_job_is_not_found() {
        let engine = SchedulerEngine::new(10);
        let err = engine.trigger("missing").await.unwrap_err();
        assert!(matches!(err, SchedulerError::JobNotFound { .. }));
    }

    #[tokio::test]
    async fn pause_then_resume_recomputes_next_run() {
        let engine = SchedulerEngine::new(10);
        engine
            .register("j1", "job", Schedule::Interval { seconds: 60 }, Arc::new(|| Box::pin(async { Ok(()) })))
            .await
            .unwrap();
        engine.pause("j1").await.unwrap();
        assert_eq!(engine.list().await[0].status, JobStatus::Paused);
        engine.resume("j1").await.unwrap();
        let jobs = engine.list().await;
        assert_eq!(jobs[0].status, JobStatus::Idle);
        assert!(jobs[0].next_run.is_some());
    }

    #[test]
    fn advance_coalesces_multiple_missed_interval_slots() {
        let now = Utc::now();
        let mut reg = Registration {
            job: Job {
                id: "j1".into(),
                name: "n".into(),
                schedule: Schedule::Interval { seconds: 60 },
                status: JobStatus::Idle,
                last_run: None,
                next_run: Some(now - ChronoDuration::seconds(600)),
                run_count: 0,
                miss_count: 0,
                created_at: now,
            },
            handler: Arc::new(|| Box::pin(async { Ok(()) })),
        };
        advance(&mut reg, now);
        let next = reg.job.next_run.unwrap();
        assert!(next > now);
        assert!((next - now).num_seconds() <= 60);
    }
}

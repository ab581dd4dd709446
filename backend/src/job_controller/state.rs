//! Tracks long-running background jobs such as certificate issuance.
//!
//! - `JobsState`: clonable, shared map of job id to `JobStatus`, injected into
//!   the Actix application state in `main.rs`.
//! - `JobUpdate`: a status change sent by a worker.
//! - `start_job_updater`: the single task that applies `JobUpdate`s to the map.
//!
//! Workers never write the map directly; they only hold a channel sender.
//! Finished jobs stay queryable for `FINISHED_JOB_RETENTION` and are dropped
//! the next time the map is written after that.

use common::jobs::JobStatus;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, RwLock};

/// Capacity of the update channel between workers and the updater task.
const UPDATE_BUFFER: usize = 100;

/// How long a completed or failed job can still be polled.
pub const FINISHED_JOB_RETENTION: Duration = Duration::from_secs(30 * 60);

/// Status of one job plus when it reached a final state.
#[derive(Debug, Clone)]
pub struct TrackedJob {
    pub status: JobStatus,
    finished_at: Option<Instant>,
}

impl TrackedJob {
    fn new(status: JobStatus) -> Self {
        let finished_at = status.is_finished().then(Instant::now);
        Self {
            status,
            finished_at,
        }
    }

    fn expired(&self, now: Instant, retention: Duration) -> bool {
        self.finished_at
            .is_some_and(|at| now.saturating_duration_since(at) >= retention)
    }
}

/// Shared state of all background jobs.
#[derive(Clone)]
pub struct JobsState {
    /// Current status per job id. Read by the status endpoint, written only by
    /// `start_job_updater` (and once by the scheduler to register a job).
    pub jobs: Arc<RwLock<HashMap<String, TrackedJob>>>,

    /// Sender workers use to report progress.
    pub tx: mpsc::Sender<JobUpdate>,

    retention: Duration,
}

impl JobsState {
    /// Creates the state and the receiving end to hand to `start_job_updater`.
    pub fn new() -> (Self, mpsc::Receiver<JobUpdate>) {
        Self::with_retention(FINISHED_JOB_RETENTION)
    }

    pub fn with_retention(retention: Duration) -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(UPDATE_BUFFER);
        let state = Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
            retention,
        };
        (state, rx)
    }

    /// Registers a new job as `Pending`.
    pub async fn register(&self, job_id: &str) {
        let mut jobs = self.jobs.write().await;
        self.evict_expired(&mut jobs);
        jobs.insert(job_id.to_string(), TrackedJob::new(JobStatus::Pending));
    }

    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs
            .read()
            .await
            .get(job_id)
            .map(|job| job.status.clone())
    }

    fn evict_expired(&self, jobs: &mut HashMap<String, TrackedJob>) {
        let now = Instant::now();
        jobs.retain(|_, job| !job.expired(now, self.retention));
    }
}

/// A status change for one job.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

impl JobUpdate {
    pub fn new(job_id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            job_id: job_id.into(),
            status,
        }
    }
}

/// Applies incoming updates until every sender is gone. Spawned once from
/// `main.rs`.
///
/// A finished job keeps its final status: late progress messages racing the
/// completion report are dropped.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        state.evict_expired(&mut jobs);
        let finished = jobs
            .get(&update.job_id)
            .is_some_and(|job| job.status.is_finished());
        if !finished {
            jobs.insert(update.job_id, TrackedJob::new(update.status));
        }
    }
}

//! Progress-tracked job runner.
//!
//! Polls a job's progress resource with a fixed delay between the end of
//! one fetch and the start of the next, publishes a display fraction to a
//! progress target and fires a completion callback once all work is done.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use seed_model::{JobKey, JobProgress, JobStatus, TransportError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{JobError, Result};

/// Source of job progress.
#[async_trait]
pub trait ProgressSource: Send + Sync {
    async fn fetch_job_progress(&self, key: &JobKey)
    -> std::result::Result<JobProgress, TransportError>;
}

#[async_trait]
impl<T: ProgressSource + ?Sized> ProgressSource for Arc<T> {
    async fn fetch_job_progress(
        &self,
        key: &JobKey,
    ) -> std::result::Result<JobProgress, TransportError> {
        (**self).fetch_job_progress(key).await
    }
}

/// What the operator sees of a running job.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProgressDisplay {
    /// Overall completion in `[0, 1]`.
    pub fraction: f64,
    pub numerator: u64,
    pub denominator: u64,
}

impl ProgressDisplay {
    /// `start_fraction + multiplier * numerator / denominator`, clamped.
    ///
    /// A job reporting no work yet shows just the start fraction.
    pub fn scaled(progress: &JobProgress, start_fraction: f64, multiplier: f64) -> Self {
        Self {
            fraction: (start_fraction + multiplier * progress.fraction()).clamp(0.0, 1.0),
            numerator: progress.numerator,
            denominator: progress.denominator,
        }
    }

    pub fn percent(&self) -> f64 {
        self.fraction * 100.0
    }
}

/// Receives progress updates, typically a progress bar.
pub trait ProgressTarget: Send + Sync {
    fn update(&self, display: ProgressDisplay);
}

/// Progress target that keeps every update in memory.
#[derive(Debug, Clone, Default)]
pub struct SharedProgress {
    updates: Arc<Mutex<Vec<ProgressDisplay>>>,
}

impl SharedProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last published update.
    pub fn latest(&self) -> Option<ProgressDisplay> {
        self.updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
    }

    pub fn updates(&self) -> Vec<ProgressDisplay> {
        self.updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProgressTarget for SharedProgress {
    fn update(&self, display: ProgressDisplay) {
        self.updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(display);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct JobRunnerConfig {
    /// Delay between the end of one fetch and the start of the next.
    pub poll_interval: Duration,
}

impl Default for JobRunnerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// Starts polling tasks against one progress source.
#[derive(Debug)]
pub struct JobRunner<S: ?Sized> {
    source: Arc<S>,
    config: JobRunnerConfig,
}

impl<S: ?Sized> Clone for JobRunner<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            config: self.config,
        }
    }
}

impl<S: ProgressSource + ?Sized + 'static> JobRunner<S> {
    pub fn new(source: Arc<S>, config: JobRunnerConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &JobRunnerConfig {
        &self.config
    }

    /// Spawns the polling task for `job_key`.
    ///
    /// `on_complete` runs exactly once when the job reports all work done
    /// and never on error, warning, transport failure or cancellation.
    /// Must be called from within a tokio runtime.
    pub fn run<F>(
        &self,
        job_key: JobKey,
        start_fraction: f64,
        multiplier: f64,
        on_complete: F,
        target: Arc<dyn ProgressTarget>,
    ) -> JobHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let token = CancellationToken::new();
        let poll = Poll {
            source: Arc::clone(&self.source),
            key: job_key.clone(),
            start_fraction,
            multiplier,
            interval: self.config.poll_interval,
            target,
            token: token.clone(),
        };
        debug!(job = %job_key, start_fraction, multiplier, "starting progress polling");
        let task = tokio::spawn(poll.run(on_complete));
        JobHandle {
            key: job_key,
            token,
            task,
        }
    }
}

struct Poll<S: ?Sized> {
    source: Arc<S>,
    key: JobKey,
    start_fraction: f64,
    multiplier: f64,
    interval: Duration,
    target: Arc<dyn ProgressTarget>,
    token: CancellationToken,
}

impl<S: ProgressSource + ?Sized> Poll<S> {
    async fn run<F: FnOnce()>(self, on_complete: F) -> Result<JobProgress> {
        let mut last_numerator: Option<u64> = None;
        loop {
            let fetched = tokio::select! {
                biased;
                () = self.token.cancelled() => return Err(self.cancelled()),
                fetched = self.source.fetch_job_progress(&self.key) => fetched,
            };
            let progress = fetched.map_err(|err| {
                warn!(job = %self.key, error = %err, "progress fetch failed");
                JobError::from(err)
            })?;

            match progress.status {
                JobStatus::Error => {
                    warn!(job = %self.key, "job finished with an error");
                    return Err(JobError::Failed {
                        key: self.key.clone(),
                    });
                }
                JobStatus::Warning => {
                    warn!(job = %self.key, "job finished with a warning");
                    return Err(JobError::Warning {
                        key: self.key.clone(),
                    });
                }
                JobStatus::Running | JobStatus::Success => {}
            }

            match last_numerator {
                Some(last) if progress.numerator < last => {
                    warn!(
                        job = %self.key,
                        last,
                        numerator = progress.numerator,
                        "progress went backwards, ignoring"
                    );
                }
                _ => {
                    last_numerator = Some(progress.numerator);
                    let shown =
                        ProgressDisplay::scaled(&progress, self.start_fraction, self.multiplier);
                    debug!(
                        job = %self.key,
                        numerator = shown.numerator,
                        denominator = shown.denominator,
                        percent = shown.percent(),
                        "progress"
                    );
                    self.target.update(shown);
                }
            }

            if progress.is_done() {
                info!(job = %self.key, "job complete");
                on_complete();
                return Ok(progress);
            }

            tokio::select! {
                biased;
                () = self.token.cancelled() => return Err(self.cancelled()),
                () = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    fn cancelled(&self) -> JobError {
        info!(job = %self.key, "progress polling cancelled");
        JobError::Cancelled {
            key: self.key.clone(),
        }
    }
}

/// Owned handle of a polling task.
#[derive(Debug)]
pub struct JobHandle {
    key: JobKey,
    token: CancellationToken,
    task: JoinHandle<Result<JobProgress>>,
}

impl JobHandle {
    pub fn key(&self) -> &JobKey {
        &self.key
    }

    /// Stops polling without calling the completion callback. The progress
    /// target keeps its last update. Calling it again has no effect.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the polling task to stop and returns its final progress.
    pub async fn wait(self) -> Result<JobProgress> {
        match self.task.await {
            Ok(result) => result,
            Err(err) => Err(JobError::Interrupted {
                key: self.key,
                message: err.to_string(),
            }),
        }
    }
}

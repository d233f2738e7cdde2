//! Batch orchestration: fan-out, join-all, and report assembly.
//!
//! The engine owns the client pool and the clock. One call to
//! [`DeleteEngine::delete_artifacts`] processes one finite batch: spawn N
//! workers over a shared queue, wait for every target to reach a terminal
//! outcome, and return the finished report. Per-target failures land in
//! the report; only engine malfunction aborts the call.

use std::{sync::Arc, time::Duration};

use sweeper_core::{Artifact, Clock, RealClock};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::{
    client::ClientConfig,
    error::{DeleteError, Result},
    pool::ClientPool,
    progress::ProgressReporter,
    report::{BatchReport, ReportBuilder},
    retry::RetryPolicy,
    worker::{DeleteWorker, WorkQueue},
};

/// Configuration for the delete engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of concurrent delete workers.
    pub concurrency: usize,

    /// Retry policy applied to every target.
    pub retry_policy: RetryPolicy,

    /// HTTP client configuration.
    pub client_config: ClientConfig,

    /// Tick interval of the progress reporter.
    pub progress_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: crate::DEFAULT_DELETE_CONCURRENCY,
            retry_policy: RetryPolicy::default(),
            client_config: ClientConfig::default(),
            progress_interval: Duration::from_secs(1),
        }
    }
}

/// Artifact deletion engine with bounded parallelism and retries.
pub struct DeleteEngine {
    pub(crate) config: EngineConfig,
    pub(crate) pool: Arc<ClientPool>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl DeleteEngine {
    /// Creates an engine with the given configuration and the system
    /// clock.
    ///
    /// # Errors
    ///
    /// Returns [`DeleteError::Configuration`] if the HTTP clients cannot
    /// be built.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(RealClock::new()))
    }

    /// Creates an engine with an injected clock.
    ///
    /// Tests pass a `TestClock` so backoff sleeps advance virtual time
    /// instead of wall time.
    ///
    /// # Errors
    ///
    /// Returns [`DeleteError::Configuration`] if the HTTP clients cannot
    /// be built.
    pub fn with_clock(config: EngineConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let slots = config.concurrency.max(1);
        let pool = Arc::new(ClientPool::new(slots, config.client_config.clone())?);
        Ok(Self { config, pool, clock })
    }

    /// Deletes every artifact in the batch and returns the full
    /// accounting.
    ///
    /// Processes each target exactly once across `concurrency` workers and
    /// returns only when every target has reached a terminal outcome. A
    /// target that cannot be deleted is reported in the `failed` bucket;
    /// it never fails the call.
    ///
    /// # Errors
    ///
    /// Returns an error only on engine malfunction: a panicked worker or
    /// an incomplete report.
    pub async fn delete_artifacts(&self, artifacts: Vec<Artifact>) -> Result<BatchReport> {
        let total = artifacts.len();
        info!(total, concurrency = self.config.concurrency, "starting artifact delete batch");

        if total == 0 {
            return Ok(BatchReport::default());
        }

        let worker_count = self.config.concurrency.max(1).min(total);
        let queue = Arc::new(WorkQueue::new(artifacts));
        let report = Arc::new(RwLock::new(ReportBuilder::new()));

        let mut progress = ProgressReporter::with_interval(total, self.config.progress_interval);
        progress.start();

        let mut handles = Vec::with_capacity(worker_count);
        for slot in 0..worker_count {
            let worker = DeleteWorker::new(
                slot,
                self.pool.clone(),
                self.config.retry_policy.clone(),
                self.clock.clone(),
                queue.clone(),
                report.clone(),
                progress.counter(),
            );
            handles.push(tokio::spawn(worker.run()));
        }

        let mut failure: Option<DeleteError> = None;
        for (worker_id, handle) in handles.into_iter().enumerate() {
            if let Err(join_error) = handle.await {
                error!(worker_id, error = %join_error, "delete worker terminated abnormally");
                failure
                    .get_or_insert_with(|| DeleteError::worker_panic(worker_id, join_error.to_string()));
            }
        }

        progress.stop().await;

        if let Err(pool_error) = self.pool.dispose_all().await {
            warn!(error = %pool_error, "failed to refresh client pool after batch");
        }

        if let Some(engine_error) = failure {
            return Err(engine_error);
        }

        let report = Arc::try_unwrap(report)
            .map_err(|_| DeleteError::internal("batch report still shared after workers joined"))?
            .into_inner()
            .finish();

        if !report.is_complete_for(total) {
            return Err(DeleteError::internal(format!(
                "batch report accounts for {} of {} targets",
                report.deleted.count + report.failed.count,
                total
            )));
        }

        info!(
            deleted = report.deleted.count,
            failed = report.failed.count,
            "artifact delete batch finished"
        );

        Ok(report)
    }
}

//! Work distribution and the per-target delete protocol.
//!
//! A fixed set of workers drain a shared atomic queue. Claiming is a
//! single `fetch_add`, so each target is handed to exactly one worker by
//! construction. Each worker runs the full retry protocol for its current
//! target before claiming the next; a target's permanent failure is
//! recorded and never aborts the batch.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use sweeper_core::{Artifact, Clock};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{
    client::{request_headers, send_delete},
    error::{DeleteError, Result},
    pool::ClientPool,
    progress::ProgressCounter,
    report::ReportBuilder,
    retry::{classify_status, Disposition, RetryPolicy},
};

/// Shared work source handing out each target exactly once.
#[derive(Debug)]
pub struct WorkQueue {
    targets: Vec<Artifact>,
    cursor: AtomicUsize,
}

impl WorkQueue {
    /// Creates a queue over the batch targets.
    pub fn new(targets: Vec<Artifact>) -> Self {
        Self { targets, cursor: AtomicUsize::new(0) }
    }

    /// Number of targets in the queue.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the queue was created empty.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Claims the next unclaimed target, or `None` when exhausted.
    pub fn claim(&self) -> Option<Artifact> {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.targets.get(index).cloned()
    }
}

/// One delete worker bound to a client-pool slot.
pub(crate) struct DeleteWorker {
    slot: usize,
    pool: Arc<ClientPool>,
    policy: RetryPolicy,
    clock: Arc<dyn Clock>,
    queue: Arc<WorkQueue>,
    report: Arc<RwLock<ReportBuilder>>,
    progress: ProgressCounter,
}

impl DeleteWorker {
    pub fn new(
        slot: usize,
        pool: Arc<ClientPool>,
        policy: RetryPolicy,
        clock: Arc<dyn Clock>,
        queue: Arc<WorkQueue>,
        report: Arc<RwLock<ReportBuilder>>,
        progress: ProgressCounter,
    ) -> Self {
        Self { slot, pool, policy, clock, queue, report, progress }
    }

    /// Drains the queue, recording one terminal outcome per claimed
    /// target.
    pub async fn run(self) {
        debug!(worker = self.slot, "delete worker starting");

        while let Some(artifact) = self.queue.claim() {
            let started = self.clock.now();

            match self.delete_single(&artifact).await {
                Ok(()) => {
                    self.report.write().await.record_deleted(&artifact);
                    info!(
                        worker = self.slot,
                        name = %artifact.name,
                        elapsed_ms = self.clock.now().duration_since(started).as_millis() as u64,
                        "artifact deleted"
                    );
                },
                Err(error) => {
                    self.report.write().await.record_failed(&artifact);
                    warn!(
                        worker = self.slot,
                        name = %artifact.name,
                        error = %error,
                        "artifact delete failed"
                    );
                },
            }

            self.progress.increment();
        }

        debug!(worker = self.slot, "delete worker finished");
    }

    /// Drives the retry protocol for one target until terminal success or
    /// terminal failure.
    async fn delete_single(&self, artifact: &Artifact) -> Result<()> {
        let mut retry_count: u32 = 0;
        let headers = request_headers(self.pool.config(), true)?;
        let timeout = self.pool.config().timeout;

        loop {
            let client = self.pool.client(self.slot).await;

            let retry_after = match send_delete(&client, &artifact.url, headers.clone(), timeout)
                .await
            {
                Ok(response) => match classify_status(response.status) {
                    Disposition::Success => return Ok(()),
                    Disposition::Throttled => {
                        info!(
                            name = %artifact.name,
                            status = response.status,
                            retry_after_seconds = response.retry_after_seconds,
                            "throttled while deleting artifact"
                        );
                        response.retry_after_seconds
                    },
                    Disposition::Retryable => {
                        info!(
                            name = %artifact.name,
                            status = response.status,
                            "retryable response while deleting artifact"
                        );
                        None
                    },
                    Disposition::Fatal => {
                        return Err(DeleteError::unexpected_status(response.status));
                    },
                },
                Err(error) if error.is_retryable() => {
                    info!(name = %artifact.name, error = %error, "transport failure while deleting artifact");
                    None
                },
                Err(error) => return Err(error),
            };

            retry_count += 1;
            if retry_count > self.policy.retry_limit {
                return Err(DeleteError::retry_limit_exceeded(retry_count, &artifact.name));
            }

            // The prior failure may have left the connection in a bad
            // state; retries never reuse it.
            self.pool.replace(self.slot).await?;

            let delay = match retry_after {
                Some(seconds) => std::time::Duration::from_secs(seconds),
                None => self.policy.backoff_delay(retry_count),
            };
            info!(
                name = %artifact.name,
                retry = retry_count,
                delay_ms = delay.as_millis() as u64,
                "backing off before retrying delete"
            );
            self.clock.sleep(delay).await;
        }
    }
}

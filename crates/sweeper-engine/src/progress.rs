//! Periodic, best-effort progress signal for a running batch.
//!
//! Workers bump a shared counter after every terminal outcome; a ticker
//! task logs the processed/total ratio once per interval. The reporter is
//! purely observational: its absence or failure never affects the batch
//! result. It is started before dispatch begins and stopped on every
//! engine exit path.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Shared handle workers use to record a processed target.
#[derive(Debug, Clone)]
pub struct ProgressCounter {
    processed: Arc<AtomicUsize>,
}

impl ProgressCounter {
    /// Records one target reaching a terminal outcome.
    pub fn increment(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Periodic processed/total reporter scoped to one batch call.
#[derive(Debug)]
pub struct ProgressReporter {
    total: usize,
    processed: Arc<AtomicUsize>,
    interval: Duration,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    /// Creates a reporter for `total` expected targets, ticking once per
    /// second.
    pub fn new(total: usize) -> Self {
        Self::with_interval(total, Duration::from_secs(1))
    }

    /// Creates a reporter with a custom tick interval.
    pub fn with_interval(total: usize, interval: Duration) -> Self {
        Self {
            total,
            processed: Arc::new(AtomicUsize::new(0)),
            interval,
            token: CancellationToken::new(),
            handle: None,
        }
    }

    /// Returns the counter handle workers increment.
    pub fn counter(&self) -> ProgressCounter {
        ProgressCounter { processed: self.processed.clone() }
    }

    /// Number of targets processed so far.
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }

    /// Spawns the ticker task. Calling `start` twice is a no-op.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }

        let total = self.total;
        let processed = self.processed.clone();
        let token = self.token.clone();
        let period = self.interval;

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // interval fires immediately; skip the zero-progress tick
            ticker.tick().await;

            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        info!(
                            processed = processed.load(Ordering::Relaxed),
                            total,
                            "artifact delete progress"
                        );
                    }
                }
            }
        }));
    }

    /// Cancels the ticker and waits for it to finish.
    pub async fn stop(&mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counter_increments_are_visible() {
        let reporter = ProgressReporter::new(5);
        let counter = reporter.counter();

        counter.increment();
        counter.increment();

        assert_eq!(reporter.processed(), 2);
    }

    #[tokio::test]
    async fn stop_terminates_the_ticker() {
        let mut reporter = ProgressReporter::with_interval(10, Duration::from_millis(10));
        reporter.start();

        tokio::time::sleep(Duration::from_millis(30)).await;

        // stop() joins the ticker task; a hung ticker would block here
        tokio::time::timeout(Duration::from_secs(1), reporter.stop())
            .await
            .expect("stop should complete promptly");
    }

    #[tokio::test]
    async fn start_twice_is_harmless() {
        let mut reporter = ProgressReporter::with_interval(1, Duration::from_millis(10));
        reporter.start();
        reporter.start();

        reporter.stop().await;
    }
}

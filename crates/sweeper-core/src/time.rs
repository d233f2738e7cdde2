//! Clock abstraction for backoff sleeps and elapsed-time measurement.
//!
//! The deletion engine never calls `tokio::time::sleep` directly; it sleeps
//! through an injected [`Clock`] so tests can advance virtual time instead
//! of waiting out real backoff delays.

use std::{
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

/// Injectable time source.
///
/// Production code uses [`RealClock`]; tests inject [`TestClock`] to make
/// retry timing deterministic.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Returns the current instant for duration measurements.
    fn now(&self) -> Instant;

    /// Sleeps for the specified duration.
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Production clock backed by system time and tokio's timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealClock;

impl RealClock {
    /// Creates a new real clock instance.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for RealClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Test clock with controllable virtual time.
///
/// `sleep` advances the virtual clock immediately and yields, so a test
/// exercising a multi-second backoff sequence completes in microseconds
/// while [`TestClock::elapsed`] still reports the full waited duration.
#[derive(Debug, Clone)]
pub struct TestClock {
    elapsed_ns: Arc<AtomicU64>,
    base_instant: Instant,
}

impl TestClock {
    /// Creates a new test clock with zero elapsed time.
    pub fn new() -> Self {
        Self { elapsed_ns: Arc::new(AtomicU64::new(0)), base_instant: Instant::now() }
    }

    /// Advances virtual time by the specified duration.
    pub fn advance(&self, duration: Duration) {
        let duration_ns = u64::try_from(duration.as_nanos().min(u128::from(u64::MAX))).unwrap_or(0);
        self.elapsed_ns.fetch_add(duration_ns, Ordering::AcqRel);
    }

    /// Returns total virtual time elapsed since clock creation.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_ns.load(Ordering::Acquire))
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        self.base_instant + self.elapsed()
    }

    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        self.advance(duration);
        Box::pin(tokio::task::yield_now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances() {
        let clock = TestClock::new();
        let start = clock.now();

        clock.advance(Duration::from_secs(10));

        assert_eq!(clock.now().duration_since(start), Duration::from_secs(10));
        assert_eq!(clock.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_clock_sleep_is_virtual() {
        let clock = TestClock::new();
        let wall_start = Instant::now();

        clock.sleep(Duration::from_secs(30)).await;

        assert_eq!(clock.elapsed(), Duration::from_secs(30));
        assert!(wall_start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn shared_handles_observe_the_same_time() {
        let clock = TestClock::new();
        let other = clock.clone();

        clock.advance(Duration::from_secs(2));

        assert_eq!(other.elapsed(), Duration::from_secs(2));
    }
}

//! Clock abstraction for testable retry timing.
//!
//! The API client waits between retry attempts. Injecting the clock keeps
//! those waits out of the test suite: production code uses [`RealClock`],
//! tests inject a [`TestClock`] whose sleeps complete immediately while still
//! recording how long the code *asked* to wait.

use std::{
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

/// Time source injected into anything that waits or measures durations.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Returns the current instant for duration measurements.
    fn now(&self) -> Instant;

    /// Suspends the calling task for `duration`.
    ///
    /// The wait is cooperative: unrelated tasks on the same runtime keep
    /// running while this future is pending.
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Production clock backed by the system and the tokio timer.
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

/// Deterministic clock for tests.
///
/// Time only moves when [`advance`](TestClock::advance) is called or when a
/// sleep is awaited. Clones share the same counter, so a test can hand one
/// clone to the code under test and read [`elapsed`](TestClock::elapsed) on
/// another.
#[derive(Debug, Clone)]
pub struct TestClock {
    /// Virtual nanoseconds since clock creation.
    advanced_ns: Arc<AtomicU64>,
    /// Base instant virtual time is measured from.
    base_instant: Instant,
}

impl TestClock {
    /// Creates a new test clock with no elapsed time.
    pub fn new() -> Self {
        Self { advanced_ns: Arc::new(AtomicU64::new(0)), base_instant: Instant::now() }
    }

    /// Advances virtual time by `duration`.
    pub fn advance(&self, duration: Duration) {
        let duration_ns = u64::try_from(duration.as_nanos().min(u128::from(u64::MAX))).unwrap_or(0);
        self.advanced_ns.fetch_add(duration_ns, Ordering::AcqRel);
    }

    /// Total virtual time that has passed since clock creation.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.advanced_ns.load(Ordering::Acquire))
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
        // Sleeping in tests advances the clock instead of waiting.
        self.advance(duration);
        // Yield so other tasks get a turn, mirroring a real await point.
        Box::pin(tokio::task::yield_now())
    }
}

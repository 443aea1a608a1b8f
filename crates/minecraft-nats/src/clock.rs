//! Clock abstraction so cooldowns, backoff, and delivery delays are
//! testable without real sleeps.

use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::time::{Duration, Instant};

/// Abstraction over the runtime clock.
pub trait Clock: Send + Sync + 'static {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Sleep for the given duration (no-op in mock implementations).
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Live implementation backed by tokio time.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Mock clock for unit tests.
///
/// `now()` returns a fixed instant that only moves when `advance()` is
/// called; `sleep()` returns immediately.
#[derive(Clone)]
pub struct MockClock {
    current: Arc<Mutex<Instant>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Advance the mocked time by `duration`.
    pub fn advance(&self, duration: Duration) {
        *self.current.lock().unwrap() += duration;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        *self.current.lock().unwrap()
    }

    async fn sleep(&self, _duration: Duration) {
        // Tests control time with advance()
    }
}

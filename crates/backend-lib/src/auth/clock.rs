// ============================
// crates/backend-lib/src/auth/clock.rs
// ============================
//! Time source used by the rate limiter.
//!
//! Production code uses [`SystemClock`]. Tests (and crates enabling the
//! `test-helpers` feature) can use [`ManualClock`] to move time explicitly.

use std::fmt::Debug;
use std::time::Instant;

/// Monotonic time source
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> Instant;
}

/// Clock backed by `Instant::now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub use manual::ManualClock;

#[cfg(any(test, feature = "test-helpers"))]
mod manual {
    use super::Clock;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    /// Clock that only moves when told to.
    ///
    /// Clones share the same time value, so a clone handed to a limiter can
    /// be advanced from the test body.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        current: Arc<Mutex<Instant>>,
    }

    impl ManualClock {
        pub fn new(start: Instant) -> Self {
            Self {
                current: Arc::new(Mutex::new(start)),
            }
        }

        /// Move the clock forward
        pub fn advance(&self, by: Duration) {
            *self.current.lock() += by;
        }

        pub fn set(&self, instant: Instant) {
            *self.current.lock() = instant;
        }
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::new(Instant::now())
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.current.lock()
        }
    }
}

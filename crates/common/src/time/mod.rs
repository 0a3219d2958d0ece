//! Time abstraction for testability
//!
//! Staleness checks and the idle-probe rate limit read time through
//! [`Clock`] so tests can move time forward without sleeping.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use octotriage_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::new();
//! let start = clock.now();
//! clock.advance(Duration::from_secs(5));
//! assert_eq!(clock.now().duration_since(start), Duration::from_secs(5));
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Source of monotonic and wall-clock time.
pub trait Clock: Send + Sync {
    /// Monotonic instant, for measuring intervals.
    fn now(&self) -> Instant;

    /// Current wall-clock time in UTC.
    fn utc_now(&self) -> DateTime<Utc>;
}

/// Real system clock. Use this in production code.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for deterministic tests.
///
/// Clones share the same elapsed time, so a clone handed to a store can be
/// advanced from the test body.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    base_utc: DateTime<Utc>,
    elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Create a clock anchored at the current real time.
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Create a clock whose wall time starts at `base_utc`.
    pub fn starting_at(base_utc: DateTime<Utc>) -> Self {
        Self { start: Instant::now(), base_utc, elapsed: Arc::new(Mutex::new(Duration::ZERO)) }
    }

    /// Simulate time passing without waiting.
    pub fn advance(&self, duration: Duration) {
        *self.elapsed.lock() += duration;
    }

    /// Replace the simulated elapsed time.
    pub fn set_elapsed(&self, duration: Duration) {
        *self.elapsed.lock() = duration;
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        self.base_utc + chrono::Duration::from_std(self.elapsed()).unwrap_or(chrono::Duration::MAX)
    }
}

//! Randomized politeness delay applied before outbound requests.
//!
//! The book host blocks clients that fire requests at a steady machine pace,
//! so every call is preceded by a pause drawn uniformly from
//! `[0, max_delay)`. The pause is slept in short ticks so a progress observer
//! can follow it.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use pagegrab_core::download::PolitenessGate;
//! use pagegrab_core::progress::NoopObserver;
//!
//! # async fn example() {
//! let gate = PolitenessGate::new(Duration::from_millis(2000));
//! let slept = gate.wait(&NoopObserver).await;
//! assert!(slept < Duration::from_millis(2000));
//! # }
//! ```

use std::time::Duration;

use rand::Rng;
use tracing::{debug, instrument};

use super::constants::{DEFAULT_MAX_DELAY, WAIT_TICK};
use crate::progress::ProgressObserver;

/// Politeness gate that sleeps a random duration before each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolitenessGate {
    /// Exclusive upper bound of the random delay.
    max_delay: Duration,
    /// Longest single sleep between observer notifications.
    tick: Duration,
}

impl Default for PolitenessGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DELAY)
    }
}

impl PolitenessGate {
    /// Creates a gate drawing delays from `[0, max_delay)`.
    ///
    /// A zero `max_delay` yields a disabled gate.
    #[must_use]
    pub fn new(max_delay: Duration) -> Self {
        Self {
            max_delay,
            tick: WAIT_TICK,
        }
    }

    /// Creates a gate that never sleeps.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Returns whether the gate applies no delay.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.max_delay.is_zero()
    }

    /// Returns the exclusive upper bound of the random delay.
    #[must_use]
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Draws the next delay uniformly from `[0, max_delay)` at millisecond resolution.
    #[must_use]
    pub fn draw_delay(&self) -> Duration {
        let max_ms = u64::try_from(self.max_delay.as_millis()).unwrap_or(u64::MAX);
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..max_ms))
    }

    /// Sleeps a freshly drawn random delay and returns it.
    ///
    /// An enabled gate reports `wait_started` on every call, even when the
    /// draw is zero; a disabled gate reports nothing.
    #[instrument(level = "trace", skip_all)]
    pub async fn wait(&self, observer: &dyn ProgressObserver) -> Duration {
        if self.is_disabled() {
            return Duration::ZERO;
        }
        let delay = self.draw_delay();
        debug!(delay_ms = delay.as_millis(), "politeness wait");
        observer.wait_started(delay);
        self.tick_through(delay, observer).await;
        delay
    }

    /// Sleeps exactly `delay`, notifying `observer` after every tick.
    pub async fn sleep_for(&self, delay: Duration, observer: &dyn ProgressObserver) {
        if delay.is_zero() {
            return;
        }
        observer.wait_started(delay);
        self.tick_through(delay, observer).await;
    }

    async fn tick_through(&self, delay: Duration, observer: &dyn ProgressObserver) {
        let mut elapsed = Duration::ZERO;
        while elapsed < delay {
            let step = self.tick.min(delay - elapsed);
            tokio::time::sleep(step).await;
            elapsed += step;
            observer.wait_tick(elapsed, delay);
        }
    }
}

#![forbid(unsafe_code)]

//! Monotonic time sources.
//!
//! Event timestamps and polling deadlines read a [`Clock`]. Production hosts
//! use [`MonotonicClock`]; tests and replay harnesses advance a
//! [`DeterministicClock`] explicitly.

use std::cell::Cell;
use std::time::Duration;

/// Monotonic time since an arbitrary, fixed origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-independent clock backed by `web_time::Instant` (works on wasm32).
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: web_time::Instant,
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: web_time::Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock controlled by the host.
///
/// Interior mutability lets a shared handle be advanced while the event bus
/// holds another reference to it.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Cell<Duration>,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Cell::new(Duration::ZERO),
        }
    }

    /// Set current monotonic time. Moving backwards is ignored.
    pub fn set(&self, now: Duration) {
        if now > self.now.get() {
            self.now.set(now);
        }
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&self, dt: Duration) {
        self.now.set(self.now.get().saturating_add(dt));
    }
}

impl Clock for DeterministicClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

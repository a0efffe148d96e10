#![forbid(unsafe_code)]

//! Event bus configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default availability poll interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 40;
/// Default number of poll ticks allowed after the document has loaded.
pub const DEFAULT_POLL_RETRIES: u32 = 500;

/// Capabilities of the platform the host runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PlatformCaps {
    /// Native `focusin`/`focusout` exist and bubble. When false, focus-within
    /// subscriptions fall back to capturing `focus`/`blur`.
    pub bubbling_focus_events: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EventBusConfig {
    pub poll_interval_ms: u64,
    /// Ticks allowed once the document is loaded. Every new availability
    /// request resets the remaining budget to this value.
    pub poll_retries: u32,
    pub platform: PlatformCaps,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            poll_retries: DEFAULT_POLL_RETRIES,
            platform: PlatformCaps::default(),
        }
    }
}

impl EventBusConfig {
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Replace unusable values with defaults.
    #[must_use]
    pub fn validated(mut self) -> Self {
        if self.poll_interval_ms == 0 {
            tracing::warn!(
                field = "poll-interval-ms",
                fallback = DEFAULT_POLL_INTERVAL_MS,
                "zero poll interval rejected"
            );
            self.poll_interval_ms = DEFAULT_POLL_INTERVAL_MS;
        }
        self
    }
}

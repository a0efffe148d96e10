#![forbid(unsafe_code)]

//! Resize configuration.
//!
//! [`ResizeConfig`] is plain data with serde support so hosts can load it
//! from JSON or TOML. Keys are kebab-case and every key is optional:
//!
//! ```json
//! { "handles": "all", "proxy": true, "min-width": 50, "x-ticks": 10 }
//! ```
//!
//! Construction of an engine always goes through
//! [`ResizeConfig::validated_with`], which replaces unusable values with
//! defaults and logs a warning per replaced field.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::edge::HandleSpec;
use crate::error::ConfigError;

pub const DEFAULT_MIN_SIZE: i32 = 15;
pub const DEFAULT_MAX_SIZE: i32 = 10_000;
/// Seconds.
pub const DEFAULT_ANIMATE_DURATION: f32 = 0.5;
/// Longest accepted commit animation, in seconds.
pub const MAX_ANIMATE_DURATION: f32 = 60.0;

/// Easing curve signature: maps linear progress in `[0, 1]` to eased progress.
pub type EasingFn = fn(f32) -> f32;

/// Named easing curves for the commit animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    EaseIn,
    #[default]
    EaseOut,
    EaseInOut,
}

impl Easing {
    #[must_use]
    pub const fn curve(self) -> EasingFn {
        match self {
            Self::Linear => linear,
            Self::EaseIn => ease_in,
            Self::EaseOut => ease_out,
            Self::EaseInOut => ease_in_out,
        }
    }
}

#[must_use]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

#[must_use]
pub fn ease_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

#[must_use]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

#[must_use]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Options recognized by [`ResizeEngine`](crate::ResizeEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ResizeConfig {
    /// Wrap the element in a container that carries the handles. Forced on
    /// for elements that cannot hold children.
    pub wrap: bool,
    pub handles: HandleSpec,
    /// Initial width in pixels; the element's inline width when unset.
    pub width: Option<i32>,
    /// Initial height in pixels; the element's inline height when unset.
    pub height: Option<i32>,
    pub min_width: i32,
    pub min_height: i32,
    pub max_width: i32,
    pub max_height: i32,
    /// Page-space bounds for a positioned element's edges.
    pub min_x: Option<i32>,
    pub min_y: Option<i32>,
    pub max_x: Option<i32>,
    pub max_y: Option<i32>,
    /// Animate the commit pass (requires `proxy`).
    pub animate: bool,
    /// Seconds.
    pub animate_duration: f32,
    pub animate_easing: Easing,
    /// Resize a stand-in during the drag and commit on release.
    pub proxy: bool,
    /// Lock the aspect ratio.
    pub ratio: bool,
    /// Fade the element while the proxy is dragged (requires `proxy`).
    pub ghost: bool,
    /// Let the whole element be dragged by its body.
    pub draggable: bool,
    /// Show handles only while hovering.
    pub hover: bool,
    pub hidden_handles: bool,
    pub knob_handles: bool,
    /// Width snapping grid in pixels.
    pub x_ticks: Option<i32>,
    /// Height snapping grid in pixels.
    pub y_ticks: Option<i32>,
    /// Show the size readout while dragging.
    pub status: bool,
    /// Holding shift locks the ratio for the current move.
    pub auto_ratio: bool,
    /// Commit the final size to the element on release. When false, only
    /// the notifications carry it.
    pub set_size: bool,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            wrap: false,
            handles: HandleSpec::default(),
            width: None,
            height: None,
            min_width: DEFAULT_MIN_SIZE,
            min_height: DEFAULT_MIN_SIZE,
            max_width: DEFAULT_MAX_SIZE,
            max_height: DEFAULT_MAX_SIZE,
            min_x: None,
            min_y: None,
            max_x: None,
            max_y: None,
            animate: false,
            animate_duration: DEFAULT_ANIMATE_DURATION,
            animate_easing: Easing::default(),
            proxy: false,
            ratio: false,
            ghost: false,
            draggable: false,
            hover: false,
            hidden_handles: false,
            knob_handles: false,
            x_ticks: None,
            y_ticks: None,
            status: false,
            auto_ratio: false,
            set_size: true,
        }
    }
}

impl ResizeConfig {
    #[must_use]
    pub fn animate_duration(&self) -> Duration {
        let secs = if duration_is_usable(self.animate_duration) {
            self.animate_duration
        } else {
            DEFAULT_ANIMATE_DURATION
        };
        Duration::try_from_secs_f32(secs).unwrap_or(Duration::from_millis(500))
    }

    /// Width snapping grid, `None` when snapping is off.
    #[must_use]
    pub fn width_tick(&self) -> Option<i32> {
        self.x_ticks.filter(|t| *t > 0)
    }

    /// Height snapping grid, `None` when snapping is off.
    #[must_use]
    pub fn height_tick(&self) -> Option<i32> {
        self.y_ticks.filter(|t| *t > 0)
    }

    /// Report the first unusable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("min-width", self.min_width),
            ("min-height", self.min_height),
            ("max-width", self.max_width),
            ("max-height", self.max_height),
        ] {
            if value <= 0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if self.min_width > self.max_width {
            return Err(ConfigError::InvertedRange {
                min_field: "min-width",
                max_field: "max-width",
                min: self.min_width,
                max: self.max_width,
            });
        }
        if self.min_height > self.max_height {
            return Err(ConfigError::InvertedRange {
                min_field: "min-height",
                max_field: "max-height",
                min: self.min_height,
                max: self.max_height,
            });
        }
        for (field, value) in [
            ("width", self.width),
            ("height", self.height),
            ("x-ticks", self.x_ticks),
            ("y-ticks", self.y_ticks),
        ] {
            if let Some(value) = value
                && value <= 0
            {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if !duration_is_usable(self.animate_duration) {
            return Err(ConfigError::InvalidDuration(self.animate_duration));
        }
        if self.ghost && !self.proxy {
            return Err(ConfigError::RequiresProxy("ghost"));
        }
        if self.animate && !self.proxy {
            return Err(ConfigError::RequiresProxy("animate"));
        }
        Ok(())
    }

    /// Replace unusable values with defaults, assuming an animation driver
    /// is available.
    #[must_use]
    pub fn validated(self) -> Self {
        self.validated_with(true)
    }

    /// Replace unusable values with defaults. `animation_available` is false
    /// when no animation driver was supplied.
    #[must_use]
    pub fn validated_with(mut self, animation_available: bool) -> Self {
        if self.min_width <= 0 {
            reject("min-width", self.min_width, DEFAULT_MIN_SIZE);
            self.min_width = DEFAULT_MIN_SIZE;
        }
        if self.min_height <= 0 {
            reject("min-height", self.min_height, DEFAULT_MIN_SIZE);
            self.min_height = DEFAULT_MIN_SIZE;
        }
        if self.max_width <= 0 {
            reject("max-width", self.max_width, DEFAULT_MAX_SIZE);
            self.max_width = DEFAULT_MAX_SIZE;
        }
        if self.max_height <= 0 {
            reject("max-height", self.max_height, DEFAULT_MAX_SIZE);
            self.max_height = DEFAULT_MAX_SIZE;
        }
        if self.min_width > self.max_width {
            tracing::warn!(
                min = self.min_width,
                max = self.max_width,
                "min-width exceeds max-width, both reset"
            );
            self.min_width = DEFAULT_MIN_SIZE;
            self.max_width = DEFAULT_MAX_SIZE;
        }
        if self.min_height > self.max_height {
            tracing::warn!(
                min = self.min_height,
                max = self.max_height,
                "min-height exceeds max-height, both reset"
            );
            self.min_height = DEFAULT_MIN_SIZE;
            self.max_height = DEFAULT_MAX_SIZE;
        }
        self.width = drop_non_positive("width", self.width);
        self.height = drop_non_positive("height", self.height);
        self.x_ticks = drop_non_positive("x-ticks", self.x_ticks);
        self.y_ticks = drop_non_positive("y-ticks", self.y_ticks);
        if !duration_is_usable(self.animate_duration) {
            tracing::warn!(
                field = "animate-duration",
                value = self.animate_duration,
                fallback = DEFAULT_ANIMATE_DURATION,
                "configuration value rejected"
            );
            self.animate_duration = DEFAULT_ANIMATE_DURATION;
        }
        if self.ghost && !self.proxy {
            tracing::warn!(field = "ghost", "ghost requires a proxy, disabled");
            self.ghost = false;
        }
        if self.animate && !self.proxy {
            tracing::warn!(field = "animate", "animate requires a proxy, disabled");
            self.animate = false;
        }
        if self.animate && !animation_available {
            tracing::warn!(field = "animate", "no animation driver, animate disabled");
            self.animate = false;
        }
        self
    }
}

fn duration_is_usable(secs: f32) -> bool {
    secs.is_finite() && (0.0..=MAX_ANIMATE_DURATION).contains(&secs)
}

fn reject(field: &'static str, value: i32, fallback: i32) {
    tracing::warn!(field, value, fallback, "configuration value rejected");
}

fn drop_non_positive(field: &'static str, value: Option<i32>) -> Option<i32> {
    match value {
        Some(v) if v <= 0 => {
            tracing::warn!(field, value = v, "non-positive value ignored");
            None
        }
        other => other,
    }
}

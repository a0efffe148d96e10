#![forbid(unsafe_code)]

//! Pure geometry rules.
//!
//! Every function here is deterministic and side-effect free: the engine
//! feeds it the session-start snapshot and a pointer displacement and gets a
//! candidate [`Geometry`] back.
//!
//! # Invariants
//!
//! 1. [`snap_tick`] is idempotent and moves a value by at most half a tick.
//!    An exact half rounds down.
//! 2. [`SizeLimits::clamp_width`]/[`SizeLimits::clamp_height`] always land in
//!    `[min, max]`.
//! 3. [`edge_geometry`] holds the dimension an edge does not move and keeps
//!    the corner opposite the dragged one stationary.
//! 4. [`apply_ratio`] either preserves the reference aspect ratio (up to
//!    truncation) or, when clamping broke it, leaves `top`/`left` unset.
//!
//! # Failure Modes
//!
//! - A zero or negative reference size disables the ratio correction
//!   instead of dividing by zero.
//! - Arithmetic saturates at the `i32` range.

use serde::{Deserialize, Serialize};

use crate::config::ResizeConfig;
use crate::edge::ResizeEdge;

/// Size and page position of a resized element.
///
/// `top`/`left` are page coordinates; `None` means "leave it where it is on
/// screen".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub height: i32,
    pub width: i32,
    pub top: Option<i32>,
    pub left: Option<i32>,
}

impl Geometry {
    #[must_use]
    pub const fn new(height: i32, width: i32, top: Option<i32>, left: Option<i32>) -> Self {
        Self {
            height,
            width,
            top,
            left,
        }
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        Size {
            height: self.height,
            width: self.width,
        }
    }
}

/// Width and height only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub height: i32,
    pub width: i32,
}

/// Geometry captured when a session starts, plus the latest applied frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeometryCache {
    /// Snapshot at session start; [`reset`](crate::ResizeEngine::reset)
    /// restores it.
    pub start: Geometry,
    /// Last geometry that passed the veto and was applied.
    pub current: Geometry,
}

impl GeometryCache {
    #[must_use]
    pub const fn capture(start: Geometry) -> Self {
        Self {
            start,
            current: start,
        }
    }
}

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Size bounds and snapping grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeLimits {
    pub min_width: i32,
    pub max_width: i32,
    pub min_height: i32,
    pub max_height: i32,
    pub width_tick: Option<i32>,
    pub height_tick: Option<i32>,
}

impl SizeLimits {
    #[must_use]
    pub fn from_config(config: &ResizeConfig) -> Self {
        Self {
            min_width: config.min_width,
            max_width: config.max_width,
            min_height: config.min_height,
            max_height: config.max_height,
            width_tick: config.width_tick(),
            height_tick: config.height_tick(),
        }
    }

    #[must_use]
    pub fn clamp_width(&self, width: i32) -> i32 {
        width.max(self.min_width).min(self.max_width)
    }

    #[must_use]
    pub fn clamp_height(&self, height: i32) -> i32 {
        height.max(self.min_height).min(self.max_height)
    }
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self::from_config(&ResizeConfig::default())
    }
}

/// Page-space bounds for a positioned element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PositionBounds {
    pub min_x: Option<i32>,
    pub max_x: Option<i32>,
    pub min_y: Option<i32>,
    pub max_y: Option<i32>,
}

impl PositionBounds {
    #[must_use]
    pub const fn from_config(config: &ResizeConfig) -> Self {
        Self {
            min_x: config.min_x,
            max_x: config.max_x,
            min_y: config.min_y,
            max_y: config.max_y,
        }
    }

    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.min_x.is_none() && self.max_x.is_none() && self.min_y.is_none() && self.max_y.is_none()
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Round `value` to the nearest multiple of `tick`. Exact halves round down;
/// no tick (or a non-positive one) leaves the value alone.
#[must_use]
pub fn snap_tick(value: i32, tick: Option<i32>) -> i32 {
    let Some(tick) = tick.filter(|t| *t > 0) else {
        return value;
    };
    let rem = value.rem_euclid(tick);
    if rem == 0 {
        value
    } else if i64::from(rem) * 2 > i64::from(tick) {
        value.saturating_add(tick - rem)
    } else {
        value.saturating_sub(rem)
    }
}

/// Candidate geometry for dragging `edge` by `delta` from the session start.
///
/// The moving dimension is the start size plus the snapped displacement,
/// with the sign flipped for top/left edges, then clamped. Dimensions the
/// edge does not move keep their start value. A moving top or left edge
/// gets an explicit position that keeps the opposite edge in place; other
/// positions stay unset.
#[must_use]
pub fn edge_geometry(
    edge: ResizeEdge,
    start: &Geometry,
    delta: (i32, i32),
    limits: &SizeLimits,
) -> Geometry {
    let (dx, dy) = delta;
    let width = if edge.moves_width() {
        let dx = if edge.flips_x() { dx.saturating_neg() } else { dx };
        limits.clamp_width(start.width.saturating_add(snap_tick(dx, limits.width_tick)))
    } else {
        start.width
    };
    let height = if edge.moves_height() {
        let dy = if edge.flips_y() { dy.saturating_neg() } else { dy };
        limits.clamp_height(start.height.saturating_add(snap_tick(dy, limits.height_tick)))
    } else {
        start.height
    };
    let top = if edge.flips_y() {
        start
            .top
            .map(|t| t.saturating_add(start.height).saturating_sub(height))
    } else {
        None
    };
    let left = if edge.flips_x() {
        start
            .left
            .map(|l| l.saturating_add(start.width).saturating_sub(width))
    } else {
        None
    };
    let geometry = Geometry::new(height, width, top, left);
    tracing::trace!(edge = %edge, dx, dy, ?geometry, "edge rule");
    geometry
}

/// Re-derive the candidate so it keeps the `reference` aspect ratio.
///
/// Each edge has its own formula for the complementary dimension and for
/// where the element is re-anchored. Arithmetic runs in `f64` and truncates.
/// If clamping the ratio-corrected size changes it, both offsets are reset
/// to unset.
#[must_use]
pub fn apply_ratio(
    edge: ResizeEdge,
    candidate: Geometry,
    reference: Size,
    start: &Geometry,
    limits: &SizeLimits,
) -> Geometry {
    if reference.height <= 0 || reference.width <= 0 {
        tracing::trace!(?reference, "degenerate reference size, ratio skipped");
        return candidate;
    }
    let nh = f64::from(reference.height);
    let nw = f64::from(reference.width);
    let min_h = f64::from(limits.min_height);
    let max_h = f64::from(limits.max_height);
    let st = f64::from(start.top.unwrap_or(0));
    let sl = f64::from(start.left.unwrap_or(0));

    let mut h = f64::from(candidate.height);
    let mut w = f64::from(candidate.width);
    let mut t = candidate.top.map(f64::from);
    let mut l = candidate.left.map(f64::from);

    match edge {
        ResizeEdge::Left | ResizeEdge::Right => {
            h = (nh * (w / nw)).max(min_h).min(max_h);
            w = nw * (h / nh);
            t = Some(st + (nh - h) / 2.0);
            if edge == ResizeEdge::Left {
                l = Some(sl + (nw - w));
            }
        }
        ResizeEdge::Top | ResizeEdge::Bottom => {
            w = nw * (h / nh);
            h = nh * (w / nw);
            l = Some(sl + (nw - w) / 2.0);
            if edge == ResizeEdge::Top {
                t = Some(st + (nh - h));
            }
        }
        ResizeEdge::BottomLeft => {
            h = nh * (w / nw);
            w = nw * (h / nh);
            l = Some(sl + (nw - w));
        }
        ResizeEdge::BottomRight => {
            h = nh * (w / nw);
            w = nw * (h / nh);
        }
        ResizeEdge::TopLeft => {
            h = nh * (w / nw);
            w = nw * (h / nh);
            l = Some(sl + (nw - w));
            t = Some(st + (nh - h));
        }
        ResizeEdge::TopRight => {
            h = nh * (w / nw);
            w = nw * (h / nh);
            l = Some(sl);
            t = Some(st + (nh - h));
        }
    }

    let clamped_h = h.max(min_h).min(max_h);
    let clamped_w = w
        .max(f64::from(limits.min_width))
        .min(f64::from(limits.max_width));
    if (clamped_h - h).abs() > f64::EPSILON || (clamped_w - w).abs() > f64::EPSILON {
        t = None;
        l = None;
    }
    let geometry = Geometry::new(
        trunc_to_i32(clamped_h),
        trunc_to_i32(clamped_w),
        t.map(trunc_to_i32),
        l.map(trunc_to_i32),
    );
    tracing::trace!(edge = %edge, ?geometry, "ratio applied");
    geometry
}

/// Keep a positioned element's edges inside the configured page bounds.
/// Unset offsets are left alone.
#[must_use]
pub fn clamp_position(geometry: Geometry, bounds: &PositionBounds) -> Geometry {
    let mut out = geometry;
    if let Some(mut top) = out.top {
        if let Some(min_y) = bounds.min_y
            && top < min_y
        {
            top = min_y;
        }
        if let Some(max_y) = bounds.max_y
            && top.saturating_add(out.height) > max_y
        {
            top = max_y.saturating_sub(out.height);
        }
        out.top = Some(top);
    }
    if let Some(mut left) = out.left {
        if let Some(min_x) = bounds.min_x
            && left < min_x
        {
            left = min_x;
        }
        if let Some(max_x) = bounds.max_x
            && left.saturating_add(out.width) > max_x
        {
            left = max_x.saturating_sub(out.width);
        }
        out.left = Some(left);
    }
    out
}

fn trunc_to_i32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    if value >= f64::from(i32::MAX) {
        return i32::MAX;
    }
    if value <= f64::from(i32::MIN) {
        return i32::MIN;
    }
    value.trunc() as i32
}

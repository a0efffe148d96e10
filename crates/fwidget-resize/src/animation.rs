#![forbid(unsafe_code)]

//! Animation capability for the commit pass.
//!
//! The engine asks an [`AnimationDriver`] to tween height/width/top/left of
//! one node and applies the frames it gets back from
//! [`AnimationDriver::tick`]. [`TweenDriver`] is the built-in driver.
//!
//! # Invariants
//!
//! 1. Every started animation yields exactly one frame with
//!    `complete == true`, after which it is dropped.
//! 2. Frame values only cover properties present in the request's `to`.
//! 3. A completed frame carries the exact `to` values.
//!
//! # Failure Modes
//!
//! - Zero duration: completes on the first tick.
//! - A property with no `from` value jumps straight to its target.

use std::time::Duration;

use fwidget_dom::NodeId;
use serde::{Deserialize, Serialize};

use crate::config::EasingFn;

/// Handle for one running animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnimationId(u64);

impl AnimationId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Animated style properties in pixels. `top`/`left` are page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TweenValues {
    pub height: Option<i32>,
    pub width: Option<i32>,
    pub top: Option<i32>,
    pub left: Option<i32>,
}

/// What to animate.
#[derive(Debug, Clone, Copy)]
pub struct AnimationRequest {
    pub node: NodeId,
    pub from: TweenValues,
    pub to: TweenValues,
    pub duration: Duration,
    pub easing: EasingFn,
}

/// Values to apply after one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationFrame {
    pub id: AnimationId,
    pub node: NodeId,
    pub values: TweenValues,
    pub complete: bool,
}

/// Per-frame animation capability.
pub trait AnimationDriver {
    fn start(&mut self, request: AnimationRequest) -> AnimationId;

    /// Advance every running animation by `dt`.
    fn tick(&mut self, dt: Duration) -> Vec<AnimationFrame>;

    /// Stop an animation without a completion frame.
    fn cancel(&mut self, id: AnimationId) -> bool;

    fn active_count(&self) -> usize;
}

#[derive(Debug, Clone, Copy)]
struct Tween {
    id: AnimationId,
    request: AnimationRequest,
    elapsed: Duration,
}

impl Tween {
    fn sample(&self) -> (TweenValues, bool) {
        let complete = self.elapsed >= self.request.duration;
        if complete {
            return (self.request.to, true);
        }
        let linear = self.elapsed.as_secs_f32() / self.request.duration.as_secs_f32();
        let eased = (self.request.easing)(linear);
        let lerp = |from: Option<i32>, to: Option<i32>| {
            to.map(|to| {
                let from = from.unwrap_or(to);
                let value = f64::from(from) + (f64::from(to) - f64::from(from)) * f64::from(eased);
                value.round() as i32
            })
        };
        let from = self.request.from;
        let to = self.request.to;
        (
            TweenValues {
                height: lerp(from.height, to.height),
                width: lerp(from.width, to.width),
                top: lerp(from.top, to.top),
                left: lerp(from.left, to.left),
            },
            false,
        )
    }
}

/// Built-in driver that interpolates linearly in eased time.
#[derive(Debug, Default)]
pub struct TweenDriver {
    tweens: Vec<Tween>,
    next_id: u64,
}

impl TweenDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnimationDriver for TweenDriver {
    fn start(&mut self, request: AnimationRequest) -> AnimationId {
        self.next_id = self.next_id.saturating_add(1);
        let id = AnimationId(self.next_id);
        tracing::debug!(
            animation = id.get(),
            node = %request.node,
            duration_ms = u64::try_from(request.duration.as_millis()).unwrap_or(u64::MAX),
            "tween started"
        );
        self.tweens.push(Tween {
            id,
            request,
            elapsed: Duration::ZERO,
        });
        id
    }

    fn tick(&mut self, dt: Duration) -> Vec<AnimationFrame> {
        let mut frames = Vec::with_capacity(self.tweens.len());
        for tween in &mut self.tweens {
            tween.elapsed = tween.elapsed.saturating_add(dt);
            let (values, complete) = tween.sample();
            frames.push(AnimationFrame {
                id: tween.id,
                node: tween.request.node,
                values,
                complete,
            });
        }
        self.tweens.retain(|t| t.elapsed < t.request.duration);
        frames
    }

    fn cancel(&mut self, id: AnimationId) -> bool {
        let before = self.tweens.len();
        self.tweens.retain(|t| t.id != id);
        before != self.tweens.len()
    }

    fn active_count(&self) -> usize {
        self.tweens.len()
    }
}

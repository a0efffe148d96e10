#![forbid(unsafe_code)]

//! Handle-driven element resizing for FrankenWidget.
//!
//! # Role in FrankenWidget
//! `fwidget-resize` turns any element of a [`Document`](fwidget_dom::Document)
//! into a resizable box: it creates edge and corner handles, tracks the
//! pointer while a handle is dragged, and writes the new size (and, for
//! top/left edges, the new position) back into inline style.
//!
//! # Primary responsibilities
//! - **Setup**: optional wrapper for elements that cannot hold children,
//!   handle nodes, proxy stand-in and status readout.
//! - **Geometry**: per-edge rules, tick snapping, size and position clamping,
//!   aspect-ratio locking (also shift-activated).
//! - **Lifecycle**: one session at a time, before-resize veto, start/resize/
//!   end notifications, proxy commit (optionally animated), reset, teardown.
//! - **Extras**: whole-element drag, hover-only handles, an id-keyed registry.
//!
//! # How it fits in the system
//! A [`ResizeEngine`] is a pure state machine over pointer input; the host
//! can drive it directly. [`ResizeBinding`] subscribes it to an
//! [`EventBus`](fwidget_events::EventBus) so that dispatched mouse events
//! reach it. Animations advance only when the host calls
//! [`ResizeEngine::advance_animations`].

pub mod animation;
pub mod binding;
pub mod config;
pub mod css;
pub mod drag;
pub mod edge;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod outcome;
pub mod proxy;
pub mod registry;
pub mod status;

pub use animation::{AnimationDriver, AnimationFrame, AnimationId, AnimationRequest, TweenDriver, TweenValues};
pub use binding::ResizeBinding;
pub use config::{Easing, EasingFn, ResizeConfig};
pub use drag::{DragController, DragEffect, DragInput, DragNoopReason, DragState, ThresholdDrag};
pub use edge::{HandleSpec, ResizeEdge};
pub use engine::{DragRole, ResizeEngine};
pub use error::{ConfigError, ResizeError};
pub use geometry::{Geometry, GeometryCache, PositionBounds, Size, SizeLimits};
pub use outcome::{
    BeforeResizeVerdict, ResizeDispatch, ResizeEffect, ResizeEvent, ResizeNoopReason, ResizeState,
};
pub use registry::{ResizeRegistry, SharedEngine};
pub use status::StatusReadout;

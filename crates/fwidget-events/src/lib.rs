#![forbid(unsafe_code)]

//! Event subscription and dispatch for FrankenWidget.
//!
//! # Role in FrankenWidget
//! `fwidget-events` is the layer every widget talks to for input. It owns the
//! listener registry for one [`Document`](fwidget_dom::Document), turns host
//! input into normalized [`DomEvent`]s and routes them through capture,
//! target and bubble phases.
//!
//! # Primary responsibilities
//! - **Subscription**: keyed registry, one record per element, type and
//!   callback; collections and element ids as targets.
//! - **Deferred binding**: ids that do not exist yet are polled for, with a
//!   bounded retry budget once the document has loaded.
//! - **Normalization**: text-node targets, page coordinates, related targets,
//!   legacy key codes, idempotent timestamps.
//! - **Teardown**: unload listeners run in order, then everything is removed.
//!
//! # How it fits in the system
//! The host calls [`EventBus::dispatch`] for input, [`EventBus::pump`] from
//! its timer, and [`EventBus::dom_ready`] / [`EventBus::document_loaded`] /
//! [`EventBus::unload`] on page lifecycle changes. `fwidget-resize` binds
//! its handles through this bus.

pub mod availability;
pub mod bus;
pub mod config;
pub mod error;
pub mod listener;
pub mod normalize;
mod registry;
pub mod target;

pub use availability::{Available, AvailabilityHandle, AvailabilityState};
pub use bus::{DispatchOutcome, EventBus, SubscribeOptions};
pub use config::{EventBusConfig, PlatformCaps};
pub use error::EventBusError;
pub use listener::{
    CallbackId, ContextOverride, ExecutionContext, Invocation, Listener, ListenerDescriptor,
    Payload, Phase,
};
pub use normalize::DomEvent;
pub use target::Target;

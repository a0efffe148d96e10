#![forbid(unsafe_code)]

//! Class names applied by the engine.

use crate::edge::ResizeEdge;

/// Base class on the node carrying the handles.
pub const RESIZE: &str = "fw-resize";
pub const DRAGGABLE: &str = "fw-draggable";
pub const HOVER: &str = "fw-resize-hover";
pub const PROXY: &str = "fw-resize-proxy";
pub const WRAP: &str = "fw-resize-wrap";
pub const KNOB: &str = "fw-resize-knob";
pub const HIDDEN: &str = "fw-resize-hidden";
pub const HANDLE: &str = "fw-resize-handle";
pub const HANDLE_ACTIVE: &str = "fw-resize-handle-active";
pub const STATUS: &str = "fw-resize-status";
pub const GHOST: &str = "fw-resize-ghost";
pub const RESIZING: &str = "fw-resize-resizing";

/// `fw-resize-handle-<edge>`
#[must_use]
pub fn handle(edge: ResizeEdge) -> String {
    format!("{HANDLE}-{edge}")
}

/// `fw-resize-handle-<edge>-active`
#[must_use]
pub fn handle_active(edge: ResizeEdge) -> String {
    format!("{HANDLE}-{edge}-active")
}

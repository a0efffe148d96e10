#![forbid(unsafe_code)]

//! Resize errors.

use fwidget_dom::{DomError, NodeId};
use fwidget_events::EventBusError;
use thiserror::Error;

/// Engine construction failure.
///
/// Interactive operations never fail; they report ignored input through
/// [`ResizeNoopReason`](crate::ResizeNoopReason) instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResizeError {
    #[error("element {0} does not exist")]
    ElementNotFound(NodeId),
    #[error("element {0} has no parent to wrap it in")]
    NoParentForWrap(NodeId),
    #[error(transparent)]
    Dom(#[from] DomError),
    /// Binding the handles to the event bus failed.
    #[error("event binding failed: {0}")]
    Bind(#[from] EventBusError),
}

/// A configuration value that cannot be used.
///
/// [`ResizeConfig::validated`](crate::ResizeConfig::validated) logs these and
/// falls back to defaults; they only surface from explicit validation and
/// handle-list parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown handle edge {0:?} (expected t, b, l, r, tl, tr, bl, br or all)")]
    UnknownEdge(String),
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: i32 },
    #[error("{min_field} ({min}) exceeds {max_field} ({max})")]
    InvertedRange {
        min_field: &'static str,
        max_field: &'static str,
        min: i32,
        max: i32,
    },
    #[error("{0} requires a proxy")]
    RequiresProxy(&'static str),
    #[error("animate-duration must be finite and non-negative (got {0})")]
    InvalidDuration(f32),
}

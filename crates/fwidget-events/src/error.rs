#![forbid(unsafe_code)]

//! Event bus failures.
//!
//! Public bus operations report success as `bool`; the reason behind the most
//! recent `false` is kept in the bus's last-error slot as one of these.

use fwidget_dom::{DomError, NodeId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventBusError {
    /// A raw attach/detach on the document failed.
    #[error("native listener operation failed")]
    Dom(#[from] DomError),
    #[error("element id `{0}` is not in the document")]
    UnknownId(String),
    #[error("a `{event_type}` listener with this callback is already registered on {node}")]
    DuplicateListener { node: NodeId, event_type: String },
    #[error("the bus has been torn down by unload")]
    Unloaded,
}

#![forbid(unsafe_code)]

//! Document mutation errors.

use thiserror::Error;

use crate::node::NodeId;

/// Failure of a raw document operation.
///
/// These mirror the exceptions a browser raises from `appendChild`,
/// `addEventListener` and friends. Callers in the event layer catch them and
/// report a boolean failure instead of propagating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("node {0} does not exist (never created or already destroyed)")]
    NodeNotFound(NodeId),
    #[error("node {child} cannot be inserted into {parent}: {reason}")]
    HierarchyRequest {
        parent: NodeId,
        child: NodeId,
        reason: &'static str,
    },
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("native listener {0} is not registered")]
    UnknownNativeListener(u64),
}

#![forbid(unsafe_code)]

//! Subscription targets.

use fwidget_dom::NodeId;

/// What a subscription or removal applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Node(NodeId),
    /// Element id; subscriptions to an id not yet in the document are
    /// deferred until it appears.
    Id(String),
    Nodes(Vec<NodeId>),
    Ids(Vec<String>),
}

impl Target {
    /// Split a collection into single targets; single targets yield themselves.
    #[must_use]
    pub fn into_singles(self) -> Vec<Self> {
        match self {
            Self::Nodes(nodes) => nodes.into_iter().map(Self::Node).collect(),
            Self::Ids(ids) => ids.into_iter().map(Self::Id).collect(),
            single => vec![single],
        }
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::Nodes(_) | Self::Ids(_))
    }
}

impl From<NodeId> for Target {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

impl From<&str> for Target {
    fn from(id: &str) -> Self {
        Self::Id(id.to_owned())
    }
}

impl From<String> for Target {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<Vec<NodeId>> for Target {
    fn from(nodes: Vec<NodeId>) -> Self {
        Self::Nodes(nodes)
    }
}

impl From<&[NodeId]> for Target {
    fn from(nodes: &[NodeId]) -> Self {
        Self::Nodes(nodes.to_vec())
    }
}

impl From<&[&str]> for Target {
    fn from(ids: &[&str]) -> Self {
        Self::Ids(ids.iter().map(|id| (*id).to_owned()).collect())
    }
}

impl From<Vec<String>> for Target {
    fn from(ids: Vec<String>) -> Self {
        Self::Ids(ids)
    }
}

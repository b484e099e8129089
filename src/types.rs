//! Core types for the OpenMeta metadata store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a node inside a [`MetaTree`](crate::tree::MetaTree) arena.
///
/// Handles are only meaningful for the tree that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The closed set of node shapes a path can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A folder whose metadata lives in its reserved metadata directory
    Container,
    /// An extension-suffixed directory grouping values
    Channel,
    /// A leaf file holding one decoded payload
    Value,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Container => "container",
            NodeKind::Channel => "channel",
            NodeKind::Value => "value",
        }
    }

    /// Containers and Channels own children; Values never do.
    pub fn is_parent(&self) -> bool {
        !matches!(self, NodeKind::Value)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

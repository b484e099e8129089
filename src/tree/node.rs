//! Node representation inside the tree arena

use crate::types::{NodeId, NodeKind};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Kind-specific node state
#[derive(Debug, Clone)]
pub enum NodeBody {
    Container {
        children: Vec<NodeId>,
    },
    Channel {
        children: Vec<NodeId>,
        /// Data set in memory but not yet written
        staged: Option<Map<String, Value>>,
    },
    Value {
        payload: Value,
    },
}

impl NodeBody {
    pub fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Container => NodeBody::Container {
                children: Vec::new(),
            },
            NodeKind::Channel => NodeBody::Channel {
                children: Vec::new(),
                staged: None,
            },
            NodeKind::Value => NodeBody::Value {
                payload: Value::Null,
            },
        }
    }
}

/// One node: a path segment, an optional parent link and its body.
///
/// The segment is relative whenever a parent is set; only unattached nodes
/// carry absolute segments.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) segment: PathBuf,
    pub(crate) parent: Option<NodeId>,
    pub(crate) body: NodeBody,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, segment: PathBuf) -> Self {
        Self {
            segment,
            parent: None,
            body: NodeBody::empty(kind),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::Container { .. } => NodeKind::Container,
            NodeBody::Channel { .. } => NodeKind::Channel,
            NodeBody::Value { .. } => NodeKind::Value,
        }
    }

    pub fn segment(&self) -> &Path {
        &self.segment
    }

    /// Attached parent, if any
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn body(&self) -> &NodeBody {
        &self.body
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.body {
            NodeBody::Container { children } | NodeBody::Channel { children, .. } => children,
            NodeBody::Value { .. } => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match &mut self.body {
            NodeBody::Container { children } | NodeBody::Channel { children, .. } => {
                Some(children)
            }
            NodeBody::Value { .. } => None,
        }
    }
}

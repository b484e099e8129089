//! Cascading key/value resolution
//!
//! Starting at a Container, same-named `.kvs` channels are gathered while
//! ascending through enclosing Containers, then merged from the outermost
//! down so nearer channels override farther ones. A channel whose data sets
//! the root marker to `true` stops the ascent.

use crate::codec::CHANNEL_KVS;
use crate::error::MetaError;
use crate::tree::{path, MetaTree};
use crate::types::{NodeId, NodeKind};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

/// Recursively merge `incoming` into `target`.
///
/// Nested mappings merge key by key; anything else is overwritten.
pub fn deep_merge(target: &mut Map<String, Value>, incoming: &Map<String, Value>) {
    for (key, value) in incoming {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(nested)) => deep_merge(existing, nested),
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Matching channels from the outermost contributor down to `start`'s own
#[instrument(skip(tree, start), fields(folder = %tree.path(start).display()))]
pub fn lineage(tree: &mut MetaTree, start: NodeId, channel: &str) -> Result<Vec<NodeId>, MetaError> {
    let Some(mut container) = tree.container_of(start)? else {
        return Ok(Vec::new());
    };
    let root_marker = tree.layout().root_marker.clone();
    let mut found = Vec::new();

    loop {
        let mut level = None;
        for child in tree.children(container)? {
            if is_cascade_channel(tree, child, channel) {
                level = Some(child);
            }
        }
        if let Some(level) = level {
            found.push(level);
            let data = tree.read(level).data(level);
            if data.get(&root_marker) == Some(&Value::Bool(true)) {
                debug!(path = %tree.path(level).display(), "Reached cascade root");
                break;
            }
        }

        match tree.parent_container(container) {
            Ok(Some(parent)) => container = parent,
            Ok(None) => break,
            Err(e) => {
                debug!(error = %e, "Stopping cascade ascent");
                break;
            }
        }
    }

    found.reverse();
    Ok(found)
}

fn is_cascade_channel(tree: &MetaTree, id: NodeId, channel: &str) -> bool {
    tree.kind(id) == NodeKind::Channel
        && tree
            .extension(id)
            .map(|ext| ext.eq_ignore_ascii_case(CHANNEL_KVS))
            .unwrap_or(false)
        && path::names_match(&tree.name(id), channel)
}

/// Merged data of every `<channel>.kvs` from `start` upward
pub fn cascade(tree: &mut MetaTree, start: NodeId, channel: &str) -> Result<Map<String, Value>, MetaError> {
    let mut merged = Map::new();
    for id in lineage(tree, start, channel)? {
        if let Value::Object(data) = tree.read(id).data(id) {
            deep_merge(&mut merged, &data);
        }
    }
    Ok(merged)
}

impl MetaTree {
    /// See [`cascade`]
    pub fn cascade(&mut self, start: NodeId, channel: &str) -> Result<Map<String, Value>, MetaError> {
        cascade(self, start, channel)
    }
}

//! Reading and writing node payloads

use super::node::NodeBody;
use super::MetaTree;
use crate::codec::value_extension;
use crate::error::{CodecError, MetaError};
use crate::types::{NodeId, NodeKind};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Payloads that carry no information and are left out of a channel's data
pub fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

impl MetaTree {
    /// Payload of a Value node
    pub fn payload(&self, id: NodeId) -> Option<&Value> {
        match self.node(id).body() {
            NodeBody::Value { payload } => Some(payload),
            _ => None,
        }
    }

    pub fn set_payload(&mut self, id: NodeId, value: Value) -> Result<(), MetaError> {
        let path = self.path(id);
        match &mut self.node_mut(id).body {
            NodeBody::Value { payload } => {
                *payload = value;
                Ok(())
            }
            other => Err(MetaError::WrongKind {
                path,
                expected: NodeKind::Value,
                actual: match other {
                    NodeBody::Container { .. } => NodeKind::Container,
                    _ => NodeKind::Channel,
                },
            }),
        }
    }

    /// Stage a key/value mapping on a Channel; `write` replaces the
    /// channel's on-disk values with it
    pub fn set_data(&mut self, id: NodeId, data: Map<String, Value>) -> Result<(), MetaError> {
        if self.kind(id) != NodeKind::Channel {
            return Err(MetaError::WrongKind {
                path: self.path(id),
                expected: NodeKind::Channel,
                actual: self.kind(id),
            });
        }
        self.staged_value_extension(id)?;
        for key in data.keys() {
            validate_key(key)?;
        }
        if let NodeBody::Channel { staged, .. } = &mut self.node_mut(id).body {
            *staged = Some(data);
        }
        Ok(())
    }

    /// Staged data of a Channel, if any
    pub fn staged(&self, id: NodeId) -> Option<&Map<String, Value>> {
        match self.node(id).body() {
            NodeBody::Channel { staged, .. } => staged.as_ref(),
            _ => None,
        }
    }

    fn staged_value_extension(&self, id: NodeId) -> Result<&'static str, MetaError> {
        let extension = self.extension(id).unwrap_or_default();
        value_extension(&extension).ok_or_else(|| {
            MetaError::Codec(CodecError::Unsupported {
                format: "channel",
                message: format!("{} channels cannot hold staged data", extension),
            })
        })
    }

    /// Load payloads from disk, recursively for Containers and Channels.
    ///
    /// Reading never fails: a Value that cannot be read degrades to its
    /// codec's default payload and the problem is logged.
    pub fn read(&mut self, id: NodeId) -> &mut Self {
        let diagnostics = self.diagnostics.clone();
        diagnostics.in_scope(|| self.read_node(id));
        self
    }

    fn read_node(&mut self, id: NodeId) {
        if self.kind(id) == NodeKind::Value {
            let payload = self.load_payload(id);
            if let NodeBody::Value { payload: slot } = &mut self.node_mut(id).body {
                *slot = payload;
            }
            return;
        }

        if let NodeBody::Channel { staged, .. } = &mut self.node_mut(id).body {
            *staged = None;
        }
        match self.visible_children(id) {
            Ok(children) => {
                for child in children {
                    self.read_node(child);
                }
            }
            Err(e) => error!(path = %self.path(id).display(), error = %e, "Failed to list children"),
        }
    }

    fn load_payload(&self, id: NodeId) -> Value {
        let path = self.path(id);
        let extension = self.extension(id).unwrap_or_default();
        let Some(codec) = self.codecs.get(&extension) else {
            error!(path = %path.display(), extension = %extension, "No codec for value");
            return Value::Null;
        };
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read value");
                return codec.default_value();
            }
        };
        match codec.decode(&raw) {
            Ok(value) => value,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Could not decode value");
                codec.default_value()
            }
        }
    }

    /// Payload view of a node.
    ///
    /// A Value yields its payload. A Channel yields its staged data or a
    /// mapping of child name to child data, leaving out empty payloads. A
    /// Container yields a mapping of channel name to channel data. Only
    /// attached children contribute; call [`read`](Self::read) first to
    /// pick up what is on disk.
    pub fn data(&self, id: NodeId) -> Value {
        match self.node(id).body() {
            NodeBody::Value { payload } => payload.clone(),
            NodeBody::Channel {
                staged: Some(staged),
                ..
            } => Value::Object(staged.clone()),
            NodeBody::Channel { children, .. } | NodeBody::Container { children } => {
                let mut out = Map::new();
                for child in children {
                    if self.is_hidden(*child) {
                        continue;
                    }
                    let data = self.data(*child);
                    if !is_empty_payload(&data) {
                        out.insert(self.name(*child), data);
                    }
                }
                Value::Object(out)
            }
        }
    }

    /// Persist a node.
    ///
    /// Values are encoded before anything touches the disk. A Channel with
    /// staged data is cleared and rewritten from it; otherwise its attached
    /// children are written. A Container creates its metadata directory and
    /// writes its attached channels.
    pub fn write(&mut self, id: NodeId) -> Result<(), MetaError> {
        let diagnostics = self.diagnostics.clone();
        diagnostics.in_scope(|| match self.kind(id) {
            NodeKind::Value => self.write_value(id),
            NodeKind::Channel => self.write_channel(id),
            NodeKind::Container => self.write_container(id),
        })
    }

    fn write_value(&mut self, id: NodeId) -> Result<(), MetaError> {
        if self.node(id).parent().is_none() {
            return Err(MetaError::NoParent(self.path(id)));
        }
        let path = self.rooted_storage(id)?;
        let extension = self
            .extension(id)
            .ok_or_else(|| MetaError::InvalidName(self.basename(id)))?;
        let payload = self.payload(id).cloned().unwrap_or(Value::Null);

        let raw = self.codecs.encode(&extension, &payload).map_err(|e| {
            error!(path = %path.display(), error = %e, "Refusing to write value");
            e
        })?;
        self.write_raw(&path, &raw)?;
        self.hide_metadata(id);
        Ok(())
    }

    /// Write `raw` through a temporary sibling and rename it into place.
    ///
    /// The temporary name is dot-prefixed, so enumeration never picks up a
    /// half-written value.
    fn write_raw(&self, path: &Path, raw: &[u8]) -> Result<(), MetaError> {
        let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
            return Err(MetaError::InvalidName(path.display().to_string()));
        };
        self.lifecycle.create_dir(dir)?;

        let temp_path = dir.join(format!(".{}.tmp", name.to_string_lossy()));
        fs::write(&temp_path, raw)?;
        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        info!(path = %path.display(), bytes = raw.len(), "Wrote value");
        Ok(())
    }

    fn write_channel(&mut self, id: NodeId) -> Result<(), MetaError> {
        if self.node(id).parent().is_none() {
            return Err(MetaError::NoParent(self.path(id)));
        }
        let dir = self.rooted_storage(id)?;

        let Some(staged) = self.staged(id).cloned() else {
            self.lifecycle.create_dir(&dir)?;
            return self.write_attached(id);
        };

        let file_extension = self.staged_value_extension(id)?;
        let mut encoded = Vec::with_capacity(staged.len());
        for (key, value) in staged {
            let basename = format!("{}{}", key, file_extension);
            let raw = self.codecs.encode(file_extension, &value).map_err(|e| {
                error!(channel = %dir.display(), key = %key, error = %e, "Refusing to write channel");
                e
            })?;
            encoded.push((basename, value, raw));
        }

        if self.storage_exists(id) {
            self.clear(id)?;
        }
        self.lifecycle.create_dir(&dir)?;
        for (basename, value, raw) in encoded {
            let child = self.create(NodeKind::Value, &basename)?;
            self.set_payload(child, value)?;
            self.attach(child, id)?;
            self.write_raw(&dir.join(&basename), &raw)?;
        }
        if let NodeBody::Channel { staged, .. } = &mut self.node_mut(id).body {
            *staged = None;
        }
        self.hide_metadata(id);
        Ok(())
    }

    fn write_container(&mut self, id: NodeId) -> Result<(), MetaError> {
        let dir = self.rooted_storage(id)?;
        self.lifecycle.create_dir(&dir)?;
        self.write_attached(id)?;
        self.hide_metadata(id);
        Ok(())
    }

    /// Write attached children that carry something to write
    fn write_attached(&mut self, id: NodeId) -> Result<(), MetaError> {
        let children: Vec<NodeId> = self.node(id).children().to_vec();
        for child in children {
            if self.payload(child).map(Value::is_null).unwrap_or(false) {
                debug!(path = %self.path(child).display(), "Skipping value without payload");
                continue;
            }
            match self.write(child) {
                Ok(()) => {}
                Err(e) => {
                    error!(path = %self.path(child).display(), error = %e, "Failed to write child");
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Mark the nearest Container's metadata directory hidden, best effort
    fn hide_metadata(&mut self, id: NodeId) {
        let dir = match self.container_of(id) {
            Ok(Some(container)) => self.storage_path(container),
            Ok(None) => return,
            Err(e) => {
                debug!(error = %e, "No container to hide");
                return;
            }
        };
        if let Err(e) = hide_dir(&dir) {
            warn!(path = %dir.display(), error = %e, "Could not hide metadata directory");
        }
    }
}

fn validate_key(key: &str) -> Result<(), MetaError> {
    let invalid = key.is_empty() || key.starts_with('.') || key.contains('/') || key.contains('\\');
    if invalid {
        return Err(MetaError::InvalidName(key.to_string()));
    }
    Ok(())
}

#[cfg(windows)]
fn hide_dir(dir: &Path) -> std::io::Result<()> {
    let status = std::process::Command::new("attrib")
        .arg("+H")
        .arg(dir)
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("attrib exited with {}", status)))
    }
}

#[cfg(not(windows))]
fn hide_dir(dir: &Path) -> std::io::Result<()> {
    debug!(path = %dir.display(), "Metadata directory hidden by name");
    Ok(())
}

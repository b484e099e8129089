//! Metadata tree
//!
//! Folders and files are reinterpreted, purely by naming convention, as a
//! tree of Containers, Channels and Values. Nodes live in an arena owned by
//! [`MetaTree`]; every node stores only its own path segment and a parent
//! handle, so a node's path is always derived by walking parent links.
//!
//! A Container's logical path is the folder itself, while its storage path is
//! the reserved metadata directory inside it. Channels and Values store
//! directly at their logical path.

pub mod children;
pub mod classify;
pub mod data;
pub mod layout;
pub mod node;
pub mod path;

use crate::codec::CodecRegistry;
use crate::config::OpenMetaConfig;
use crate::error::MetaError;
use crate::lifecycle::{Lifecycle, LifecycleConfig, TrashEntry};
use crate::logging::Diagnostics;
use crate::reference::Reference;
use crate::types::{NodeId, NodeKind};
use classify::Classifier;
use layout::LayoutConfig;
use node::Node;
use path::Address;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Arena of metadata nodes plus the collaborators that interpret them
#[derive(Debug)]
pub struct MetaTree {
    nodes: Vec<Node>,
    /// Canonical on-disk path -> node materialized for it
    index: HashMap<PathBuf, NodeId>,
    classifier: Classifier,
    codecs: CodecRegistry,
    lifecycle: Lifecycle,
    diagnostics: Diagnostics,
}

impl Default for MetaTree {
    fn default() -> Self {
        Self::with_parts(
            LayoutConfig::default(),
            LifecycleConfig::default(),
            Diagnostics::current(),
        )
    }
}

impl MetaTree {
    /// Build a tree from loaded configuration
    pub fn new(config: &OpenMetaConfig) -> Self {
        Self::with_parts(
            config.layout.clone(),
            config.lifecycle.clone(),
            Diagnostics::current(),
        )
    }

    pub fn with_parts(
        layout: LayoutConfig,
        lifecycle: LifecycleConfig,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            classifier: Classifier::new(layout, diagnostics.clone()),
            codecs: CodecRegistry::standard(),
            lifecycle: Lifecycle::new(lifecycle, diagnostics.clone()),
            diagnostics,
        }
    }

    /// Replace the codec table
    pub fn with_codecs(mut self, codecs: CodecRegistry) -> Self {
        self.codecs = codecs;
        self
    }

    pub fn layout(&self) -> &LayoutConfig {
        self.classifier.layout()
    }

    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Number of nodes ever allocated (detached nodes included)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub(crate) fn alloc(&mut self, kind: NodeKind, segment: PathBuf) -> NodeId {
        self.nodes.push(Node::new(kind, segment));
        NodeId(self.nodes.len() - 1)
    }

    /// Node previously materialized at `path`, if it still lives there as `kind`
    pub(crate) fn indexed(&self, path: &Path, kind: NodeKind) -> Option<NodeId> {
        let id = *self.index.get(path)?;
        (self.kind(id) == kind && self.path(id) == path).then_some(id)
    }

    pub(crate) fn remember(&mut self, path: PathBuf, id: NodeId) {
        self.index.insert(path, id);
    }

    /// Create an unattached in-memory node.
    ///
    /// Channels and Values must be named `<name>.<ext>`.
    pub fn create(&mut self, kind: NodeKind, path: impl AsRef<Path>) -> Result<NodeId, MetaError> {
        let path = path.as_ref();
        if kind != NodeKind::Container && path::extension(path).is_none() {
            return Err(MetaError::InvalidName(path.display().to_string()));
        }
        let segment = PathBuf::from(path::normalize_path_string(&path.to_string_lossy()));
        Ok(self.alloc(kind, segment))
    }

    /// Create a node and attach it below `parent`
    pub fn create_in(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        path: impl AsRef<Path>,
    ) -> Result<NodeId, MetaError> {
        let id = self.create(kind, path)?;
        self.attach(id, parent)?;
        Ok(id)
    }

    /// Classify an existing path and materialize it as a node.
    ///
    /// A path naming the metadata directory itself resolves to its Container.
    /// Resolving a path that already has a node returns that node. No
    /// filesystem mutation happens here.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn resolve(&mut self, path: impl AsRef<Path>) -> Result<Option<NodeId>, MetaError> {
        let mut path = path::canonicalize_path(path.as_ref())?;
        if self.layout().is_meta_dir(&path) {
            if let Some(parent) = path.parent() {
                path = parent.to_path_buf();
            }
        }
        let Some(kind) = self.classifier.determine(&path)? else {
            return Ok(None);
        };
        if let Some(id) = self.indexed(&path, kind) {
            return Ok(Some(id));
        }
        let id = self.alloc(kind, path.clone());
        self.remember(path, id);
        Ok(Some(id))
    }

    /// Classify a path without creating a node
    pub fn determine(&self, path: impl AsRef<Path>) -> Result<Option<NodeKind>, MetaError> {
        self.classifier.determine(path.as_ref())
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind()
    }

    /// Logical path: where the node nominally lives
    pub fn path(&self, id: NodeId) -> PathBuf {
        let node = self.node(id);
        match node.parent {
            Some(parent) => self.storage_path(parent).join(&node.segment),
            None => node.segment.clone(),
        }
    }

    /// Address chain of a node, one link per attached ancestor plus the
    /// metadata directory of every Container on the way
    pub fn address(&self, id: NodeId) -> Result<Address, MetaError> {
        let node = self.node(id);
        let Some(parent) = node.parent else {
            return Ok(Address::new(node.segment.clone()));
        };
        let mut base = self.address(parent)?;
        if self.kind(parent) == NodeKind::Container {
            base = Address::under(&self.layout().meta_dir, base)?;
        }
        Address::under(&node.segment, base)
    }

    /// Physical storage path: the metadata directory for Containers, the
    /// logical path for everything else
    pub fn storage_path(&self, id: NodeId) -> PathBuf {
        let path = self.path(id);
        match self.kind(id) {
            NodeKind::Container => path.join(&self.layout().meta_dir),
            _ => path,
        }
    }

    pub fn basename(&self, id: NodeId) -> String {
        path::basename(&self.node(id).segment)
    }

    /// Basename without extension and without hidden markers
    pub fn name(&self, id: NodeId) -> String {
        self.layout().name(&self.node(id).segment)
    }

    pub fn extension(&self, id: NodeId) -> Option<String> {
        path::extension(&self.node(id).segment)
    }

    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.layout().is_hidden(&self.node(id).segment)
    }

    /// Whether the logical path exists on disk
    pub fn exists(&self, id: NodeId) -> bool {
        let path = self.path(id);
        path.is_absolute() && path.exists()
    }

    /// Whether the storage path exists on disk
    pub fn storage_exists(&self, id: NodeId) -> bool {
        let path = self.storage_path(id);
        path.is_absolute() && path.exists()
    }

    fn accepts(parent: NodeKind, child: NodeKind) -> bool {
        matches!(
            (parent, child),
            (NodeKind::Container, NodeKind::Channel)
                | (NodeKind::Channel, NodeKind::Value)
                | (NodeKind::Channel, NodeKind::Container)
                | (NodeKind::Channel, NodeKind::Channel)
        )
    }

    /// Attach `child` below `parent`, detaching it from any previous parent.
    ///
    /// Absolute segments are rebased relative to the parent's storage path.
    /// A node that already exists on disk cannot be moved to a different
    /// location. An attached sibling at the same resolved path is replaced.
    pub fn attach(&mut self, child: NodeId, parent: NodeId) -> Result<(), MetaError> {
        let (parent_kind, child_kind) = (self.kind(parent), self.kind(child));
        if !Self::accepts(parent_kind, child_kind) {
            return Err(MetaError::WrongKind {
                path: self.path(parent),
                expected: if child_kind == NodeKind::Channel {
                    NodeKind::Container
                } else {
                    NodeKind::Channel
                },
                actual: parent_kind,
            });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(MetaError::NotUnderParent {
                path: self.path(parent),
                parent: self.path(child),
            });
        }

        let base = self.storage_path(parent);
        let node = self.node(child);
        let segment = if node.segment.is_absolute() {
            path::relative(&node.segment, &base)?
        } else if parent_kind == NodeKind::Channel
            && child_kind == NodeKind::Channel
            && !node.segment.starts_with(&self.layout().meta_dir)
        {
            // Nested channels live in the channel's own metadata directory
            Path::new(&self.layout().meta_dir).join(&node.segment)
        } else {
            node.segment.clone()
        };

        let current = self.path(child);
        let target = base.join(&segment);
        if current != target && current.is_absolute() && fs::symlink_metadata(&current).is_ok() {
            return Err(MetaError::Reparent(current));
        }

        self.unlink(child);
        // Content already at `target` is not compared: the attached sibling
        // at the same path is replaced and the disk is left to `write`.
        let duplicate = self
            .node(parent)
            .children()
            .iter()
            .copied()
            .find(|c| self.path(*c) == target);
        if let Some(previous) = duplicate {
            debug!(path = %target.display(), "Replacing attached child at same path");
            self.unlink(previous);
        }

        self.push_child(parent, child);
        self.node_mut(child).segment = segment;
        Ok(())
    }

    /// Detach `child` from its parent. The node keeps its relative segment.
    pub fn detach(&mut self, child: NodeId) {
        self.unlink(child);
    }

    fn unlink(&mut self, child: NodeId) {
        if let Some(parent) = self.node_mut(child).parent.take() {
            if let Some(children) = self.node_mut(parent).children_mut() {
                children.retain(|c| *c != child);
            }
        }
    }

    /// Raw link used once a child's segment is known to be valid
    pub(crate) fn push_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(children) = self.node_mut(parent).children_mut() {
            children.push(child);
        }
        self.node_mut(child).parent = Some(parent);
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut current = Some(of);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.node(id).parent;
        }
        false
    }

    /// Attached parent, or the node resolved from the enclosing directory.
    ///
    /// Derived Channel/Value parents are attached so the tree stays
    /// consistent; a Container's enclosing Container is returned unattached
    /// since containers do not own one another.
    pub fn parent(&mut self, id: NodeId) -> Result<Option<NodeId>, MetaError> {
        if let Some(parent) = self.node(id).parent {
            return Ok(Some(parent));
        }
        let path = self.path(id);
        if !path.is_absolute() || fs::symlink_metadata(&path).is_err() {
            return Ok(None);
        }
        let Some(dir) = path.parent() else {
            return Ok(None);
        };
        let Some(parent) = self.resolve(dir)? else {
            return Ok(None);
        };
        if Self::accepts(self.kind(parent), self.kind(id)) {
            self.attach(id, parent)?;
        }
        Ok(Some(parent))
    }

    /// Nearest Container at or above `id`
    pub fn container_of(&mut self, id: NodeId) -> Result<Option<NodeId>, MetaError> {
        self.nearest(id, NodeKind::Container)
    }

    /// Nearest Channel at or above `id`
    pub fn channel_of(&mut self, id: NodeId) -> Result<Option<NodeId>, MetaError> {
        self.nearest(id, NodeKind::Channel)
    }

    /// Nearest Container strictly above `id`
    pub fn parent_container(&mut self, id: NodeId) -> Result<Option<NodeId>, MetaError> {
        match self.parent(id)? {
            Some(parent) => self.container_of(parent),
            None => Ok(None),
        }
    }

    fn nearest(&mut self, id: NodeId, kind: NodeKind) -> Result<Option<NodeId>, MetaError> {
        let mut current = id;
        loop {
            if self.kind(current) == kind {
                return Ok(Some(current));
            }
            match self.parent(current)? {
                Some(parent) => current = parent,
                None => return Ok(None),
            }
        }
    }

    /// Make the node's storage exist without writing any payload
    pub fn create_storage(&mut self, id: NodeId) -> Result<(), MetaError> {
        let storage = self.rooted_storage(id)?;
        match self.kind(id) {
            NodeKind::Value => self.write(id),
            _ => self.lifecycle.create_dir(&storage),
        }
    }

    /// Soft-delete the node's storage and drop its attached children.
    ///
    /// Returns the deleted copy, or `None` when nothing existed.
    pub fn clear(&mut self, id: NodeId) -> Result<Option<PathBuf>, MetaError> {
        let storage = self.rooted_storage(id)?;
        let deleted = self.lifecycle.clear(&storage)?;
        if self.kind(id).is_parent() {
            let children: Vec<NodeId> = self.node(id).children().to_vec();
            for child in children {
                self.unlink(child);
            }
        }
        Ok(deleted)
    }

    /// Physically clear `child` and detach it from `parent`
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> Result<(), MetaError> {
        if self.node(child).parent != Some(parent) {
            return Err(MetaError::NotAChild {
                child: self.path(child),
                parent: self.path(parent),
            });
        }
        self.clear(child)?;
        self.unlink(child);
        Ok(())
    }

    /// Soft-deleted entries inside the node's storage directory
    pub fn trash(&self, id: NodeId) -> Result<Vec<TrashEntry>, MetaError> {
        self.lifecycle.trash(&self.storage_path(id))
    }

    pub(crate) fn rooted_storage(&self, id: NodeId) -> Result<PathBuf, MetaError> {
        let storage = self.storage_path(id);
        if !storage.is_absolute() {
            return Err(MetaError::NoParent(self.path(id)));
        }
        Ok(storage)
    }

    /// Materialize `reference` inside `channel` and attach it as a Value
    pub fn link(&mut self, channel: NodeId, reference: &dyn Reference) -> Result<NodeId, MetaError> {
        if self.kind(channel) != NodeKind::Channel {
            return Err(MetaError::WrongKind {
                path: self.path(channel),
                expected: NodeKind::Channel,
                actual: self.kind(channel),
            });
        }
        let dir = self.rooted_storage(channel)?;
        let basename = path::basename(reference.source());
        let value = self.create(NodeKind::Value, &basename)?;
        reference.materialize(&dir.join(&basename))?;
        self.attach(value, channel)?;
        info!(
            source = %reference.source().display(),
            channel = %dir.display(),
            "Linked reference"
        );
        Ok(value)
    }

    /// Depth-first listing, one `-o <basename>\t<path>` line per node
    pub fn outline(&mut self, id: NodeId) -> Result<String, MetaError> {
        let mut out = String::new();
        self.outline_into(id, 0, &mut out)?;
        Ok(out)
    }

    fn outline_into(&mut self, id: NodeId, depth: usize, out: &mut String) -> Result<(), MetaError> {
        out.push_str(&" ".repeat(depth));
        out.push_str(&format!("-o {}\t{}\n", self.basename(id), self.path(id).display()));
        for child in self.children(id)? {
            self.outline_into(child, depth + 1, out)?;
        }
        Ok(())
    }
}

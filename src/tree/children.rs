//! Child enumeration
//!
//! Listing a node merges its attached in-memory children with whatever the
//! filesystem holds at its storage path. Discovered entries are classified
//! and attached, so enumerating twice yields the same set.

use super::{path, MetaTree};
use crate::error::MetaError;
use crate::types::{NodeId, NodeKind};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visibility {
    Visible,
    Hidden,
}

impl MetaTree {
    /// Non-hidden children, attached and discovered, sorted by path.
    ///
    /// Values have no children.
    pub fn children(&mut self, id: NodeId) -> Result<Vec<NodeId>, MetaError> {
        let diagnostics = self.diagnostics.clone();
        diagnostics.in_scope(|| self.visible_children(id))
    }

    pub(crate) fn visible_children(&mut self, id: NodeId) -> Result<Vec<NodeId>, MetaError> {
        self.discover(id, Visibility::Visible)?;
        let mut children: Vec<NodeId> = self
            .node(id)
            .children()
            .iter()
            .copied()
            .filter(|child| !self.is_hidden(*child))
            .collect();
        children.sort_by_cached_key(|child| self.path(*child));
        Ok(children)
    }

    /// Hidden children present on disk, sorted by path
    pub fn hidden_children(&mut self, id: NodeId) -> Result<Vec<NodeId>, MetaError> {
        let diagnostics = self.diagnostics.clone();
        diagnostics.in_scope(|| {
            let mut children = self.discover(id, Visibility::Hidden)?;
            children.sort_by_cached_key(|child| self.path(*child));
            children.dedup();
            Ok(children)
        })
    }

    /// Child whose display name matches `name` (Unicode-normalized).
    ///
    /// Same-name siblings with different extensions resolve to the
    /// lexicographically smallest extension.
    pub fn child(&mut self, id: NodeId, name: &str) -> Result<Option<NodeId>, MetaError> {
        let diagnostics = self.diagnostics.clone();
        diagnostics.in_scope(|| {
            let mut matches: Vec<NodeId> = self
                .visible_children(id)?
                .into_iter()
                .filter(|child| path::names_match(&self.name(*child), name))
                .collect();
            matches.sort_by_cached_key(|child| self.extension(*child).unwrap_or_default());
            Ok(matches.into_iter().next())
        })
    }

    /// Directories listed for `id`, each with the segment prefix its
    /// entries get
    fn listing_dirs(&self, id: NodeId) -> Vec<(PathBuf, Option<PathBuf>)> {
        match self.kind(id) {
            NodeKind::Value => Vec::new(),
            NodeKind::Container => vec![(self.storage_path(id), None)],
            NodeKind::Channel => {
                let meta_dir = PathBuf::from(&self.layout().meta_dir);
                let own = self.path(id);
                vec![(own.join(&meta_dir), Some(meta_dir)), (own, None)]
            }
        }
    }

    fn attached_child_at(&self, id: NodeId, path: &Path) -> Option<NodeId> {
        self.node(id)
            .children()
            .iter()
            .copied()
            .find(|child| self.path(*child) == path)
    }

    /// Classify and attach entries found on disk; returns every matching
    /// entry, whether newly discovered or already attached
    fn discover(&mut self, id: NodeId, visibility: Visibility) -> Result<Vec<NodeId>, MetaError> {
        let parent_kind = self.kind(id);
        let mut found = Vec::new();

        for (dir, prefix) in self.listing_dirs(id) {
            if !dir.is_absolute() {
                continue;
            }
            for name in list_names(&dir)? {
                if self.layout().is_ignored(&name) || name == self.layout().meta_dir {
                    continue;
                }
                let hidden = self.layout().is_hidden(Path::new(&name));
                if hidden != (visibility == Visibility::Hidden) {
                    continue;
                }

                let full = dir.join(&name);
                if let Some(existing) = self.attached_child_at(id, &full) {
                    found.push(existing);
                    continue;
                }

                let kind = match self.classifier.determine(&full) {
                    Ok(Some(kind)) => kind,
                    Ok(None) => {
                        debug!(path = %full.display(), "Skipping unclassifiable entry");
                        continue;
                    }
                    Err(e) => {
                        debug!(path = %full.display(), error = %e, "Skipping entry");
                        continue;
                    }
                };
                if !Self::accepts(parent_kind, kind) {
                    debug!(
                        path = %full.display(),
                        kind = %kind,
                        parent = %parent_kind,
                        "Skipping entry of foreign kind"
                    );
                    continue;
                }

                let segment = match &prefix {
                    Some(prefix) => prefix.join(&name),
                    None => PathBuf::from(&name),
                };
                // A node resolved earlier for this path is adopted, not duplicated
                let adopted = self
                    .indexed(&full, kind)
                    .filter(|existing| self.node(*existing).parent().is_none());
                let child = match adopted {
                    Some(existing) => {
                        self.node_mut(existing).segment = segment;
                        existing
                    }
                    None => {
                        let child = self.alloc(kind, segment);
                        self.remember(full, child);
                        child
                    }
                };
                self.push_child(id, child);
                found.push(child);
            }
        }

        Ok(found)
    }
}

/// Sorted entry names of `dir`; a missing directory lists as empty
fn list_names(dir: &Path) -> Result<Vec<String>, MetaError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) if dir.is_file() => {
            debug!(path = %dir.display(), error = %e, "Not a directory");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => names.push(entry.file_name().to_string_lossy().into_owned()),
            Err(e) => debug!(path = %dir.display(), error = %e, "Skipping unreadable entry"),
        }
    }
    names.sort();
    Ok(names)
}

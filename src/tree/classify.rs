//! Node classification
//!
//! A node's kind is never stored; it is re-derived from the path's position
//! and naming every time. Classification is total and side-effect free: every
//! existing path maps to exactly one kind or to `None`, and a missing path is
//! reported as [`MetaError::NotFound`].

use crate::error::MetaError;
use crate::logging::Diagnostics;
use crate::tree::layout::LayoutConfig;
use crate::tree::path;
use crate::types::NodeKind;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Derives node kinds from raw filesystem state
#[derive(Debug, Clone)]
pub struct Classifier {
    layout: LayoutConfig,
    diagnostics: Diagnostics,
}

impl Classifier {
    pub fn new(layout: LayoutConfig, diagnostics: Diagnostics) -> Self {
        Self {
            layout,
            diagnostics,
        }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Decide which kind of node `path` represents.
    ///
    /// Returns `Ok(None)` (with a warning) for shapes that are not nodes.
    pub fn determine(&self, path: &Path) -> Result<Option<NodeKind>, MetaError> {
        self.diagnostics.in_scope(|| self.determine_inner(path))
    }

    fn determine_inner(&self, path: &Path) -> Result<Option<NodeKind>, MetaError> {
        let metadata = match fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MetaError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(MetaError::IoError(e)),
        };

        let parent_is_meta = path
            .parent()
            .map(|p| self.layout.is_meta_dir(p))
            .unwrap_or(false);

        if metadata.is_dir() {
            let holds_meta = path.join(&self.layout.meta_dir).exists();

            if holds_meta || parent_is_meta {
                if !parent_is_meta {
                    return Ok(Some(NodeKind::Container));
                }
                // Inside a metadata directory: a channel, possibly one that
                // nests further metadata of its own.
                if path::extension(path).is_none() {
                    warn!(path = %path.display(), "Invalid channel found within metadata folder");
                    return Ok(None);
                }
                return Ok(Some(NodeKind::Channel));
            }

            // Blank folders are future containers.
            debug!(path = %path.display(), "Classified plain directory as container candidate");
            return Ok(Some(NodeKind::Container));
        }

        if metadata.is_file() {
            let grandparent_is_meta = path
                .parent()
                .and_then(Path::parent)
                .map(|p| self.layout.is_meta_dir(p))
                .unwrap_or(false);

            if grandparent_is_meta {
                if path::extension(path).is_none() {
                    warn!(path = %path.display(), "Invalid file found within channel");
                    return Ok(None);
                }
                return Ok(Some(NodeKind::Value));
            }
        }

        warn!(path = %path.display(), "Can't figure out node kind");
        Ok(None)
    }
}

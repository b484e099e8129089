//! On-disk naming conventions shared by classification and enumeration.

use crate::tree::path;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Naming conventions of a metadata tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Reserved name of the metadata directory
    #[serde(default = "default_meta_dir")]
    pub meta_dir: String,

    /// Marker wrapped around a stem to hide a node (`__name__`)
    #[serde(default = "default_hidden_marker")]
    pub hidden_marker: String,

    /// Boolean key inside a channel's data that stops cascade ascent
    #[serde(default = "default_root_marker")]
    pub root_marker: String,

    /// OS housekeeping basenames never treated as nodes (case-insensitive)
    #[serde(default = "default_housekeeping")]
    pub housekeeping: Vec<String>,
}

fn default_meta_dir() -> String {
    ".meta".to_string()
}

fn default_hidden_marker() -> String {
    "__".to_string()
}

fn default_root_marker() -> String {
    "isRoot".to_string()
}

fn default_housekeeping() -> Vec<String> {
    vec!["Thumbs.db".to_string(), ".DS_Store".to_string()]
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            meta_dir: default_meta_dir(),
            hidden_marker: default_hidden_marker(),
            root_marker: default_root_marker(),
            housekeeping: default_housekeeping(),
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.meta_dir.is_empty() {
            return Err("Metadata directory name cannot be empty".to_string());
        }
        if self.meta_dir.contains('/') || self.meta_dir.contains('\\') {
            return Err(format!(
                "Metadata directory name must be a single component: {}",
                self.meta_dir
            ));
        }
        if self.hidden_marker.is_empty() {
            return Err("Hidden marker cannot be empty".to_string());
        }
        if self.root_marker.is_empty() {
            return Err("Root marker cannot be empty".to_string());
        }
        Ok(())
    }

    /// Whether the basename of `path` is the metadata directory
    pub fn is_meta_dir(&self, path: &Path) -> bool {
        path.file_name()
            .map(|n| n.to_string_lossy() == self.meta_dir.as_str())
            .unwrap_or(false)
    }

    /// Dot-prefixed entries and housekeeping files are never enumerated
    pub fn is_ignored(&self, basename: &str) -> bool {
        basename.starts_with('.')
            || self
                .housekeeping
                .iter()
                .any(|h| h.eq_ignore_ascii_case(basename))
    }

    /// Hidden nodes are skipped by default enumeration
    pub fn is_hidden(&self, path: &Path) -> bool {
        path::is_hidden_stem(&path::stem(path), &self.hidden_marker)
    }

    pub fn name(&self, path: &Path) -> String {
        path::display_name(path, &self.hidden_marker)
    }
}

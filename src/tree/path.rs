//! Path addressing: relative segments, basenames, extensions and hidden names.
//!
//! Everything here is pure string/path manipulation except
//! [`canonicalize_path`], which is the single place a caller-supplied path
//! touches the filesystem before classification.

use crate::error::MetaError;
use std::path::{Component, Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// A path segment optionally anchored to a parent address.
///
/// A parented address never stores an absolute segment: construction rebases
/// absolute descendants of the parent and rejects anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    segment: PathBuf,
    parent: Option<Box<Address>>,
}

impl Address {
    /// Create a free-standing address
    pub fn new(segment: impl Into<PathBuf>) -> Self {
        Self {
            segment: segment.into(),
            parent: None,
        }
    }

    /// Create an address below `parent`, rebasing `path` if it is absolute.
    pub fn under(path: impl AsRef<Path>, parent: Address) -> Result<Self, MetaError> {
        let segment = relative(path.as_ref(), &parent.full())?;
        Ok(Self {
            segment,
            parent: Some(Box::new(parent)),
        })
    }

    pub fn segment(&self) -> &Path {
        &self.segment
    }

    pub fn parent(&self) -> Option<&Address> {
        self.parent.as_deref()
    }

    /// Join the segment onto every ancestor segment
    pub fn full(&self) -> PathBuf {
        match &self.parent {
            Some(parent) => parent.full().join(&self.segment),
            None => self.segment.clone(),
        }
    }

    pub fn basename(&self) -> String {
        basename(&self.segment)
    }

    pub fn extension(&self) -> Option<String> {
        extension(&self.segment)
    }
}

/// Express `path` relative to `parent`.
///
/// Relative input is accepted as long as it stays below the parent (no `..`,
/// no root). Absolute input must be a strict descendant of `parent`.
pub fn relative(path: &Path, parent: &Path) -> Result<PathBuf, MetaError> {
    let not_under = || MetaError::NotUnderParent {
        path: path.to_path_buf(),
        parent: parent.to_path_buf(),
    };

    let segment = if path.is_absolute() {
        path.strip_prefix(parent).map_err(|_| not_under())?
    } else {
        path
    };

    let mut components = segment.components().peekable();
    if components.peek().is_none() {
        return Err(not_under());
    }
    if !components.all(|c| matches!(c, Component::Normal(_))) {
        return Err(not_under());
    }

    Ok(segment.to_path_buf())
}

/// Final component of `path` as a string (empty for `/`)
pub fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Extension of the basename, including its leading dot.
///
/// Splits on the last dot of the basename rather than using OS splitting, so
/// `.config.json` yields `.json`. A lone leading dot (`.bashrc`) or a
/// trailing dot (`name.`) yields no extension.
pub fn extension(path: &Path) -> Option<String> {
    let base = basename(path);
    match base.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < base.len() => Some(base[idx..].to_string()),
        _ => None,
    }
}

/// Basename without its extension
pub fn stem(path: &Path) -> String {
    let base = basename(path);
    match extension(path) {
        Some(ext) => base[..base.len() - ext.len()].to_string(),
        None => base,
    }
}

/// Whether a stem is wrapped in the hidden marker on both sides
pub fn is_hidden_stem(stem: &str, marker: &str) -> bool {
    !marker.is_empty()
        && stem.len() >= marker.len() * 2
        && stem.starts_with(marker)
        && stem.ends_with(marker)
}

/// Logical name: stem with any hidden marker stripped
pub fn display_name(path: &Path, marker: &str) -> String {
    let stem = stem(path);
    if is_hidden_stem(&stem, marker) {
        stem[marker.len()..stem.len() - marker.len()].to_string()
    } else {
        stem
    }
}

/// Compare two node names under Unicode NFC
pub fn names_match(a: &str, b: &str) -> bool {
    a.nfc().eq(b.nfc())
}

/// Canonicalize an on-disk path (resolves symlinks, `..`, `.`).
///
/// A missing path maps to [`MetaError::NotFound`] so callers can tell absence
/// apart from other I/O failures.
pub fn canonicalize_path(path: &Path) -> Result<PathBuf, MetaError> {
    dunce::canonicalize(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => MetaError::NotFound(path.to_path_buf()),
        _ => MetaError::IoError(e),
    })
}

/// Normalize a path string without filesystem access
///
/// Used for in-memory nodes whose path may not exist yet.
pub fn normalize_path_string(path: &str) -> String {
    let mut result = path.to_string();
    if result.len() > 1 {
        while result.ends_with('/') || result.ends_with('\\') {
            result.pop();
        }
    }
    result
}

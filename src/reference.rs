//! External resource references
//!
//! A reference attaches an external file to a channel without passing its
//! bytes through a codec: it only knows how to materialize itself at a
//! destination path.

use crate::error::MetaError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Opaque handle to an external resource
pub trait Reference {
    /// Path of the external source
    fn source(&self) -> &Path;

    /// Place the resource at `destination`, replacing whatever is there.
    fn materialize(&self, destination: &Path) -> Result<(), MetaError>;
}

/// Hard link to the source file
#[derive(Debug, Clone)]
pub struct Hardlink {
    source: PathBuf,
}

impl Hardlink {
    pub fn new(source: impl Into<PathBuf>) -> Result<Self, MetaError> {
        Ok(Self {
            source: existing_source(source.into())?,
        })
    }
}

impl Reference for Hardlink {
    fn source(&self) -> &Path {
        &self.source
    }

    fn materialize(&self, destination: &Path) -> Result<(), MetaError> {
        prepare_destination(destination)?;
        fs::hard_link(&self.source, destination)?;
        debug!(
            source = %self.source.display(),
            destination = %destination.display(),
            "Hardlinked reference"
        );
        Ok(())
    }
}

/// Independent copy of the source file
#[derive(Debug, Clone)]
pub struct FileCopy {
    source: PathBuf,
}

impl FileCopy {
    pub fn new(source: impl Into<PathBuf>) -> Result<Self, MetaError> {
        Ok(Self {
            source: existing_source(source.into())?,
        })
    }
}

impl Reference for FileCopy {
    fn source(&self) -> &Path {
        &self.source
    }

    fn materialize(&self, destination: &Path) -> Result<(), MetaError> {
        prepare_destination(destination)?;
        fs::copy(&self.source, destination)?;
        debug!(
            source = %self.source.display(),
            destination = %destination.display(),
            "Copied reference"
        );
        Ok(())
    }
}

fn existing_source(source: PathBuf) -> Result<PathBuf, MetaError> {
    if !source.is_file() {
        return Err(MetaError::NotFound(source));
    }
    Ok(source)
}

/// Remove any previous destination and create its parent directories
fn prepare_destination(destination: &Path) -> Result<(), MetaError> {
    match fs::symlink_metadata(destination) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(destination)?,
        Ok(_) => fs::remove_file(destination)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

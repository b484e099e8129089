//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::MetaError;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &MetaError) -> String {
    match e {
        MetaError::Unclassifiable(path) => format!(
            "{} is not a container, channel or value",
            path.display()
        ),
        MetaError::TransientLock { path, attempts, .. } => format!(
            "{} is locked by another process (gave up after {} attempts)",
            path.display(),
            attempts
        ),
        other => other.to_string(),
    }
}

//! Error types for the OpenMeta metadata store.

use crate::types::NodeKind;
use std::path::PathBuf;
use thiserror::Error;

/// Payload encoding/decoding errors
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("No codec registered for extension {0:?}")]
    UnknownExtension(String),

    #[error("Malformed {format} payload: {message}")]
    Malformed {
        format: &'static str,
        message: String,
    },

    #[error("{format} cannot represent value: {message}")]
    Unsupported {
        format: &'static str,
        message: String,
    },
}

/// Node API errors
#[derive(Debug, Error)]
pub enum MetaError {
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    #[error("Path does not match any node shape: {0}")]
    Unclassifiable(PathBuf),

    #[error("Path {path} is not part of parent {parent}")]
    NotUnderParent { path: PathBuf, parent: PathBuf },

    #[error("No parent set for {0}")]
    NoParent(PathBuf),

    #[error("Cannot change the parent of an existing object: {0}")]
    Reparent(PathBuf),

    #[error("{child} is not a child of {parent}")]
    NotAChild { child: PathBuf, parent: PathBuf },

    #[error("{path} is a {actual}, expected a {expected}")]
    WrongKind {
        path: PathBuf,
        expected: NodeKind,
        actual: NodeKind,
    },

    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    #[error("{path} still held by another process after {attempts} attempts: {source}")]
    TransientLock {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("Codec failure: {0}")]
    Codec(#[from] CodecError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for MetaError {
    fn from(err: config::ConfigError) -> Self {
        MetaError::ConfigError(err.to_string())
    }
}

//! OpenMeta: Hierarchical Metadata Stored Alongside Folders
//!
//! Arbitrary metadata is attached to ordinary folders by convention: each
//! folder may hold a reserved `.meta` directory of typed channels, each
//! channel a directory of value files. Metadata is readable and writable by
//! any tool that understands plain files, and `.kvs` channels cascade down
//! the folder hierarchy.

pub mod cascade;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod reference;
pub mod tree;
pub mod types;

pub use error::{CodecError, MetaError};
pub use tree::MetaTree;
pub use types::{NodeId, NodeKind};

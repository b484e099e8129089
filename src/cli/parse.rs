//! CLI parse: clap types for OpenMeta. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// OpenMeta CLI - inspect and edit metadata stored alongside folders
#[derive(Parser, Debug)]
#[command(name = "openmeta")]
#[command(about = "Inspect and edit hierarchical metadata stored alongside folders")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory; relative paths resolve against it
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a path as container, channel or value
    Kind {
        path: PathBuf,
    },
    /// List the children of a node
    Ls {
        path: PathBuf,
        /// List hidden children instead of visible ones
        #[arg(long)]
        hidden: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the data of a node as JSON
    Read {
        path: PathBuf,
    },
    /// Print the node outline below a path
    Tree {
        path: PathBuf,
    },
    /// Print the cascaded data of a .kvs channel
    Cascade {
        /// Folder to start from
        path: PathBuf,
        /// Channel name without extension
        channel: String,
    },
    /// Set one key of a channel and write it
    Set {
        /// Folder owning the channel
        folder: PathBuf,
        /// Channel basename, e.g. cfg.kvs
        channel: String,
        key: String,
        /// JSON value; anything that does not parse is stored as a string
        value: String,
    },
    /// Soft-delete a node's storage
    Clear {
        path: PathBuf,
    },
    /// List soft-deleted entries in a directory
    Trash {
        path: PathBuf,
        /// Permanently delete entries cleared more than this many days ago
        #[arg(long)]
        purge_older_than_days: Option<u32>,
    },
}

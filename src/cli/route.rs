//! CLI route: single route table and run context.

use crate::cli::parse::Commands;
use crate::cli::presentation::{format_json, format_listing, format_trash};
use crate::config::{ConfigLoader, OpenMetaConfig};
use crate::error::MetaError;
use crate::tree::MetaTree;
use crate::types::{NodeId, NodeKind};
use chrono::{Duration, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Runtime context for CLI execution: workspace and loaded configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config: OpenMetaConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, MetaError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self::with_config(workspace_root, config))
    }

    pub fn with_config(workspace_root: PathBuf, config: OpenMetaConfig) -> Self {
        Self {
            workspace_root,
            config,
        }
    }

    pub fn config(&self) -> &OpenMetaConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, MetaError> {
        let mut tree = MetaTree::new(&self.config);
        match command {
            Commands::Kind { path } => {
                let path = self.absolute(path);
                match tree.determine(&path)? {
                    Some(kind) => Ok(kind.to_string()),
                    None => Err(MetaError::Unclassifiable(path)),
                }
            }
            Commands::Ls {
                path,
                hidden,
                format,
            } => {
                let id = self.resolve(&mut tree, path)?;
                let children = if *hidden {
                    tree.hidden_children(id)?
                } else {
                    tree.children(id)?
                };
                format_listing(&tree, &children, format)
            }
            Commands::Read { path } => {
                let id = self.resolve(&mut tree, path)?;
                let data = tree.read(id).data(id);
                format_json(&data)
            }
            Commands::Tree { path } => {
                let id = self.resolve(&mut tree, path)?;
                Ok(tree.outline(id)?.trim_end().to_string())
            }
            Commands::Cascade { path, channel } => {
                let id = self.resolve(&mut tree, path)?;
                let merged = tree.cascade(id, channel)?;
                format_json(&Value::Object(merged))
            }
            Commands::Set {
                folder,
                channel,
                key,
                value,
            } => self.handle_set(&mut tree, folder, channel, key, value),
            Commands::Clear { path } => {
                let id = self.resolve(&mut tree, path)?;
                match tree.clear(id)? {
                    Some(deleted) => Ok(format!("Cleared to {}", deleted.display())),
                    None => Ok("Nothing to clear.".to_string()),
                }
            }
            Commands::Trash {
                path,
                purge_older_than_days,
            } => {
                let dir = self.absolute(path);
                if let Some(days) = purge_older_than_days {
                    let cutoff = Utc::now() - Duration::days(i64::from(*days));
                    let purged = tree.lifecycle().purge_trash(&dir, cutoff)?;
                    info!(count = purged.len(), "Purged trash");
                }
                Ok(format_trash(&tree.lifecycle().trash(&dir)?))
            }
        }
    }

    fn handle_set(
        &self,
        tree: &mut MetaTree,
        folder: &Path,
        channel: &str,
        key: &str,
        value: &str,
    ) -> Result<String, MetaError> {
        let folder = self.resolve(tree, folder)?;
        if tree.kind(folder) != NodeKind::Container {
            return Err(MetaError::WrongKind {
                path: tree.path(folder),
                expected: NodeKind::Container,
                actual: tree.kind(folder),
            });
        }

        let existing = tree
            .children(folder)?
            .into_iter()
            .find(|c| tree.basename(*c) == channel);
        let channel_id = match existing {
            Some(id) => id,
            None => tree.create_in(folder, NodeKind::Channel, channel)?,
        };

        let mut data = match tree.read(channel_id).data(channel_id) {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        let parsed = serde_json::from_str(value).unwrap_or_else(|_| {
            debug!(value, "Storing value as plain string");
            Value::String(value.to_string())
        });
        data.insert(key.to_string(), parsed);
        tree.set_data(channel_id, data)?;
        tree.write(channel_id)?;
        Ok(format!("Set {} in {}", key, tree.path(channel_id).display()))
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }

    fn resolve(&self, tree: &mut MetaTree, path: &Path) -> Result<NodeId, MetaError> {
        let path = self.absolute(path);
        tree.resolve(&path)?
            .ok_or(MetaError::Unclassifiable(path))
    }
}

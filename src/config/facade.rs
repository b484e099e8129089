//! Config loading facade: one entry point over the layered sources.

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::OpenMetaConfig;
use crate::error::MetaError;
use config::File;
use std::path::Path;
use tracing::debug;

/// Loads [`OpenMetaConfig`] from defaults, files and environment
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (highest last): defaults, global file, workspace
    /// `config/config.toml`, `config/$OPENMETA_ENV.toml`, environment.
    pub fn load(workspace_root: &Path) -> Result<OpenMetaConfig, MetaError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder)?;

        let config: OpenMetaConfig = builder.build()?.try_deserialize()?;
        debug!(workspace = %workspace_root.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load configuration from an explicit file; the environment still
    /// overrides it.
    pub fn load_from_file(path: &Path) -> Result<OpenMetaConfig, MetaError> {
        if !path.is_file() {
            return Err(MetaError::ConfigError(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true));
        let builder = environment::add_to_builder(builder)?;

        let config: OpenMetaConfig = builder.build()?.try_deserialize()?;
        debug!(config_path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Load and validate, folding every validation error into one message
    pub fn load_validated(workspace_root: &Path) -> Result<OpenMetaConfig, MetaError> {
        let config = Self::load(workspace_root)?;
        config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            MetaError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                messages.join("\n")
            ))
        })?;
        Ok(config)
    }
}

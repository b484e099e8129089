//! Configuration System
//!
//! Layered configuration for the metadata store: naming conventions of the
//! on-disk layout, lifecycle retry policy and logging. Sources merge in
//! order of precedence through the `config` crate; see [`ConfigLoader`].

use crate::lifecycle::LifecycleConfig;
use crate::logging::LoggingConfig;
use crate::tree::layout::LayoutConfig;
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenMetaConfig {
    /// On-disk naming conventions
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Retry policy for create/clear
    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Layout(String),
    Lifecycle(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Layout(msg) => write!(f, "Layout: {}", msg),
            ValidationError::Lifecycle(msg) => write!(f, "Lifecycle: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl OpenMetaConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.layout.validate() {
            errors.push(ValidationError::Layout(e));
        }
        if let Err(e) = self.lifecycle.validate() {
            errors.push(ValidationError::Lifecycle(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

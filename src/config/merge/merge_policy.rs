//! Merge rules: defaults, override order, conflict handling.
//!
//! Later sources override earlier ones key by key:
//! defaults < global file < workspace file < workspace env file < environment.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("layout.meta_dir", ".meta")?
        .set_default("layout.hidden_marker", "__")?
        .set_default("layout.root_marker", "isRoot")?
        .set_default("layout.housekeeping", vec!["Thumbs.db", ".DS_Store"])?
        .set_default("lifecycle.max_retries", 10)?
        .set_default("lifecycle.retry_delay_ms", 100)?
        .set_default("logging.level", "warn")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}

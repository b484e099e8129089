//! Integration tests for Configuration System

use openmeta::config::{ConfigLoader, OpenMetaConfig};
use openmeta::{MetaTree, NodeKind};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_custom_layout_drives_classification() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("openmeta.toml");
    fs::write(
        &config_file,
        r#"
[layout]
meta_dir = "_meta"
hidden_marker = "~"
root_marker = "top"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert!(config.validate().is_ok());

    let folder_path = temp_dir.path().join("asset");
    let channel_path = folder_path.join("_meta").join("cfg.kvs");
    fs::create_dir_all(&channel_path).unwrap();
    fs::write(channel_path.join("a.json"), "1").unwrap();
    fs::write(channel_path.join("~b~.json"), "2").unwrap();

    let mut tree = MetaTree::new(&config);
    assert_eq!(tree.determine(&channel_path).unwrap(), Some(NodeKind::Channel));
    let folder = tree.resolve(&folder_path).unwrap().unwrap();
    let channel = tree.child(folder, "cfg").unwrap().unwrap();
    assert_eq!(tree.read(channel).data(channel), serde_json::json!({"a": 1}));
}

#[test]
fn test_env_specific_workspace_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[lifecycle]\nmax_retries = 4\nretry_delay_ms = 5\n",
    )
    .unwrap();
    fs::write(
        config_dir.join("development.toml"),
        "[lifecycle]\nmax_retries = 2\n",
    )
    .unwrap();

    let config = ConfigLoader::load(temp_dir.path()).unwrap();
    if std::env::var("OPENMETA_ENV").map(|e| e == "development").unwrap_or(true) {
        assert_eq!(config.lifecycle.max_retries, 2);
    }
    assert_eq!(config.lifecycle.retry_delay_ms, 5);
}

#[test]
fn test_invalid_config_reports_every_problem() {
    let mut config = OpenMetaConfig::default();
    config.layout.meta_dir.clear();
    config.logging.level = "loud".to_string();

    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 2);
}

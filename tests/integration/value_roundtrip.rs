//! Writing payloads and reading them back through a fresh tree

use super::test_utils::{entries, object};
use openmeta::{MetaError, MetaTree, NodeKind};
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

fn reread(root: &std::path::Path, channel: &str) -> Value {
    let mut tree = MetaTree::default();
    let folder = tree.resolve(root).unwrap().unwrap();
    let channel = tree.child(folder, channel).unwrap().unwrap();
    tree.read(channel).data(channel)
}

#[test]
fn test_structured_values_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let mut tree = MetaTree::default();
    let folder = tree.resolve(temp_dir.path()).unwrap().unwrap();
    let channel = tree.create_in(folder, NodeKind::Channel, "shot.kvs").unwrap();

    let data = json!({
        "frames": {"start": 1001, "end": 1100},
        "artists": ["ana", "bo"],
        "approved": false,
        "fps": 23.976
    });
    tree.set_data(channel, object(data.clone())).unwrap();
    tree.write(channel).unwrap();

    assert_eq!(reread(temp_dir.path(), "shot"), data);
}

#[test]
fn test_text_channel_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let mut tree = MetaTree::default();
    let folder = tree.resolve(temp_dir.path()).unwrap().unwrap();
    let notes = tree.create_in(folder, NodeKind::Channel, "notes.mdw").unwrap();

    tree.set_data(notes, object(json!({"brief": "# Shot 10\n\nKeep it dark."})))
        .unwrap();
    tree.write(folder).unwrap();

    let file = temp_dir
        .path()
        .join(".meta")
        .join("notes.mdw")
        .join("brief.txt");
    assert_eq!(fs::read_to_string(file).unwrap(), "# Shot 10\n\nKeep it dark.");
    assert_eq!(
        reread(temp_dir.path(), "notes"),
        json!({"brief": "# Shot 10\n\nKeep it dark."})
    );
}

#[test]
fn test_json_is_indented_with_four_spaces() {
    let temp_dir = TempDir::new().unwrap();
    let mut tree = MetaTree::default();
    let folder = tree.resolve(temp_dir.path()).unwrap().unwrap();
    let channel = tree.create_in(folder, NodeKind::Channel, "cfg.kvs").unwrap();
    tree.set_data(channel, object(json!({"render": {"engine": "arnold"}})))
        .unwrap();
    tree.write(channel).unwrap();

    let raw = fs::read_to_string(
        temp_dir
            .path()
            .join(".meta")
            .join("cfg.kvs")
            .join("render.json"),
    )
    .unwrap();
    assert!(raw.contains("\n    \"engine\""));
}

#[test]
fn test_individual_value_write() {
    let temp_dir = TempDir::new().unwrap();
    let mut tree = MetaTree::default();
    let folder = tree.resolve(temp_dir.path()).unwrap().unwrap();
    let channel = tree.create_in(folder, NodeKind::Channel, "cfg.kvs").unwrap();
    let settings = tree
        .create_in(channel, NodeKind::Value, "settings.toml")
        .unwrap();
    tree.set_payload(settings, json!({"title": "shot", "size": {"w": 1920}}))
        .unwrap();
    tree.write(settings).unwrap();

    let mut fresh = MetaTree::default();
    let path = tree.path(settings);
    let value = fresh.resolve(&path).unwrap().unwrap();
    fresh.read(value);
    assert_eq!(
        fresh.payload(value),
        Some(&json!({"title": "shot", "size": {"w": 1920}}))
    );
}

#[test]
fn test_failed_encode_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let mut tree = MetaTree::default();
    let folder = tree.resolve(temp_dir.path()).unwrap().unwrap();
    let channel = tree.create_in(folder, NodeKind::Channel, "cfg.kvs").unwrap();
    tree.set_data(channel, object(json!({"a": 1}))).unwrap();
    tree.write(channel).unwrap();

    let ini = tree.create_in(channel, NodeKind::Value, "deep.ini").unwrap();
    tree.set_payload(ini, json!({"x": {"y": {"z": 1}}})).unwrap();
    assert!(matches!(tree.write(ini), Err(MetaError::Codec(_))));

    let dir = temp_dir.path().join(".meta").join("cfg.kvs");
    assert_eq!(entries(&dir), vec!["a.json"]);
}

#[test]
fn test_corrupt_value_degrades_without_failing() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join(".meta").join("cfg.kvs");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("good.json"), "{\"k\": 1}").unwrap();
    fs::write(dir.join("bad.json"), "{\"k\": ").unwrap();

    assert_eq!(reread(temp_dir.path(), "cfg"), json!({"good": {"k": 1}}));
}

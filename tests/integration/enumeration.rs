//! Child enumeration, lookup and outline

use super::test_utils::{channel_dir, write_kvs};
use openmeta::{MetaTree, NodeKind};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_enumeration_is_idempotent_and_deduplicated() {
    let temp_dir = TempDir::new().unwrap();
    write_kvs(temp_dir.path(), "cfg", json!({"a": 1, "b": 2}));

    let mut tree = MetaTree::default();
    let folder = tree.resolve(temp_dir.path()).unwrap().unwrap();
    let channel = tree.child(folder, "cfg").unwrap().unwrap();

    let first = tree.children(channel).unwrap();
    let allocated = tree.len();
    let second = tree.children(channel).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(tree.len(), allocated, "second listing must not allocate");
    assert_eq!(tree.node(channel).children().len(), 2);
}

#[test]
fn test_children_are_sorted_by_path() {
    let temp_dir = TempDir::new().unwrap();
    write_kvs(temp_dir.path(), "zeta", json!({"k": 1}));
    write_kvs(temp_dir.path(), "alpha", json!({"k": 1}));
    channel_dir(temp_dir.path(), "notes.txt");

    let mut tree = MetaTree::default();
    let folder = tree.resolve(temp_dir.path()).unwrap().unwrap();
    let names: Vec<String> = tree
        .children(folder)
        .unwrap()
        .into_iter()
        .map(|c| tree.basename(c))
        .collect();
    assert_eq!(names, vec!["alpha.kvs", "notes.txt", "zeta.kvs"]);
}

#[test]
fn test_housekeeping_and_dot_entries_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let channel = channel_dir(temp_dir.path(), "cfg.kvs");
    fs::write(channel.join("a.json"), "1").unwrap();
    fs::write(channel.join(".DS_Store"), "").unwrap();
    fs::write(channel.join("THUMBS.DB"), "").unwrap();
    fs::write(channel.join(".deleted.20240101000000.b.json"), "2").unwrap();

    let mut tree = MetaTree::default();
    let channel = tree.resolve(&channel).unwrap().unwrap();
    let names: Vec<String> = tree
        .children(channel)
        .unwrap()
        .into_iter()
        .map(|c| tree.basename(c))
        .collect();
    assert_eq!(names, vec!["a.json"]);
}

#[test]
fn test_hidden_children_listed_separately() {
    let temp_dir = TempDir::new().unwrap();
    write_kvs(temp_dir.path(), "cfg", json!({"visible": 1, "__private__": 2}));

    let mut tree = MetaTree::default();
    let folder = tree.resolve(temp_dir.path()).unwrap().unwrap();
    let channel = tree.child(folder, "cfg").unwrap().unwrap();

    let visible = tree.children(channel).unwrap();
    let hidden = tree.hidden_children(channel).unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(hidden.len(), 1);
    assert_eq!(tree.name(hidden[0]), "private");
    assert!(tree.is_hidden(hidden[0]));

    // Hidden values stay out of the channel's data
    assert_eq!(tree.read(channel).data(channel), json!({"visible": 1}));
}

#[test]
fn test_child_lookup_is_unicode_normalized() {
    let temp_dir = TempDir::new().unwrap();
    // "café" with a combining acute accent on disk
    write_kvs(temp_dir.path(), "cafe\u{301}", json!({"k": 1}));

    let mut tree = MetaTree::default();
    let folder = tree.resolve(temp_dir.path()).unwrap().unwrap();
    let found = tree.child(folder, "caf\u{e9}").unwrap();
    assert!(found.is_some());
}

#[test]
fn test_outline_lists_depth_first() {
    let temp_dir = TempDir::new().unwrap();
    write_kvs(temp_dir.path(), "cfg", json!({"a": 1}));

    let mut tree = MetaTree::default();
    let folder = tree.resolve(temp_dir.path()).unwrap().unwrap();
    let outline = tree.outline(folder).unwrap();
    let lines: Vec<&str> = outline.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("-o "));
    assert!(lines[1].starts_with(" -o cfg.kvs\t"));
    assert!(lines[2].starts_with("  -o a.json\t"));
}

#[test]
fn test_in_memory_and_disk_children_merge() {
    let temp_dir = TempDir::new().unwrap();
    write_kvs(temp_dir.path(), "cfg", json!({"a": 1}));

    let mut tree = MetaTree::default();
    let folder = tree.resolve(temp_dir.path()).unwrap().unwrap();
    let pending = tree
        .create_in(folder, NodeKind::Channel, "notes.txt")
        .unwrap();

    let children = tree.children(folder).unwrap();
    assert_eq!(children.len(), 2);
    assert!(children.contains(&pending));
    assert!(!tree.exists(pending));
}

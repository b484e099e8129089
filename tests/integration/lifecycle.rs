//! Soft delete, trash and ownership rules

use super::test_utils::{channel_dir, entries, object, write_kvs};
use chrono::{Duration, TimeZone, Utc};
use openmeta::lifecycle::{Lifecycle, TrashEntry};
use openmeta::{MetaError, MetaTree, NodeKind};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_clear_missing_path_is_noop() {
    let temp_dir = TempDir::new().unwrap();
    let lifecycle = Lifecycle::default();
    let missing = temp_dir.path().join("missing");

    assert_eq!(lifecycle.clear(&missing).unwrap(), None);
    assert!(entries(temp_dir.path()).is_empty());
}

#[test]
fn test_clear_renames_with_timestamp() {
    let temp_dir = TempDir::new().unwrap();
    let channel = write_kvs(temp_dir.path(), "cfg", json!({"a": 1}));

    let mut tree = MetaTree::default();
    let id = tree.resolve(&channel).unwrap().unwrap();
    let deleted = tree.clear(id).unwrap().unwrap();

    assert!(!channel.exists());
    let entry = TrashEntry::parse(&deleted).unwrap();
    assert_eq!(entry.original, "cfg.kvs");
    assert!(deleted.join("a.json").is_file());
}

#[test]
fn test_same_second_clear_keeps_latest() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("notes.txt");
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let lifecycle = Lifecycle::default();

    fs::write(&target, "first").unwrap();
    let first = lifecycle.clear_at(&target, now).unwrap().unwrap();
    fs::write(&target, "second").unwrap();
    let second = lifecycle.clear_at(&target, now).unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "second");
    assert_eq!(entries(temp_dir.path()).len(), 1);
}

#[test]
fn test_clearing_container_moves_whole_meta_dir() {
    let temp_dir = TempDir::new().unwrap();
    write_kvs(temp_dir.path(), "cfg", json!({"a": 1}));
    channel_dir(temp_dir.path(), "notes.txt");

    let mut tree = MetaTree::default();
    let folder = tree.resolve(temp_dir.path()).unwrap().unwrap();
    assert_eq!(tree.children(folder).unwrap().len(), 2);
    tree.clear(folder).unwrap();

    assert!(!temp_dir.path().join(".meta").exists());
    assert!(tree.node(folder).children().is_empty());
    let trash = tree.lifecycle().trash(temp_dir.path()).unwrap();
    assert_eq!(trash.len(), 1);
    assert_eq!(trash[0].original, ".meta");
}

#[test]
fn test_reparenting_existing_node_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let a = temp_dir.path().join("a");
    let b = temp_dir.path().join("b");
    fs::create_dir_all(&a).unwrap();
    fs::create_dir_all(&b).unwrap();
    let channel_path = write_kvs(&a, "cfg", json!({"k": 1}));

    let mut tree = MetaTree::default();
    let folder_a = tree.resolve(&a).unwrap().unwrap();
    let folder_b = tree.resolve(&b).unwrap().unwrap();
    let channel = tree.child(folder_a, "cfg").unwrap().unwrap();

    let err = tree.attach(channel, folder_b).unwrap_err();
    assert!(matches!(err, MetaError::Reparent(_)));
    assert_eq!(tree.node(channel).parent(), Some(folder_a));
    assert!(channel_path.join("k.json").is_file());
    assert!(!b.join(".meta").exists());
}

#[test]
fn test_unwritten_node_can_move() {
    let temp_dir = TempDir::new().unwrap();
    let a = temp_dir.path().join("a");
    let b = temp_dir.path().join("b");
    fs::create_dir_all(&a).unwrap();
    fs::create_dir_all(&b).unwrap();

    let mut tree = MetaTree::default();
    let folder_a = tree.resolve(&a).unwrap().unwrap();
    let folder_b = tree.resolve(&b).unwrap().unwrap();
    let channel = tree.create_in(folder_a, NodeKind::Channel, "cfg.kvs").unwrap();
    tree.attach(channel, folder_b).unwrap();

    assert!(tree.node(folder_a).children().is_empty());
    assert_eq!(tree.node(folder_b).children(), &[channel]);
}

#[test]
fn test_remove_clears_and_detaches() {
    let temp_dir = TempDir::new().unwrap();
    write_kvs(temp_dir.path(), "cfg", json!({"a": 1}));

    let mut tree = MetaTree::default();
    let folder = tree.resolve(temp_dir.path()).unwrap().unwrap();
    let channel = tree.child(folder, "cfg").unwrap().unwrap();
    tree.remove(folder, channel).unwrap();

    assert!(tree.children(folder).unwrap().is_empty());
    assert_eq!(tree.trash(folder).unwrap().len(), 1);
}

#[test]
fn test_rewriting_channel_soft_deletes_previous() {
    let temp_dir = TempDir::new().unwrap();
    write_kvs(temp_dir.path(), "cfg", json!({"old": 1}));

    let mut tree = MetaTree::default();
    let folder = tree.resolve(temp_dir.path()).unwrap().unwrap();
    let channel = tree.child(folder, "cfg").unwrap().unwrap();
    tree.set_data(channel, object(json!({"new": 2}))).unwrap();
    tree.write(channel).unwrap();

    let trash = tree.trash(folder).unwrap();
    assert_eq!(trash.len(), 1);
    assert!(trash[0].path.join("old.json").is_file());
    assert_eq!(tree.read(channel).data(channel), json!({"new": 2}));
}

#[test]
fn test_purge_trash_respects_cutoff() {
    let temp_dir = TempDir::new().unwrap();
    let lifecycle = Lifecycle::default();
    let old = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let target = temp_dir.path().join("a.txt");

    fs::write(&target, "old").unwrap();
    lifecycle.clear_at(&target, old).unwrap();
    fs::write(&target, "recent").unwrap();
    lifecycle.clear(&target).unwrap();

    let purged = lifecycle
        .purge_trash(temp_dir.path(), Utc::now() - Duration::days(1))
        .unwrap();
    assert_eq!(purged.len(), 1);
    assert_eq!(lifecycle.trash(temp_dir.path()).unwrap().len(), 1);
}

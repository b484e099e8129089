//! Linking external resources into channels

use openmeta::reference::{FileCopy, Hardlink};
use openmeta::{MetaError, MetaTree, NodeKind};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_link_copies_into_channel() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("thumb.png");
    fs::write(&source, b"\x89PNG").unwrap();
    let folder_path = temp_dir.path().join("shot");
    fs::create_dir_all(&folder_path).unwrap();

    let mut tree = MetaTree::default();
    let folder = tree.resolve(&folder_path).unwrap().unwrap();
    let images = tree.create_in(folder, NodeKind::Channel, "thumbs.img").unwrap();
    let value = tree.link(images, &FileCopy::new(&source).unwrap()).unwrap();

    let placed = tree.path(folder).join(".meta").join("thumbs.img").join("thumb.png");
    assert_eq!(tree.path(value), placed);
    assert_eq!(fs::read(&placed).unwrap(), b"\x89PNG");
    assert_eq!(tree.children(images).unwrap(), vec![value]);
}

#[test]
fn test_hardlink_reference() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("clip.mov");
    fs::write(&source, b"frames").unwrap();

    let mut tree = MetaTree::default();
    let folder = tree.resolve(temp_dir.path()).unwrap().unwrap();
    let video = tree.create_in(folder, NodeKind::Channel, "clips.vid").unwrap();
    let value = tree.link(video, &Hardlink::new(&source).unwrap()).unwrap();

    assert_eq!(tree.kind(value), NodeKind::Value);
    assert_eq!(tree.determine(tree.path(value)).unwrap(), Some(NodeKind::Value));
}

#[test]
fn test_link_requires_channel() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("thumb.png");
    fs::write(&source, b"x").unwrap();

    let mut tree = MetaTree::default();
    let folder = tree.resolve(temp_dir.path()).unwrap().unwrap();
    let err = tree
        .link(folder, &FileCopy::new(&source).unwrap())
        .unwrap_err();
    assert!(matches!(err, MetaError::WrongKind { .. }));
}

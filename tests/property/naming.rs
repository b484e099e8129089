//! Naming rule properties: hidden markers, extensions, deleted names

use chrono::{TimeZone, Utc};
use openmeta::lifecycle::{deleted_name, TrashEntry};
use openmeta::tree::layout::LayoutConfig;
use openmeta::tree::path;
use proptest::prelude::*;
use std::path::Path;

proptest! {
    #[test]
    fn wrapped_stems_are_hidden(stem in "[a-zA-Z0-9]{0,12}", ext in "[a-z]{1,4}") {
        let layout = LayoutConfig::default();
        let name = format!("__{}__.{}", stem, ext);
        prop_assert!(layout.is_hidden(Path::new(&name)));
        prop_assert_eq!(layout.name(Path::new(&name)), stem);
    }

    #[test]
    fn unwrapped_stems_are_visible(stem in "[a-zA-Z][a-zA-Z0-9_]{0,12}") {
        let layout = LayoutConfig::default();
        let name = format!("{}.json", stem);
        prop_assert!(!layout.is_hidden(Path::new(&name)));
    }

    #[test]
    fn extension_is_last_dotted_suffix(stem in "[a-z][a-z.]{0,8}", ext in "[a-z0-9]{1,5}") {
        let name = format!("{}.{}", stem, ext);
        let extension = format!(".{}", ext);
        prop_assert_eq!(path::extension(Path::new(&name)), Some(extension));
    }

    #[test]
    fn deleted_names_parse_back(base in "[a-z][a-z0-9_.]{0,10}", secs in 0i64..4_000_000_000) {
        let when = Utc.timestamp_opt(secs, 0).unwrap();
        let name = deleted_name(&base, when);
        let entry = TrashEntry::parse(Path::new(&name)).unwrap();
        prop_assert_eq!(entry.original, base);
        prop_assert_eq!(entry.deleted_at, when);
    }
}

//! Deep-merge properties

use openmeta::cascade::deep_merge;
use proptest::prelude::*;
use serde_json::{Map, Value};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| Value::from(n)),
        "[a-z]{0,6}".prop_map(Value::String),
    ]
}

fn mapping() -> impl Strategy<Value = Map<String, Value>> {
    let value = leaf().prop_recursive(3, 24, 4, |inner| {
        prop::collection::btree_map("[a-d]", inner, 0..4)
            .prop_map(|m| Value::Object(m.into_iter().collect()))
    });
    prop::collection::btree_map("[a-f]", value, 0..6).prop_map(|m| m.into_iter().collect())
}

proptest! {
    #[test]
    fn merging_into_empty_copies(incoming in mapping()) {
        let mut target = Map::new();
        deep_merge(&mut target, &incoming);
        prop_assert_eq!(target, incoming);
    }

    #[test]
    fn merging_with_self_is_identity(base in mapping()) {
        let mut target = base.clone();
        deep_merge(&mut target, &base);
        prop_assert_eq!(target, base);
    }

    #[test]
    fn incoming_leaves_always_win(base in mapping(), incoming in mapping()) {
        let mut target = base.clone();
        deep_merge(&mut target, &incoming);

        for (key, value) in &incoming {
            match (base.get(key), value) {
                (Some(Value::Object(_)), Value::Object(_)) => {
                    prop_assert!(target[key].is_object());
                }
                _ => prop_assert_eq!(&target[key], value),
            }
        }
        for key in base.keys() {
            prop_assert!(target.contains_key(key));
        }
    }
}

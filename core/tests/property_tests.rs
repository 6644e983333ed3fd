//! Property-based tests for the parameter store.
//!
//! These use proptest to check that snapshots survive a restore and that
//! writes one level below existing data always land.

use proptest::prelude::*;
use serde_json::{json, Value};

use paramstore_core::namespace::{KeyPath, Param, ParameterStore, Snapshot, Table};

/// Strategy for key names, dotted names included.
fn key_name() -> impl Strategy<Value = String> {
    "[a-z]{1,6}(\\.[a-z]{1,4})?"
}

/// Strategy for leaf JSON values.
fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        "[ -~]{0,12}".prop_map(Value::from),
        prop::collection::vec(any::<i16>(), 0..4).prop_map(|v| json!(v)),
    ]
}

/// Strategy for nested parameter tables, some entries carrying attributes.
fn table() -> impl Strategy<Value = Table> {
    let param = leaf()
        .prop_map(Param::from)
        .prop_recursive(3, 24, 4, |inner| {
            prop::collection::vec((key_name(), inner), 0..4)
                .prop_map(|entries| Param::from(entries.into_iter().collect::<Table>()))
        });
    let attributed = (param, prop::option::of(leaf())).prop_map(|(p, attr)| match attr {
        Some(a) => p.with_attr("note", a),
        None => p,
    });
    prop::collection::vec((key_name(), attributed), 0..6)
        .prop_map(|entries| entries.into_iter().collect::<Table>())
}

proptest! {
    #[test]
    fn snapshot_restore_round_trip(data in table()) {
        let mut store = ParameterStore::new();
        store.restore_all(data);
        let snap = store.snapshot();

        store.restore_all(Table::new());
        store.restore_all(snap.clone());
        prop_assert_eq!(store.snapshot(), snap);
    }

    #[test]
    fn snapshot_survives_json(data in table()) {
        let mut store = ParameterStore::new();
        store.restore_all(data);
        let snap = store.snapshot();

        let text = serde_json::to_string(&snap).unwrap();
        let back: Snapshot = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(snap, back);
    }

    #[test]
    fn set_then_get_returns_value(data in table(), name in key_name(), v in leaf()) {
        let mut store = ParameterStore::new();
        store.restore_all(data);
        let path = KeyPath::single(name.as_str());
        store.set(&path, Param::from(v.clone())).unwrap();

        let got = store.get(&path).unwrap().unwrap();
        prop_assert_eq!(got.as_scalar(), Some(&v));
    }
}

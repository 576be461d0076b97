//! Deltas between rendered instance trees

use cfgmeta_delta::{ConfigDelta, FlatConfig};
use cfgmeta_instance::{values, InstanceTree, ScalarValue, Values};
use cfgmeta_test_utils::sample_registry;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn station() -> InstanceTree {
    InstanceTree::create(
        Arc::new(sample_registry()),
        "BTS",
        values([("id", ScalarValue::from(1u32)), ("name", ScalarValue::from("north"))]),
    )
    .unwrap()
}

fn ru(id: u32, address: &str) -> Values {
    values([
        ("id", ScalarValue::from(id)),
        ("hwRevision", ScalarValue::from("A1")),
        ("ipv4Address", ScalarValue::from(address)),
    ])
}

#[test]
fn diff_of_two_trees() {
    let mut before = station();
    let root = before.root().id();
    let hwe = before.add_child(root, "HWE", "HWE", values([("id", 1u32)])).unwrap();
    before.add_child(hwe, "RU", "RU", ru(1, "10.0.0.1")).unwrap();

    let mut after = before.clone();
    let unit = after.find_by_id(&ScalarValue::from(1u32)).unwrap();
    // Root, HWE and RU all carry id 1; the root was committed first
    assert_eq!(unit, root);
    let unit = after.children(hwe, "RU").unwrap()[0].id();
    after.update_scalar(unit, "ipv4Address", "10.0.0.9").unwrap();
    after.add_child(root, "COMM", "COMM", Values::new()).unwrap();

    let delta = ConfigDelta::compare(&before.flatten(), &after.flatten());
    assert!(delta.deletions.is_empty());
    assert_eq!(delta.updates.len(), 1);
    assert_eq!(delta.updates[0].key, "BTS/HWE[0]/RU[0].ipv4Address");
    assert_eq!(delta.updates[0].from, json!("10.0.0.1"));
    assert_eq!(delta.updates[0].to, json!("10.0.0.9"));
    assert_eq!(delta.additions.len(), 1);
    assert_eq!(delta.additions[0].key, "BTS/COMM[0]");
    assert_eq!(delta.additions[0].value, json!("COMM"));

    assert_eq!(delta.apply_strict(&before.flatten()).unwrap(), after.flatten());
}

#[test]
fn removal_shows_up_as_deletions() {
    let mut tree = station();
    let root = tree.root().id();
    let before = tree.flatten();
    let comm = tree.add_child(root, "COMM", "COMM", Values::new()).unwrap();
    let with_comm = tree.flatten();
    tree.remove_child(root, "COMM", comm).unwrap();

    let delta = ConfigDelta::compare(&with_comm, &tree.flatten());
    assert_eq!(delta.deletions, vec!["BTS/COMM[0]".to_string()]);
    assert_eq!(delta.apply(&with_comm), before);
}

fn flat_config() -> impl Strategy<Value = FlatConfig> {
    prop::collection::btree_map(
        "[a-e]{1,2}",
        prop_oneof![
            any::<u32>().prop_map(|n| json!(n)),
            any::<bool>().prop_map(|b| json!(b)),
            "[a-z]{0,4}".prop_map(|s| json!(s)),
        ],
        0..12,
    )
}

proptest! {
    #[test]
    fn compare_then_apply_reaches_target(before in flat_config(), after in flat_config()) {
        let delta = ConfigDelta::compare(&before, &after);
        prop_assert_eq!(delta.apply(&before), after.clone());
        prop_assert_eq!(delta.apply_strict(&before).unwrap(), after);
    }

    #[test]
    fn compare_is_deterministic(before in flat_config(), after in flat_config()) {
        prop_assert_eq!(
            ConfigDelta::compare(&before, &after),
            ConfigDelta::compare(&before, &after)
        );
    }
}

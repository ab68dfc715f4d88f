use aurora_member_controller::controller::tags::{diff, merge, override_view, strip_reserved};
use proptest::prelude::*;

use crate::common::tag_map;

#[test]
fn merge_applies_defaults_under_overrides() {
    let defaults = tag_map(&[("env", "prod"), ("team", "storage")]);
    let overrides = tag_map(&[("env", "staging"), ("app", "ledger")]);

    let effective = merge(&defaults, &overrides);
    assert_eq!(
        effective,
        tag_map(&[("app", "ledger"), ("env", "staging"), ("team", "storage")])
    );
}

#[test]
fn override_view_subtracts_default_tier() {
    let defaults = tag_map(&[("env", "prod"), ("team", "storage")]);
    let overrides = tag_map(&[("env", "staging"), ("app", "ledger")]);
    let effective = merge(&defaults, &overrides);

    assert_eq!(override_view(&effective, &defaults), overrides);
}

#[test]
fn override_view_keeps_entries_with_differing_values() {
    let defaults = tag_map(&[("env", "prod")]);
    let effective = tag_map(&[("env", "staging")]);

    assert_eq!(override_view(&effective, &defaults), effective);
}

#[test]
fn diff_for_tag_replacement() {
    let old = tag_map(&[("owner", "alice"), ("env", "prod")]);
    let new = tag_map(&[("owner", "bob"), ("cost-center", "42")]);

    let patch = diff(&old, &new);
    assert_eq!(patch.remove, vec!["env".to_string()]);
    assert_eq!(patch.upsert, tag_map(&[("cost-center", "42"), ("owner", "bob")]));
}

#[test]
fn reserved_keys_never_survive_stripping() {
    let raw = tag_map(&[
        ("aws:cloudformation:stack-name", "s"),
        ("aws:autoscaling:group", "g"),
        ("env", "prod"),
    ]);
    assert_eq!(strip_reserved(&raw), tag_map(&[("env", "prod")]));
}

proptest! {
    /// overrideView(merge(D, O), D) == O for default and override tiers
    /// with disjoint key spaces.
    #[test]
    fn override_view_round_trips_merge(
        defaults in prop::collection::btree_map("d[a-z]{1,6}", "[a-z0-9]{0,6}", 0..8),
        overrides in prop::collection::btree_map("o[a-z]{1,6}", "[a-z0-9]{0,6}", 0..8),
    ) {
        let effective = merge(&defaults, &overrides);
        prop_assert_eq!(override_view(&effective, &defaults), overrides.clone());
        prop_assert_eq!(merge(&defaults, &override_view(&effective, &defaults)), effective);
    }
}

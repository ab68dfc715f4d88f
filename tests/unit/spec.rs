use aurora_member_controller::controller::spec::DEFAULT_IDENTIFIER_PREFIX;
use aurora_member_controller::{InstanceSpec, TagMap};

fn base_spec() -> InstanceSpec {
    InstanceSpec {
        cluster_identifier: "cluster-1".to_string(),
        instance_class: "db.r5.large".to_string(),
        ..InstanceSpec::default()
    }
}

#[test]
fn explicit_identifier_wins() {
    let spec = InstanceSpec {
        identifier: Some("db-main".to_string()),
        identifier_prefix: Some("ignored-".to_string()),
        ..base_spec()
    };
    assert_eq!(spec.resolve_identifier(), "db-main");
}

#[test]
fn generated_identifier_uses_declared_prefix() {
    let spec = InstanceSpec {
        identifier_prefix: Some("ledger-".to_string()),
        ..base_spec()
    };
    let id = spec.resolve_identifier();
    assert!(id.starts_with("ledger-"), "got: {id}");
    assert!(id.len() > "ledger-".len());
}

#[test]
fn generated_identifier_falls_back_to_default_prefix() {
    let spec = base_spec();
    let id = spec.resolve_identifier();
    assert!(id.starts_with(DEFAULT_IDENTIFIER_PREFIX), "got: {id}");
}

#[test]
fn generated_identifiers_are_unique() {
    let spec = base_spec();
    assert_ne!(spec.resolve_identifier(), spec.resolve_identifier());
}

#[test]
fn create_input_omits_absent_optionals() {
    let spec = base_spec();
    let input = spec.create_input("db-1", TagMap::new());

    assert_eq!(input.identifier, "db-1");
    assert_eq!(input.cluster_identifier, "cluster-1");
    assert_eq!(input.engine, "aurora");
    assert!(input.availability_zone.is_none());
    assert!(input.engine_version.is_none());
    assert!(input.monitoring_role_arn.is_none());
    assert!(input.performance_insights_enabled.is_none());
    assert!(input.preferred_backup_window.is_none());
    // Disabled monitoring is omitted so the remote default applies.
    assert!(input.monitoring_interval.is_none());
}

#[test]
fn create_input_carries_present_optionals() {
    let spec = InstanceSpec {
        availability_zone: Some("us-east-1a".to_string()),
        engine_version: Some("5.7".to_string()),
        monitoring_interval: 60,
        monitoring_role_arn: Some("arn:aws:iam::123:role/monitoring".to_string()),
        ..base_spec()
    };
    let input = spec.create_input("db-1", TagMap::new());

    assert_eq!(input.availability_zone.as_deref(), Some("us-east-1a"));
    assert_eq!(input.engine_version.as_deref(), Some("5.7"));
    assert_eq!(input.monitoring_interval, Some(60));
    assert_eq!(
        input.monitoring_role_arn.as_deref(),
        Some("arn:aws:iam::123:role/monitoring")
    );
}

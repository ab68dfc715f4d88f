//! Projection of remote truth back onto declared state
//!
//! After every lifecycle operation the controller reads the instance back
//! and projects the snapshot, the owning cluster's membership and the
//! remote tag set onto a full [`InstanceState`]. The projection also fills
//! derived fields the snapshot itself does not carry: the writer role and
//! the reconciled engine version.

use serde::{Deserialize, Serialize};

use crate::api::types::{ClusterMembership, InstanceSnapshot, TagMap};
use crate::controller::tags;

/// Declared state of a member instance after a read: every mutable field
/// plus the computed-only fields (`writer`, endpoint, ARN, encryption,
/// resource id), and the two-tier tag views.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceState {
    pub identifier: String,
    pub cluster_identifier: String,
    pub arn: String,
    pub dbi_resource_id: String,
    /// Whether this member currently holds the cluster writer role.
    /// Derived from cluster membership, not from the instance snapshot.
    pub writer: bool,
    pub endpoint: Option<String>,
    pub port: Option<i32>,
    pub engine: String,
    /// Declared engine version, kept when it is a prefix of the running
    /// version (minor-version drift is not surfaced as a change).
    pub engine_version: String,
    /// Version actually running on the instance.
    pub engine_version_actual: String,
    pub instance_class: String,
    pub availability_zone: Option<String>,
    pub db_subnet_group_name: Option<String>,
    pub db_parameter_group_name: Option<String>,
    pub kms_key_id: Option<String>,
    pub storage_encrypted: bool,
    pub publicly_accessible: bool,
    pub auto_minor_version_upgrade: bool,
    pub copy_tags_to_snapshot: bool,
    pub promotion_tier: i32,
    pub monitoring_interval: i32,
    pub monitoring_role_arn: Option<String>,
    pub performance_insights_enabled: Option<bool>,
    pub performance_insights_kms_key_id: Option<String>,
    pub performance_insights_retention_period: Option<i32>,
    pub preferred_backup_window: Option<String>,
    pub preferred_maintenance_window: Option<String>,
    pub ca_cert_identifier: Option<String>,
    /// Resource-specific overrides only (default tier subtracted).
    pub tags: TagMap,
    /// Full effective tag set, defaults merged with overrides.
    pub tags_all: TagMap,
}

/// Reconcile the declared engine version against the actually running one.
///
/// The declared value survives when it is a prefix of the actual version
/// (e.g. `5.7` vs `5.7.mysql_aurora.2.03.2`); otherwise the actual version
/// replaces it so real drift becomes visible.
pub fn reconcile_engine_version(configured: Option<&str>, actual: &str) -> String {
    match configured {
        Some(c) if !c.is_empty() && (c == actual || actual.starts_with(c)) => c.to_string(),
        _ => actual.to_string(),
    }
}

/// Project a snapshot plus its cluster membership and remote tags onto
/// declared state.
///
/// `effective_tags` must already have reserved keys stripped;
/// `default_tags` is the caller-wide default tier used to compute the
/// override-only view.
pub fn project(
    snapshot: &InstanceSnapshot,
    membership: &ClusterMembership,
    effective_tags: &TagMap,
    default_tags: &TagMap,
    configured_engine_version: Option<&str>,
) -> InstanceState {
    InstanceState {
        identifier: snapshot.identifier.clone(),
        cluster_identifier: snapshot.cluster_identifier.clone().unwrap_or_default(),
        arn: snapshot.arn.clone(),
        dbi_resource_id: snapshot.dbi_resource_id.clone(),
        writer: membership.is_writer(&snapshot.identifier),
        endpoint: snapshot.endpoint.as_ref().map(|e| e.address.clone()),
        port: snapshot.endpoint.as_ref().map(|e| e.port),
        engine: snapshot.engine.clone(),
        engine_version: reconcile_engine_version(
            configured_engine_version,
            &snapshot.engine_version,
        ),
        engine_version_actual: snapshot.engine_version.clone(),
        instance_class: snapshot.instance_class.clone(),
        availability_zone: snapshot.availability_zone.clone(),
        db_subnet_group_name: snapshot.db_subnet_group_name.clone(),
        db_parameter_group_name: snapshot.db_parameter_groups.first().cloned(),
        kms_key_id: snapshot.kms_key_id.clone(),
        storage_encrypted: snapshot.storage_encrypted,
        publicly_accessible: snapshot.publicly_accessible,
        auto_minor_version_upgrade: snapshot.auto_minor_version_upgrade,
        copy_tags_to_snapshot: snapshot.copy_tags_to_snapshot,
        promotion_tier: snapshot.promotion_tier,
        monitoring_interval: snapshot.monitoring_interval,
        monitoring_role_arn: snapshot.monitoring_role_arn.clone(),
        performance_insights_enabled: snapshot.performance_insights_enabled,
        performance_insights_kms_key_id: snapshot.performance_insights_kms_key_id.clone(),
        performance_insights_retention_period: snapshot.performance_insights_retention_period,
        preferred_backup_window: snapshot.preferred_backup_window.clone(),
        preferred_maintenance_window: snapshot.preferred_maintenance_window.clone(),
        ca_cert_identifier: snapshot.ca_cert_identifier.clone(),
        tags: tags::override_view(effective_tags, default_tags),
        tags_all: effective_tags.clone(),
    }
}

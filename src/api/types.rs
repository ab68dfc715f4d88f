//! Wire types for the remote control plane
//!
//! These mirror the shapes the DB control plane accepts and returns. Request
//! inputs carry `Option` for every field the caller may omit so the remote
//! side applies its own defaults; snapshots are read-only and produced fresh
//! on every describe.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tag key/value mapping. Ordering is irrelevant; a `BTreeMap` keeps
/// diffs and test assertions deterministic.
pub type TagMap = BTreeMap<String, String>;

/// Connection endpoint of a DB instance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub address: String,
    pub port: i32,
}

/// The control plane's current view of a DB instance.
///
/// Produced by `DescribeDBInstances`; never sent on write.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceSnapshot {
    pub identifier: String,
    pub arn: String,
    pub dbi_resource_id: String,
    pub status: String,
    /// Empty/absent for standalone instances, which must not be managed
    /// through this controller.
    pub cluster_identifier: Option<String>,
    pub endpoint: Option<Endpoint>,
    pub engine: String,
    pub engine_version: String,
    pub instance_class: String,
    pub availability_zone: Option<String>,
    pub db_subnet_group_name: Option<String>,
    /// Parameter groups in attachment order; the first one is the effective
    /// group projected into declared state.
    pub db_parameter_groups: Vec<String>,
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
}

/// One member of a DB cluster.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMember {
    pub identifier: String,
    pub is_writer: bool,
}

/// Membership list of the owning cluster, used to derive the writer role
/// of a member instance (the instance snapshot itself does not carry it).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMembership {
    pub members: Vec<ClusterMember>,
}

impl ClusterMembership {
    /// Whether the given member currently holds the writer role.
    pub fn is_writer(&self, identifier: &str) -> bool {
        self.members
            .iter()
            .find(|m| m.identifier == identifier)
            .map(|m| m.is_writer)
            .unwrap_or(false)
    }
}

/// Request payload for `CreateDBInstance`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateInstanceInput {
    pub identifier: String,
    pub cluster_identifier: String,
    pub instance_class: String,
    pub engine: String,
    pub publicly_accessible: bool,
    pub auto_minor_version_upgrade: bool,
    pub copy_tags_to_snapshot: bool,
    pub promotion_tier: i32,
    pub tags: TagMap,
    pub availability_zone: Option<String>,
    pub db_parameter_group_name: Option<String>,
    pub db_subnet_group_name: Option<String>,
    pub engine_version: Option<String>,
    pub monitoring_interval: Option<i32>,
    pub monitoring_role_arn: Option<String>,
    pub performance_insights_enabled: Option<bool>,
    pub performance_insights_kms_key_id: Option<String>,
    pub performance_insights_retention_period: Option<i32>,
    pub preferred_backup_window: Option<String>,
    pub preferred_maintenance_window: Option<String>,
}

/// Request payload for `ModifyDBInstance`.
///
/// Only the fields that actually changed are populated; absent fields are
/// left untouched by the control plane.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModifyInstanceInput {
    pub identifier: String,
    pub apply_immediately: bool,
    pub instance_class: Option<String>,
    pub db_parameter_group_name: Option<String>,
    pub monitoring_interval: Option<i32>,
    pub monitoring_role_arn: Option<String>,
    pub performance_insights_enabled: Option<bool>,
    pub performance_insights_kms_key_id: Option<String>,
    pub performance_insights_retention_period: Option<i32>,
    pub preferred_backup_window: Option<String>,
    pub preferred_maintenance_window: Option<String>,
    pub auto_minor_version_upgrade: Option<bool>,
    pub copy_tags_to_snapshot: Option<bool>,
    pub promotion_tier: Option<i32>,
    pub publicly_accessible: Option<bool>,
    pub ca_cert_identifier: Option<String>,
}

impl ModifyInstanceInput {
    /// Empty modification request for the given instance.
    pub fn new(identifier: &str, apply_immediately: bool) -> Self {
        Self {
            identifier: identifier.to_string(),
            apply_immediately,
            ..Self::default()
        }
    }
}

//! Declared desired state of a cluster member instance
//!
//! [`InstanceSpec`] is the normalized, already-validated intent supplied by
//! the configuration layer. Optional fields that are absent are omitted
//! from outgoing requests entirely so the control plane applies its own
//! defaults.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::types::{CreateInstanceInput, TagMap};

/// Engine used when the declaration does not name one.
pub const DEFAULT_ENGINE: &str = "aurora";

/// Identifier prefix used when neither an identifier nor a prefix is
/// declared.
pub const DEFAULT_IDENTIFIER_PREFIX: &str = "member-";

/// Desired configuration of one cluster member instance.
///
/// `identifier`/`identifier_prefix` and `cluster_identifier` are immutable
/// once the instance exists; every other field may change and is reconciled
/// through modify.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstanceSpec {
    /// Explicit instance identifier. Mutually exclusive with
    /// `identifier_prefix`; when both are absent one is generated.
    pub identifier: Option<String>,
    pub identifier_prefix: Option<String>,
    /// Owning cluster. Must reference an existing cluster.
    pub cluster_identifier: String,
    pub instance_class: String,
    pub engine: String,
    pub engine_version: Option<String>,
    pub availability_zone: Option<String>,
    pub db_subnet_group_name: Option<String>,
    pub db_parameter_group_name: Option<String>,
    pub publicly_accessible: bool,
    pub auto_minor_version_upgrade: bool,
    pub copy_tags_to_snapshot: bool,
    pub promotion_tier: i32,
    /// Enhanced monitoring granularity in seconds; 0 disables it.
    pub monitoring_interval: i32,
    pub monitoring_role_arn: Option<String>,
    pub performance_insights_enabled: Option<bool>,
    pub performance_insights_kms_key_id: Option<String>,
    pub performance_insights_retention_period: Option<i32>,
    pub preferred_backup_window: Option<String>,
    pub preferred_maintenance_window: Option<String>,
    pub ca_cert_identifier: Option<String>,
    /// Whether modifications take effect immediately or in the next
    /// maintenance window.
    pub apply_immediately: bool,
    /// Resource-specific tag overrides.
    pub tags: TagMap,
}

impl Default for InstanceSpec {
    fn default() -> Self {
        Self {
            identifier: None,
            identifier_prefix: None,
            cluster_identifier: String::new(),
            instance_class: String::new(),
            engine: DEFAULT_ENGINE.to_string(),
            engine_version: None,
            availability_zone: None,
            db_subnet_group_name: None,
            db_parameter_group_name: None,
            publicly_accessible: false,
            auto_minor_version_upgrade: true,
            copy_tags_to_snapshot: false,
            promotion_tier: 0,
            monitoring_interval: 0,
            monitoring_role_arn: None,
            performance_insights_enabled: None,
            performance_insights_kms_key_id: None,
            performance_insights_retention_period: None,
            preferred_backup_window: None,
            preferred_maintenance_window: None,
            ca_cert_identifier: None,
            apply_immediately: true,
            tags: TagMap::new(),
        }
    }
}

impl InstanceSpec {
    /// Resolve the instance identifier to use for create.
    ///
    /// An explicit identifier wins; otherwise one is generated from the
    /// declared prefix (or [`DEFAULT_IDENTIFIER_PREFIX`]). The resolved
    /// value is the instance's durable key for its entire lifecycle.
    pub fn resolve_identifier(&self) -> String {
        match &self.identifier {
            Some(id) => id.clone(),
            None => unique_identifier(
                self.identifier_prefix
                    .as_deref()
                    .unwrap_or(DEFAULT_IDENTIFIER_PREFIX),
            ),
        }
    }

    /// Build the create request, carrying only the fields that are present.
    ///
    /// `tags` is the already-merged effective tag set; `identifier` the
    /// value resolved via [`resolve_identifier`](Self::resolve_identifier).
    pub fn create_input(&self, identifier: &str, tags: TagMap) -> CreateInstanceInput {
        CreateInstanceInput {
            identifier: identifier.to_string(),
            cluster_identifier: self.cluster_identifier.clone(),
            instance_class: self.instance_class.clone(),
            engine: self.engine.clone(),
            publicly_accessible: self.publicly_accessible,
            auto_minor_version_upgrade: self.auto_minor_version_upgrade,
            copy_tags_to_snapshot: self.copy_tags_to_snapshot,
            promotion_tier: self.promotion_tier,
            tags,
            availability_zone: self.availability_zone.clone(),
            db_parameter_group_name: self.db_parameter_group_name.clone(),
            db_subnet_group_name: self.db_subnet_group_name.clone(),
            engine_version: self.engine_version.clone(),
            monitoring_interval: (self.monitoring_interval != 0).then_some(self.monitoring_interval),
            monitoring_role_arn: self.monitoring_role_arn.clone(),
            performance_insights_enabled: self.performance_insights_enabled,
            performance_insights_kms_key_id: self.performance_insights_kms_key_id.clone(),
            performance_insights_retention_period: self.performance_insights_retention_period,
            preferred_backup_window: self.preferred_backup_window.clone(),
            preferred_maintenance_window: self.preferred_maintenance_window.clone(),
        }
    }
}

/// Collision-resistant unique identifier with the given prefix.
fn unique_identifier(prefix: &str) -> String {
    format!("{prefix}{}", Uuid::new_v4().simple())
}

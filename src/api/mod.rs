//! Remote control-plane interface
//!
//! The controller talks to the DB control plane exclusively through the
//! [`RemoteApi`] trait. The real transport (signing, pagination, wire-level
//! retries) lives behind it; tests substitute a scripted in-memory
//! implementation.

pub mod types;

use async_trait::async_trait;
use thiserror::Error;

use self::types::{
    ClusterMembership, CreateInstanceInput, InstanceSnapshot, ModifyInstanceInput, TagMap,
};

/// Error code returned when a DB instance does not exist.
pub const ERR_CODE_INSTANCE_NOT_FOUND: &str = "DBInstanceNotFound";
/// Error code for operations rejected due to the instance's current state.
pub const ERR_CODE_INVALID_INSTANCE_STATE: &str = "InvalidDBInstanceState";
/// Error code for operations rejected due to the owning cluster's state.
pub const ERR_CODE_INVALID_CLUSTER_STATE: &str = "InvalidDBClusterStateFault";
/// Error code for rejected request parameters.
pub const ERR_CODE_INVALID_PARAMETER_VALUE: &str = "InvalidParameterValue";

/// Message fragment signalling IAM role propagation lag rather than a real
/// input error. The role exists but the identity system has not finished
/// propagating it.
pub const MSG_IAM_PROPAGATION: &str =
    "IAM role ARN value is invalid or does not include the required permissions";
/// Message fragment for the cluster-level delete ordering constraint.
pub const MSG_REPLICA_ORDERING: &str = "Delete the replica cluster before deleting";
/// Message fragment for a delete racing an in-flight delete.
pub const MSG_ALREADY_DELETING: &str = "is already being deleted";

/// An error returned by the control plane.
///
/// Classification is literal: either on the error code or on a documented
/// message substring, matching how the control plane itself signals these
/// conditions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn code_is(&self, code: &str) -> bool {
        self.code == code
    }

    pub fn message_contains(&self, needle: &str) -> bool {
        self.message.contains(needle)
    }

    /// The instance does not exist. Idempotent success on delete; fatal when
    /// it surfaces while waiting for a create or update to settle.
    pub fn is_instance_not_found(&self) -> bool {
        self.code_is(ERR_CODE_INSTANCE_NOT_FOUND)
    }

    /// A delete raced another delete already in flight.
    pub fn is_already_being_deleted(&self) -> bool {
        self.code_is(ERR_CODE_INVALID_INSTANCE_STATE) && self.message_contains(MSG_ALREADY_DELETING)
    }

    /// The cluster-level replica ordering constraint; resolves once sibling
    /// operations complete, so delete retries past it.
    pub fn is_replica_ordering_conflict(&self) -> bool {
        self.code_is(ERR_CODE_INVALID_CLUSTER_STATE) && self.message_contains(MSG_REPLICA_ORDERING)
    }

    /// IAM permission propagation lag. Retryable within a bounded window.
    pub fn is_permission_propagation(&self) -> bool {
        self.code_is(ERR_CODE_INVALID_PARAMETER_VALUE) && self.message_contains(MSG_IAM_PROPAGATION)
    }
}

/// Asynchronous control-plane operations for DB instances and their owning
/// clusters.
///
/// Create and modify return while the instance is still transitioning; the
/// caller is responsible for polling until the instance settles.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn create_instance(
        &self,
        input: &CreateInstanceInput,
    ) -> Result<InstanceSnapshot, ApiError>;

    async fn modify_instance(&self, input: &ModifyInstanceInput) -> Result<(), ApiError>;

    async fn reboot_instance(&self, identifier: &str) -> Result<(), ApiError>;

    async fn delete_instance(&self, identifier: &str) -> Result<(), ApiError>;

    /// `Ok(None)` means the instance does not exist.
    async fn describe_instance(
        &self,
        identifier: &str,
    ) -> Result<Option<InstanceSnapshot>, ApiError>;

    async fn describe_cluster(&self, cluster_identifier: &str)
        -> Result<ClusterMembership, ApiError>;

    async fn list_tags(&self, arn: &str) -> Result<TagMap, ApiError>;

    async fn update_tags(
        &self,
        arn: &str,
        remove: &[String],
        upsert: &TagMap,
    ) -> Result<(), ApiError>;
}

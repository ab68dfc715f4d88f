//! Lifecycle convergence for one cluster member instance
//!
//! [`ConvergenceDriver`] drives a single declared instance to matching
//! remote reality across create, read, update and delete. One driver
//! manages one instance with one lifecycle operation in flight at a time;
//! callers managing many instances run one driver per instance with no
//! shared mutable state.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::api::types::{ModifyInstanceInput, TagMap};
use crate::api::{ApiError, RemoteApi};
use crate::controller::error::{Error, Result};
use crate::controller::poll::{self, PollConfig, PENDING_STATES, STATUS_AVAILABLE};
use crate::controller::retry;
use crate::controller::spec::InstanceSpec;
use crate::controller::state::{self, InstanceState};
use crate::controller::tags;

/// Timeouts and caller-wide settings for a driver.
#[derive(Clone, Debug)]
pub struct DriverConfig {
    pub create_timeout: Duration,
    pub update_timeout: Duration,
    pub delete_timeout: Duration,
    /// Delay between status checks while waiting for the instance to settle.
    pub poll_interval: Duration,
    /// Delay before the first status check after starting a transition.
    pub poll_initial_delay: Duration,
    /// Caller-wide default tag tier, merged under resource-specific tags.
    pub default_tags: TagMap,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            create_timeout: Duration::from_secs(90 * 60),
            update_timeout: Duration::from_secs(90 * 60),
            delete_timeout: Duration::from_secs(90 * 60),
            poll_interval: Duration::from_secs(10),
            poll_initial_delay: Duration::from_secs(30),
            default_tags: TagMap::new(),
        }
    }
}

/// Outcome of reading a declared instance back from the control plane.
#[derive(Debug)]
pub enum ReadOutcome {
    /// The instance exists; its projected state.
    Found(Box<InstanceState>),
    /// The instance no longer exists remotely. Not an error: the caller
    /// removes it from declared state.
    Gone,
}

/// Secondary actions required right after create for configuration the
/// create call cannot apply atomically.
#[derive(Clone, Copy, Debug, Default)]
struct ConvergencePlan {
    needs_modify: bool,
    needs_reboot: bool,
}

impl ConvergencePlan {
    /// Compare desired against just-created values. Only the CA certificate
    /// identifier is known to need this secondary path; when it differs the
    /// follow-up modify must be chased with an explicit reboot.
    fn for_created(spec: &InstanceSpec, created_ca_cert: Option<&str>) -> Self {
        match spec.ca_cert_identifier.as_deref() {
            Some(desired) if Some(desired) != created_ca_cert => Self {
                needs_modify: true,
                needs_reboot: true,
            },
            _ => Self::default(),
        }
    }
}

/// The set of mutable fields that differ from last-read state, computed
/// once per update and branched on explicitly.
#[derive(Clone, Copy, Debug, Default)]
struct ChangeSet {
    instance_class: bool,
    db_parameter_group_name: bool,
    monitoring_interval: bool,
    monitoring_role_arn: bool,
    /// The three performance-insights fields travel together: when any one
    /// changes, all three are sent.
    performance_insights: bool,
    preferred_backup_window: bool,
    preferred_maintenance_window: bool,
    auto_minor_version_upgrade: bool,
    copy_tags_to_snapshot: bool,
    promotion_tier: bool,
    publicly_accessible: bool,
    ca_cert_identifier: bool,
}

/// An optional declared value differs only when it is actually declared;
/// an undeclared field keeps whatever the control plane reports.
fn declared_differs<T: PartialEq>(declared: &Option<T>, current: &Option<T>) -> bool {
    declared.is_some() && declared != current
}

impl ChangeSet {
    fn between(spec: &InstanceSpec, prior: &InstanceState) -> Self {
        Self {
            instance_class: spec.instance_class != prior.instance_class,
            db_parameter_group_name: declared_differs(
                &spec.db_parameter_group_name,
                &prior.db_parameter_group_name,
            ),
            monitoring_interval: spec.monitoring_interval != prior.monitoring_interval,
            monitoring_role_arn: declared_differs(
                &spec.monitoring_role_arn,
                &prior.monitoring_role_arn,
            ),
            performance_insights: declared_differs(
                &spec.performance_insights_enabled,
                &prior.performance_insights_enabled,
            ) || declared_differs(
                &spec.performance_insights_kms_key_id,
                &prior.performance_insights_kms_key_id,
            ) || declared_differs(
                &spec.performance_insights_retention_period,
                &prior.performance_insights_retention_period,
            ),
            preferred_backup_window: declared_differs(
                &spec.preferred_backup_window,
                &prior.preferred_backup_window,
            ),
            preferred_maintenance_window: declared_differs(
                &spec.preferred_maintenance_window,
                &prior.preferred_maintenance_window,
            ),
            auto_minor_version_upgrade: spec.auto_minor_version_upgrade
                != prior.auto_minor_version_upgrade,
            copy_tags_to_snapshot: spec.copy_tags_to_snapshot != prior.copy_tags_to_snapshot,
            promotion_tier: spec.promotion_tier != prior.promotion_tier,
            publicly_accessible: spec.publicly_accessible != prior.publicly_accessible,
            ca_cert_identifier: declared_differs(
                &spec.ca_cert_identifier,
                &prior.ca_cert_identifier,
            ),
        }
    }

    fn any(&self) -> bool {
        self.instance_class
            || self.db_parameter_group_name
            || self.monitoring_interval
            || self.monitoring_role_arn
            || self.performance_insights
            || self.preferred_backup_window
            || self.preferred_maintenance_window
            || self.auto_minor_version_upgrade
            || self.copy_tags_to_snapshot
            || self.promotion_tier
            || self.publicly_accessible
            || self.ca_cert_identifier
    }

    /// Build the modify request carrying exactly the changed fields.
    fn modify_input(&self, identifier: &str, spec: &InstanceSpec) -> ModifyInstanceInput {
        let mut input = ModifyInstanceInput::new(identifier, spec.apply_immediately);
        if self.instance_class {
            input.instance_class = Some(spec.instance_class.clone());
        }
        if self.db_parameter_group_name {
            input.db_parameter_group_name = spec.db_parameter_group_name.clone();
        }
        if self.monitoring_interval {
            input.monitoring_interval = Some(spec.monitoring_interval);
        }
        if self.monitoring_role_arn {
            input.monitoring_role_arn = spec.monitoring_role_arn.clone();
        }
        if self.performance_insights {
            input.performance_insights_enabled =
                Some(spec.performance_insights_enabled.unwrap_or(false));
            input.performance_insights_kms_key_id = spec.performance_insights_kms_key_id.clone();
            input.performance_insights_retention_period =
                spec.performance_insights_retention_period;
        }
        if self.preferred_backup_window {
            input.preferred_backup_window = spec.preferred_backup_window.clone();
        }
        if self.preferred_maintenance_window {
            input.preferred_maintenance_window = spec.preferred_maintenance_window.clone();
        }
        if self.auto_minor_version_upgrade {
            input.auto_minor_version_upgrade = Some(spec.auto_minor_version_upgrade);
        }
        if self.copy_tags_to_snapshot {
            input.copy_tags_to_snapshot = Some(spec.copy_tags_to_snapshot);
        }
        if self.promotion_tier {
            input.promotion_tier = Some(spec.promotion_tier);
        }
        if self.publicly_accessible {
            input.publicly_accessible = Some(spec.publicly_accessible);
        }
        if self.ca_cert_identifier {
            input.ca_cert_identifier = spec.ca_cert_identifier.clone();
        }
        input
    }
}

/// Drives one declared member instance to convergence with the control
/// plane.
pub struct ConvergenceDriver {
    api: Arc<dyn RemoteApi>,
    config: DriverConfig,
}

impl ConvergenceDriver {
    pub fn new(api: Arc<dyn RemoteApi>, config: DriverConfig) -> Self {
        Self { api, config }
    }

    fn poll_config(&self, timeout: Duration) -> PollConfig {
        PollConfig {
            timeout,
            interval: self.config.poll_interval,
            initial_delay: self.config.poll_initial_delay,
        }
    }

    /// The effective tag set to write: defaults merged under overrides,
    /// reserved keys stripped.
    fn effective_tags(&self, spec: &InstanceSpec) -> TagMap {
        tags::strip_reserved(&tags::merge(&self.config.default_tags, &spec.tags))
    }

    /// Create the instance and wait until it is fully converged.
    ///
    /// Issues the create call under the propagation retry, waits for
    /// `available`, then applies the secondary modify + reboot pass for
    /// configuration the create call cannot set atomically, and finishes
    /// with a full read. Any failure along the way aborts the create.
    #[instrument(skip(self, spec), fields(cluster = %spec.cluster_identifier))]
    pub async fn create(&self, spec: &InstanceSpec) -> Result<InstanceState> {
        let identifier = spec.resolve_identifier();
        let input = spec.create_input(&identifier, self.effective_tags(spec));

        info!(%identifier, "creating DB instance");
        let created = retry::retry_on_permission_propagation(|| self.api.create_instance(&input))
            .await
            .map_err(|e| Error::api("CreateDBInstance", &identifier, e))?;

        // The control plane's assigned identifier is the durable key.
        let identifier = created.identifier.clone();

        let snapshot = poll::wait_for_status(
            self.api.as_ref(),
            &identifier,
            STATUS_AVAILABLE,
            &PENDING_STATES,
            &self.poll_config(self.config.create_timeout),
        )
        .await?;

        let plan = ConvergencePlan::for_created(spec, snapshot.ca_cert_identifier.as_deref());

        if plan.needs_modify {
            let mut modify = ModifyInstanceInput::new(&identifier, true);
            modify.ca_cert_identifier = spec.ca_cert_identifier.clone();

            info!(%identifier, "created instance requires a follow-up modify");
            self.api
                .modify_instance(&modify)
                .await
                .map_err(|e| Error::api("ModifyDBInstance", &identifier, e))?;
            self.wait_available(&identifier, self.config.update_timeout)
                .await?;
        }

        if plan.needs_reboot {
            info!(%identifier, "created instance requires a reboot");
            self.api
                .reboot_instance(&identifier)
                .await
                .map_err(|e| Error::api("RebootDBInstance", &identifier, e))?;
            self.wait_available(&identifier, self.config.update_timeout)
                .await?;
        }

        match self.read_instance(&identifier, spec, true).await? {
            ReadOutcome::Found(state) => Ok(*state),
            ReadOutcome::Gone => Err(Error::NotFound { id: identifier }),
        }
    }

    /// Read the instance back and project remote truth onto declared state.
    ///
    /// A missing instance yields [`ReadOutcome::Gone`] so the caller can
    /// drop it from declared state; only a freshly created instance going
    /// missing is an error.
    #[instrument(skip(self, spec))]
    pub async fn read(&self, identifier: &str, spec: &InstanceSpec) -> Result<ReadOutcome> {
        self.read_instance(identifier, spec, false).await
    }

    async fn read_instance(
        &self,
        identifier: &str,
        spec: &InstanceSpec,
        new_resource: bool,
    ) -> Result<ReadOutcome> {
        let snapshot = match self
            .api
            .describe_instance(identifier)
            .await
            .map_err(|e| Error::api("DescribeDBInstances", identifier, e))?
        {
            Some(snapshot) => snapshot,
            None if new_resource => {
                return Err(Error::NotFound {
                    id: identifier.to_string(),
                })
            }
            None => {
                warn!(%identifier, "DB instance not found, removing from declared state");
                return Ok(ReadOutcome::Gone);
            }
        };

        // This controller only manages clustered members; a snapshot without
        // an owning cluster belongs to the standalone resource.
        let cluster_identifier = snapshot
            .cluster_identifier
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| Error::MissingClusterIdentifier {
                id: identifier.to_string(),
            })?;

        let membership = self
            .api
            .describe_cluster(cluster_identifier)
            .await
            .map_err(|e| Error::api("DescribeDBClusters", cluster_identifier, e))?;

        let remote_tags = self
            .api
            .list_tags(&snapshot.arn)
            .await
            .map_err(|e| Error::api("ListTagsForResource", identifier, e))?;
        let effective = tags::strip_reserved(&remote_tags);

        let state = state::project(
            &snapshot,
            &membership,
            &effective,
            &self.config.default_tags,
            spec.engine_version.as_deref(),
        );
        Ok(ReadOutcome::Found(Box::new(state)))
    }

    /// Reconcile mutable fields and tags against last-read state.
    ///
    /// Field changes go out as a single modify followed by a wait for
    /// `available`; when nothing but tags changed the modify is skipped
    /// entirely. Tag changes are applied independently through the
    /// dedicated tag call. Finishes with a full read.
    #[instrument(skip(self, spec, prior))]
    pub async fn update(
        &self,
        identifier: &str,
        spec: &InstanceSpec,
        prior: &InstanceState,
    ) -> Result<ReadOutcome> {
        let changes = ChangeSet::between(spec, prior);

        if changes.any() {
            let input = changes.modify_input(identifier, spec);
            info!(%identifier, "modifying DB instance");
            retry::retry_on_permission_propagation(|| self.api.modify_instance(&input))
                .await
                .map_err(|e| Error::api("ModifyDBInstance", identifier, e))?;
            self.wait_available(identifier, self.config.update_timeout)
                .await?;
        } else {
            debug!(%identifier, "no field changes, skipping modify");
        }

        let desired_all = self.effective_tags(spec);
        if desired_all != prior.tags_all {
            let patch = tags::diff(&prior.tags_all, &desired_all);
            info!(
                %identifier,
                removed = patch.remove.len(),
                upserted = patch.upsert.len(),
                "updating DB instance tags"
            );
            self.api
                .update_tags(&prior.arn, &patch.remove, &patch.upsert)
                .await
                .map_err(|e| Error::api("UpdateTags", identifier, e))?;
        }

        self.read_instance(identifier, spec, false).await
    }

    /// Delete the instance and wait until it is gone.
    ///
    /// Idempotent against an already-missing instance. The cluster-level
    /// replica ordering conflict is retried for the full delete timeout;
    /// a delete racing another in-flight delete just proceeds to wait.
    #[instrument(skip(self))]
    pub async fn delete(&self, identifier: &str) -> Result<()> {
        info!(%identifier, "deleting DB instance");
        let result = retry::retry_when(
            self.config.delete_timeout,
            || self.api.delete_instance(identifier),
            ApiError::is_replica_ordering_conflict,
        )
        .await;

        match result {
            Ok(()) => {}
            Err(e) if e.is_instance_not_found() => {
                debug!(%identifier, "DB instance already gone");
                return Ok(());
            }
            Err(e) if e.is_already_being_deleted() => {
                debug!(%identifier, "DB instance already being deleted, waiting");
            }
            Err(e) => return Err(Error::api("DeleteDBInstance", identifier, e)),
        }

        poll::wait_until_deleted(
            self.api.as_ref(),
            identifier,
            &self.poll_config(self.config.delete_timeout),
        )
        .await
    }

    async fn wait_available(&self, identifier: &str, timeout: Duration) -> Result<()> {
        poll::wait_for_status(
            self.api.as_ref(),
            identifier,
            STATUS_AVAILABLE,
            &PENDING_STATES,
            &self.poll_config(timeout),
        )
        .await?;
        Ok(())
    }
}

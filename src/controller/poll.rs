//! Status polling against the remote control plane
//!
//! Create, modify and reboot all return while the instance is still
//! transitioning. The poll loop here is the single suspension point that
//! waits for the instance to settle: sleep, describe, classify the observed
//! status, repeat until a terminal status or the deadline.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

use crate::api::RemoteApi;
use crate::api::types::InstanceSnapshot;
use crate::controller::error::{Error, Result};

/// Target status for create and update polls.
pub const STATUS_AVAILABLE: &str = "available";

/// Statuses that mean "operation in flight, not yet settled".
///
/// Shared immutable table; safe across concurrently running drivers. Any
/// observed status outside this set that is not the poll target is terminal
/// and fatal.
pub const PENDING_STATES: [&str; 13] = [
    "backing-up",
    "configuring-enhanced-monitoring",
    "configuring-iam-database-auth",
    "configuring-log-exports",
    "creating",
    "maintenance",
    "modifying",
    "rebooting",
    "renaming",
    "resetting-master-credentials",
    "starting",
    "storage-optimization",
    "upgrading",
];

/// Timing knobs for a poll loop.
#[derive(Clone, Debug)]
pub struct PollConfig {
    /// Overall deadline; exceeding it is fatal.
    pub timeout: Duration,
    /// Delay between status checks.
    pub interval: Duration,
    /// Delay before the first check. Remote transitions rarely complete
    /// instantly, so an immediate check is wasted.
    pub initial_delay: Duration,
}

impl PollConfig {
    /// Default cadence (10s interval, 30s initial delay) under the given
    /// overall timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            interval: Duration::from_secs(10),
            initial_delay: Duration::from_secs(30),
        }
    }
}

/// Block until the instance reaches `target`, tolerating statuses in
/// `pending` along the way.
///
/// Terminal outcomes:
/// - status == `target`: success, returns the final snapshot
/// - status outside `pending`: fatal ([`Error::UnexpectedStatus`])
/// - instance not found: fatal ([`Error::VanishedWhileWaiting`]) — on this
///   path the instance is expected to exist
/// - deadline exceeded: fatal ([`Error::PollTimeout`]) carrying the last
///   observed status
pub async fn wait_for_status(
    api: &dyn RemoteApi,
    identifier: &str,
    target: &str,
    pending: &[&str],
    config: &PollConfig,
) -> Result<InstanceSnapshot> {
    let deadline = Instant::now() + config.timeout;
    sleep(config.initial_delay).await;

    let mut last_status: Option<String> = None;
    loop {
        match api
            .describe_instance(identifier)
            .await
            .map_err(|e| Error::api("DescribeDBInstances", identifier, e))?
        {
            Some(snapshot) => {
                trace!(status = %snapshot.status, "observed instance status");
                if snapshot.status == target {
                    debug!(status = %snapshot.status, "instance settled");
                    return Ok(snapshot);
                }
                if !pending.contains(&snapshot.status.as_str()) {
                    return Err(Error::UnexpectedStatus {
                        id: identifier.to_string(),
                        status: snapshot.status,
                    });
                }
                last_status = Some(snapshot.status);
            }
            None => {
                return Err(Error::VanishedWhileWaiting {
                    id: identifier.to_string(),
                    target: target.to_string(),
                })
            }
        }

        if Instant::now() + config.interval >= deadline {
            return Err(Error::PollTimeout {
                id: identifier.to_string(),
                last_status,
            });
        }
        sleep(config.interval).await;
    }
}

/// Block until the instance no longer exists.
///
/// Not-found is the success terminal here; any observed status (usually
/// `deleting`) keeps the loop waiting. Exceeding the deadline is fatal.
pub async fn wait_until_deleted(
    api: &dyn RemoteApi,
    identifier: &str,
    config: &PollConfig,
) -> Result<()> {
    let deadline = Instant::now() + config.timeout;
    sleep(config.initial_delay).await;

    let mut last_status: Option<String> = None;
    loop {
        match api
            .describe_instance(identifier)
            .await
            .map_err(|e| Error::api("DescribeDBInstances", identifier, e))?
        {
            None => {
                debug!("instance no longer exists");
                return Ok(());
            }
            Some(snapshot) => {
                trace!(status = %snapshot.status, "instance still present");
                last_status = Some(snapshot.status);
            }
        }

        if Instant::now() + config.interval >= deadline {
            return Err(Error::PollTimeout {
                id: identifier.to_string(),
                last_status,
            });
        }
        sleep(config.interval).await;
    }
}

use std::sync::Arc;
use std::time::Duration;

use aurora_member_controller::{ApiError, ConvergenceDriver, DriverConfig, Error};

use crate::common::{snapshot_with_status, MockRemoteApi};

fn not_found() -> ApiError {
    ApiError::new("DBInstanceNotFound", "DBInstance db-1 not found")
}

fn ordering_conflict() -> ApiError {
    ApiError::new(
        "InvalidDBClusterStateFault",
        "Delete the replica cluster before deleting the source cluster",
    )
}

#[tokio::test(start_paused = true)]
async fn delete_of_missing_instance_is_idempotent_success() {
    let api = Arc::new(MockRemoteApi::new());
    api.push_delete(Err(not_found()));
    let driver = ConvergenceDriver::new(api.clone(), DriverConfig::default());

    driver.delete("db-1").await.unwrap();

    assert_eq!(api.call_count("DeleteDBInstance"), 1);
    // Nothing to wait for.
    assert_eq!(api.call_count("DescribeDBInstances"), 0);
}

#[tokio::test(start_paused = true)]
async fn ordering_conflict_is_retried_until_it_clears() {
    let api = Arc::new(MockRemoteApi::new());
    api.push_delete(Err(ordering_conflict()));
    api.push_delete(Err(ordering_conflict()));
    // Third attempt succeeds; the instance is then already gone.
    let driver = ConvergenceDriver::new(api.clone(), DriverConfig::default());

    driver.delete("db-1").await.unwrap();

    assert_eq!(api.call_count("DeleteDBInstance"), 3);
}

#[tokio::test(start_paused = true)]
async fn concurrent_delete_race_proceeds_to_wait() {
    let api = Arc::new(MockRemoteApi::new());
    api.push_delete(Err(ApiError::new(
        "InvalidDBInstanceState",
        "Instance db-1 is already being deleted",
    )));
    api.push_describe(Ok(Some(snapshot_with_status("db-1", "cluster-1", "deleting"))));
    // Steady state None: gone on the next check.
    let driver = ConvergenceDriver::new(api.clone(), DriverConfig::default());

    driver.delete("db-1").await.unwrap();

    assert_eq!(api.call_count("DeleteDBInstance"), 1);
    assert_eq!(api.call_count("DescribeDBInstances"), 2);
}

#[tokio::test(start_paused = true)]
async fn delete_times_out_if_instance_never_disappears() {
    let api = Arc::new(MockRemoteApi::new());
    api.set_steady_state(Some(snapshot_with_status("db-1", "cluster-1", "deleting")));

    let config = DriverConfig {
        delete_timeout: Duration::from_secs(60),
        ..DriverConfig::default()
    };
    let driver = ConvergenceDriver::new(api.clone(), config);

    let err = driver.delete("db-1").await.unwrap_err();
    assert!(matches!(err, Error::PollTimeout { .. }), "got: {err}");
}

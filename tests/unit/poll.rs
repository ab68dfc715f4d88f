use std::time::Duration;

use aurora_member_controller::controller::poll::{
    wait_for_status, wait_until_deleted, PollConfig,
};
use aurora_member_controller::{Error, PENDING_STATES, STATUS_AVAILABLE};

use crate::common::{available_snapshot, snapshot_with_status, MockRemoteApi};

fn config() -> PollConfig {
    PollConfig::with_timeout(Duration::from_secs(600))
}

#[tokio::test(start_paused = true)]
async fn waits_through_pending_statuses_until_target() {
    let api = MockRemoteApi::new();
    api.push_describe(Ok(Some(snapshot_with_status("db-1", "cluster-1", "creating"))));
    api.push_describe(Ok(Some(snapshot_with_status("db-1", "cluster-1", "creating"))));
    api.push_describe(Ok(Some(snapshot_with_status("db-1", "cluster-1", "backing-up"))));
    api.set_steady_state(Some(available_snapshot("db-1", "cluster-1")));

    let snapshot = wait_for_status(&api, "db-1", STATUS_AVAILABLE, &PENDING_STATES, &config())
        .await
        .unwrap();

    assert_eq!(snapshot.status, "available");
    // Success exactly at the fourth observation, not earlier.
    assert_eq!(api.call_count("DescribeDBInstances"), 4);
}

#[tokio::test(start_paused = true)]
async fn unexpected_status_is_terminal() {
    let api = MockRemoteApi::new();
    api.set_steady_state(Some(snapshot_with_status("db-1", "cluster-1", "failed")));

    let err = wait_for_status(&api, "db-1", STATUS_AVAILABLE, &PENDING_STATES, &config())
        .await
        .unwrap_err();

    assert!(
        matches!(&err, Error::UnexpectedStatus { status, .. } if status == "failed"),
        "got: {err}"
    );
    assert_eq!(api.call_count("DescribeDBInstances"), 1);
}

#[tokio::test(start_paused = true)]
async fn vanishing_instance_fails_the_wait() {
    let api = MockRemoteApi::new();
    api.push_describe(Ok(Some(snapshot_with_status("db-1", "cluster-1", "creating"))));
    // Steady state stays None: the instance disappeared mid-transition.

    let err = wait_for_status(&api, "db-1", STATUS_AVAILABLE, &PENDING_STATES, &config())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::VanishedWhileWaiting { .. }), "got: {err}");
}

#[tokio::test(start_paused = true)]
async fn timeout_carries_the_last_observed_status() {
    let api = MockRemoteApi::new();
    api.set_steady_state(Some(snapshot_with_status("db-1", "cluster-1", "creating")));

    let err = wait_for_status(
        &api,
        "db-1",
        STATUS_AVAILABLE,
        &PENDING_STATES,
        &PollConfig::with_timeout(Duration::from_secs(60)),
    )
    .await
    .unwrap_err();

    assert!(
        matches!(&err, Error::PollTimeout { last_status: Some(s), .. } if s == "creating"),
        "got: {err}"
    );
}

#[tokio::test(start_paused = true)]
async fn deletion_wait_succeeds_once_instance_is_gone() {
    let api = MockRemoteApi::new();
    api.push_describe(Ok(Some(snapshot_with_status("db-1", "cluster-1", "deleting"))));
    api.push_describe(Ok(Some(snapshot_with_status("db-1", "cluster-1", "deleting"))));
    // Steady state None: deleted.

    wait_until_deleted(&api, "db-1", &config()).await.unwrap();
    assert_eq!(api.call_count("DescribeDBInstances"), 3);
}

#[tokio::test(start_paused = true)]
async fn deletion_wait_times_out_if_instance_never_disappears() {
    let api = MockRemoteApi::new();
    api.set_steady_state(Some(snapshot_with_status("db-1", "cluster-1", "deleting")));

    let err = wait_until_deleted(
        &api,
        "db-1",
        &PollConfig::with_timeout(Duration::from_secs(60)),
    )
    .await
    .unwrap_err();

    assert!(
        matches!(&err, Error::PollTimeout { last_status: Some(s), .. } if s == "deleting"),
        "got: {err}"
    );
}

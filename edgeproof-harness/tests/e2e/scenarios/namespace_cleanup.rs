//! The test namespace is removed before setup and after the run.

use std::time::Duration;

use edgeproof_harness::{HarnessError, HarnessPhase};

use crate::helpers::*;

#[tokio::test(start_paused = true)]
async fn leftover_namespace_is_pre_cleaned_then_recreated() {
    let cluster = MockCluster::new().with_existing_namespace("yurt-e2e-test");
    let mut harness = Harness::new(cluster, MockDocker::new(), healthy_executor());

    harness.run().await.expect("run should get past setup");

    let calls = harness.cluster.calls();
    assert_eq!(calls[0], "delete yurt-e2e-test");
    assert_eq!(calls[1], "create yurt-e2e-test");
    assert_eq!(calls.last().map(String::as_str), Some("delete yurt-e2e-test"));
    assert!(!harness.cluster.has_namespace("yurt-e2e-test"));
}

#[tokio::test(start_paused = true)]
async fn post_clean_runs_after_a_scenario_panic() {
    let executor = healthy_executor().panicking_on("systemctl restart kubelet");
    let mut harness = Harness::new(MockCluster::new(), MockDocker::new(), executor);

    let report = harness.run().await.expect("run should get past setup");

    assert_eq!(report.failed_scenarios(), vec!["kubelet"]);
    assert_eq!(harness.cluster.count("delete"), 2);
    assert!(!harness.cluster.has_namespace("yurt-e2e-test"));
}

#[tokio::test(start_paused = true)]
async fn terminating_namespace_is_waited_for() {
    let cluster = MockCluster::new().terminating_for(3);
    let mut harness = Harness::new(cluster, MockDocker::new(), healthy_executor());

    let start = tokio::time::Instant::now();
    let report = harness.run().await.expect("run should get past setup");

    assert_eq!(report.phase, HarnessPhase::CleanedUp);
    // three 1s checks before the pre-clean saw the namespace gone
    assert!(start.elapsed() >= Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn namespace_stuck_terminating_fails_setup() {
    let cluster = MockCluster::new().terminating_for(1_000);
    let mut harness = Harness::new(cluster, MockDocker::new(), healthy_executor());

    let err = harness.run().await.unwrap_err();

    assert!(matches!(err, HarnessError::Setup(_)));
    assert!(err.to_string().contains("pre-clean"));
    assert_eq!(harness.cluster.count("create"), 0);
    assert!(harness.docker.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn refused_namespace_delete_fails_pre_clean() {
    let cluster = MockCluster::new().failing_delete();
    let mut harness = Harness::new(cluster, MockDocker::new(), healthy_executor());

    let err = harness.run().await.unwrap_err();

    assert!(err.to_string().contains("pre-clean failed"));
    assert_eq!(harness.cluster.count("create"), 0);
}

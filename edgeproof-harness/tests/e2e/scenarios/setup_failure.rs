//! Setup failures abort before any destructive action and still clean up.

use edgeproof_harness::{HarnessError, HarnessPhase};

use crate::helpers::*;

#[tokio::test(start_paused = true)]
async fn unresolved_pod_ip_aborts_before_partition() {
    let mut harness = Harness::new(
        MockCluster::new().without_pod_ip(),
        MockDocker::new(),
        healthy_executor(),
    );

    let err = harness.run().await.unwrap_err();

    assert!(matches!(err, HarnessError::Setup(_)));
    assert!(err.to_string().contains("nginx pod ip"));
    assert_eq!(err.exit_code(), 3);
    assert!(harness.docker.calls().is_empty(), "no partition operation expected");
    assert!(harness.executor.calls().is_empty(), "no scenario command expected");
    // pre-clean and post-clean
    assert_eq!(harness.cluster.count("delete"), 2);
    assert!(!harness.cluster.has_namespace("yurt-e2e-test"));
    assert_eq!(harness.orchestrator.phase(), HarnessPhase::Init);
}

#[tokio::test(start_paused = true)]
async fn dns_pod_outside_edge_nodes_aborts_setup() {
    let mut harness = Harness::new(
        MockCluster::new().with_dns_nodes(&["openyurt-e2e-test-control-plane"]),
        MockDocker::new(),
        healthy_executor(),
    );

    let err = harness.run().await.unwrap_err();

    assert!(err.to_string().contains("node hosting a dns pod"));
    assert!(harness.docker.calls().is_empty());
    assert!(!harness.cluster.has_namespace("yurt-e2e-test"));
}

#[tokio::test(start_paused = true)]
async fn dns_pod_on_first_edge_node_is_accepted() {
    let mut harness = Harness::new(
        MockCluster::new().with_dns_nodes(&["openyurt-e2e-test-worker"]),
        MockDocker::new(),
        healthy_executor(),
    );

    let report = harness.run().await.expect("run should get past setup");

    assert_eq!(report.fixtures.dns_node, "openyurt-e2e-test-worker");
}

#[tokio::test(start_paused = true)]
async fn failed_partition_reconnects_and_runs_no_scenario() {
    // 1 + 2 retries all fail
    let mut harness = Harness::new(
        MockCluster::new(),
        MockDocker::new().failing_disconnect(3),
        healthy_executor(),
    );

    let err = harness.run().await.unwrap_err();

    assert!(matches!(err, HarnessError::Setup(_)));
    assert!(err.to_string().contains("partition"));
    assert_eq!(harness.docker.count("disconnect"), 3);
    assert_eq!(harness.docker.count("connect"), 1);
    assert!(harness.executor.calls().is_empty());
    assert!(!harness.cluster.has_namespace("yurt-e2e-test"));
    assert_eq!(harness.orchestrator.phase(), HarnessPhase::FixturesResolved);
}

#[tokio::test(start_paused = true)]
async fn unreachable_docker_fails_before_touching_the_cluster() {
    let mut harness = Harness::new(
        MockCluster::new(),
        MockDocker::new().unreachable(),
        healthy_executor(),
    );

    let err = harness.run().await.unwrap_err();

    assert!(err.to_string().contains("docker unreachable"));
    assert!(harness.cluster.calls().is_empty());
}

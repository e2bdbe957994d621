//! The partition is established once and reversed exactly once.

use std::time::Duration;

use edgeproof_core::types::ExecOutput;
use edgeproof_harness::HarnessPhase;

use crate::helpers::*;

const DISCONNECT: &str = "disconnect kind openyurt-e2e-test-control-plane";
const CONNECT: &str = "connect kind openyurt-e2e-test-control-plane";

#[tokio::test(start_paused = true)]
async fn healthy_run_brackets_scenarios_with_one_partition() {
    let mut harness = Harness::new(MockCluster::new(), MockDocker::new(), healthy_executor());

    let report = harness.run().await.expect("run should get past setup");

    assert!(report.passed(), "unexpected failures: {:?}", report.failed_scenarios());
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.phase, HarnessPhase::CleanedUp);
    assert_eq!(harness.orchestrator.phase(), HarnessPhase::CleanedUp);
    assert_eq!(harness.docker.calls(), vec![DISCONNECT.to_owned(), CONNECT.to_owned()]);
    assert_eq!(report.scenarios.len(), 5);
}

#[tokio::test(start_paused = true)]
async fn reconnect_happens_once_when_every_scenario_fails() {
    let executor = healthy_executor()
        .failing("10248/healthz")
        .failing("curl -s 10.244.2.7")
        .failing("10267/v1/healthz")
        .failing("curl -s 10.0.0.5");
    let mut harness = Harness::new(MockCluster::new(), MockDocker::new(), executor);

    let report = harness.run().await.expect("run should get past setup");

    assert_eq!(
        report.failed_scenarios(),
        vec!["kubelet", "flannel", "yurthub", "kube-proxy"]
    );
    assert_eq!(report.exit_code(), 1);
    assert_eq!(harness.docker.count("disconnect"), 1);
    assert_eq!(harness.docker.count("connect"), 1);
    assert_eq!(report.phase, HarnessPhase::CleanedUp);
}

#[tokio::test(start_paused = true)]
async fn reconnect_happens_once_after_a_scenario_panic() {
    let executor = healthy_executor().panicking_on("iptables -F");
    let mut harness = Harness::new(MockCluster::new(), MockDocker::new(), executor);

    let report = harness.run().await.expect("run should get past setup");

    assert_eq!(report.failed_scenarios(), vec!["kube-proxy"]);
    assert_eq!(harness.docker.count("connect"), 1);
    assert_eq!(report.phase, HarnessPhase::CleanedUp);
}

#[tokio::test(start_paused = true)]
async fn failed_reconnect_is_a_teardown_error() {
    // every reconnect attempt fails: 1 + 2 retries
    let docker = MockDocker::new().failing_connect(3);
    let mut harness = Harness::new(MockCluster::new(), docker, healthy_executor());

    let report = harness.run().await.expect("run should get past setup");

    assert_eq!(report.teardown_errors.len(), 1);
    assert!(report.teardown_errors[0].contains("reconnect failed"));
    assert_eq!(report.exit_code(), 4);
    assert!(!report.passed());
    assert_eq!(harness.docker.count("connect"), 3);
    // cleanup still ran
    assert!(!harness.cluster.has_namespace("yurt-e2e-test"));
    assert_eq!(report.phase, HarnessPhase::ScenariosRunning);
}

#[tokio::test(start_paused = true)]
async fn transient_reconnect_failure_is_retried() {
    let docker = MockDocker::new().failing_connect(1);
    let mut harness = Harness::new(MockCluster::new(), docker, healthy_executor());

    let report = harness.run().await.expect("run should get past setup");

    assert!(report.teardown_errors.is_empty());
    assert_eq!(harness.docker.count("connect"), 2);
    assert_eq!(report.phase, HarnessPhase::CleanedUp);
}

#[tokio::test(start_paused = true)]
async fn aborted_run_reconnects_in_background() {
    // kubelet healthz never answers, so the run is still inside a scenario at 3s
    let executor = ScriptedExecutor::new().on("10248/healthz", vec![ExecOutput::failure("")]);
    let harness = Harness::new(MockCluster::new(), MockDocker::new(), executor);
    let docker = std::sync::Arc::clone(&harness.docker);

    let task = tokio::spawn(async move {
        let mut harness = harness;
        harness.run().await
    });
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(docker.count("disconnect"), 1);
    assert_eq!(docker.count("connect"), 0);

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(docker.count("connect"), 1);
}

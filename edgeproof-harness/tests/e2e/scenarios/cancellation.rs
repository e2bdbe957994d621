//! Cancellation stops scheduling; the in-flight scenario and teardown finish,
//! and the run is never reported as passed.

use std::time::Duration;

use edgeproof_core::types::ExecOutput;
use edgeproof_harness::HarnessPhase;
use edgeproof_harness::error::EXIT_CANCELLED;
use edgeproof_scenarios::ScenarioOutcome;

use crate::helpers::*;

#[tokio::test(start_paused = true)]
async fn cancel_mid_scenario_skips_the_rest() {
    // kubelet healthz answers on the third attempt, at 2s
    let executor = ScriptedExecutor::new()
        .on(
            "10248/healthz",
            vec![
                ExecOutput::failure(""),
                ExecOutput::failure(""),
                ExecOutput::success("ok"),
            ],
        )
        .ok("127.0.0.1:80", "<h1>Welcome to nginx!</h1>");
    let mut harness = Harness::new(MockCluster::new(), MockDocker::new(), executor);
    let token = harness.orchestrator.cancellation_token();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        token.cancel();
    });
    let report = harness.run().await.expect("run should get past setup");

    assert_eq!(report.scenarios[0].outcome, ScenarioOutcome::Passed);
    for scenario in &report.scenarios[1..] {
        match &scenario.outcome {
            ScenarioOutcome::Skipped { reason } => assert!(reason.contains("cancelled")),
            other => panic!("{}: unexpected outcome {other:?}", scenario.name),
        }
    }
    assert!(report.cancelled);
    assert!(!report.passed());
    assert_eq!(report.exit_code(), EXIT_CANCELLED);
    assert_eq!(harness.docker.count("connect"), 1);
    assert!(!harness.cluster.has_namespace("yurt-e2e-test"));
}

#[tokio::test(start_paused = true)]
async fn cancel_before_partition_leaves_cloud_node_connected() {
    let mut harness = Harness::new(MockCluster::new(), MockDocker::new(), healthy_executor());
    harness.orchestrator.cancellation_token().cancel();

    let report = harness.run().await.expect("run should get past setup");

    assert!(
        report
            .scenarios
            .iter()
            .all(|s| matches!(s.outcome, ScenarioOutcome::Skipped { .. }))
    );
    assert_eq!(report.scenarios.len(), 5);
    assert!(report.cancelled);
    assert!(!report.passed());
    assert_eq!(report.exit_code(), EXIT_CANCELLED);
    assert_eq!(report.phase, HarnessPhase::CleanedUp);
    assert!(harness.executor.calls().is_empty());
    assert!(harness.docker.calls().is_empty());
    assert!(!harness.cluster.has_namespace("yurt-e2e-test"));
}

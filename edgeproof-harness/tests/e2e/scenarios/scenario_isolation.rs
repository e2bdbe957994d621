//! A failing or panicking scenario never stops its siblings.

use std::time::Duration;

use edgeproof_core::types::ExecOutput;
use edgeproof_scenarios::ScenarioOutcome;

use crate::helpers::*;

#[tokio::test(start_paused = true)]
async fn flannel_failure_is_isolated() {
    let executor = healthy_executor().failing("curl -s 10.244.2.7");
    let mut harness = Harness::new(MockCluster::new(), MockDocker::new(), executor);

    let report = harness.run().await.expect("run should get past setup");

    let outcomes: Vec<(&str, &ScenarioOutcome)> = report
        .scenarios
        .iter()
        .map(|s| (s.name.as_str(), &s.outcome))
        .collect();
    assert_eq!(outcomes[0], ("kubelet", &ScenarioOutcome::Passed));
    match outcomes[1] {
        ("flannel", ScenarioOutcome::Failed { reason, .. }) => {
            assert_eq!(reason, "cross-node pod reachability not restored");
        }
        other => panic!("unexpected flannel outcome: {other:?}"),
    }
    assert_eq!(report.scenarios[1].elapsed(), Duration::from_secs(10));
    assert_eq!(outcomes[2], ("yurthub", &ScenarioOutcome::Passed));
    assert_eq!(outcomes[3], ("kube-proxy", &ScenarioOutcome::Passed));
    assert!(matches!(outcomes[4], ("coredns", ScenarioOutcome::Skipped { .. })));
}

#[tokio::test(start_paused = true)]
async fn panic_is_reported_as_failure_and_siblings_run() {
    let executor = healthy_executor().panicking_on("systemctl restart kubelet");
    let mut harness = Harness::new(MockCluster::new(), MockDocker::new(), executor);

    let report = harness.run().await.expect("run should get past setup");

    match &report.scenarios[0].outcome {
        ScenarioOutcome::Failed { reason, .. } => {
            assert!(reason.starts_with("scenario panicked: "), "{reason}");
            assert!(reason.contains("systemctl restart kubelet"));
        }
        other => panic!("unexpected kubelet outcome: {other:?}"),
    }
    for scenario in &report.scenarios[1..4] {
        assert_eq!(scenario.outcome, ScenarioOutcome::Passed, "{}", scenario.name);
    }
}

#[tokio::test(start_paused = true)]
async fn kube_proxy_recovers_on_fourth_poll() {
    let mut outputs = vec![ExecOutput::failure("curl: (7) Failed to connect"); 3];
    outputs.push(ExecOutput::success("Welcome to nginx!"));
    let executor = ScriptedExecutor::new()
        .ok("crictl ps", CRICTL_PS)
        .on("curl -s 10.0.0.5", outputs);
    let scenarios = vec![edgeproof_scenarios::suite::kube_proxy::scenario(&test_config())];
    let mut harness =
        Harness::with_scenarios(MockCluster::new(), MockDocker::new(), executor, scenarios);

    let report = harness.run().await.expect("run should get past setup");

    assert!(report.passed());
    let proxy = &report.scenarios[0];
    assert_eq!(proxy.steps_completed, 4);
    assert!(proxy.elapsed() >= Duration::from_secs(3));
    assert!(proxy.elapsed() <= Duration::from_secs(4));
    assert!(
        harness
            .executor
            .calls()
            .contains(&"openyurt-e2e-test-worker: crictl stop 0123456789abc".to_owned())
    );
}

#[tokio::test(start_paused = true)]
async fn coredns_runs_when_unsupported_scenarios_are_enabled() {
    let mut config = test_config();
    config.scenarios.run_unsupported = true;
    let executor = ScriptedExecutor::new()
        .ok("crictl ps", "CONTAINER      NAME\n5e5e5e5e5e5e5  coredns\n")
        .ok("dig @10.96.0.10", "status: NOERROR");
    let scenarios = vec![edgeproof_scenarios::suite::coredns::scenario(&config)];
    let mut harness = Harness::build(
        config,
        MockCluster::new(),
        MockDocker::new(),
        executor,
        Some(scenarios),
    );

    let report = harness.run().await.expect("run should get past setup");

    assert_eq!(report.scenarios[0].outcome, ScenarioOutcome::Passed);
    let calls = harness.executor.calls();
    assert!(calls.contains(&"openyurt-e2e-test-worker2: crictl stop 5e5e5e5e5e5e5".to_owned()));
    assert_eq!(harness.executor.count("dig @10.96.0.10"), 1);
}

#[tokio::test(start_paused = true)]
async fn coredns_is_skipped_by_default() {
    let executor = ScriptedExecutor::new();
    let scenarios = vec![edgeproof_scenarios::suite::coredns::scenario(&test_config())];
    let mut harness =
        Harness::with_scenarios(MockCluster::new(), MockDocker::new(), executor, scenarios);

    let report = harness.run().await.expect("run should get past setup");

    assert!(matches!(
        report.scenarios[0].outcome,
        ScenarioOutcome::Skipped { .. }
    ));
    assert!(harness.executor.calls().is_empty());
}

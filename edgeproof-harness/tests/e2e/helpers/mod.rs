//! Shared E2E test helpers.

pub mod mock_cluster;
pub mod mock_docker;
pub mod scripted;

use std::sync::Arc;
use std::time::Duration;

use edgeproof_core::config::EdgeproofConfig;
use edgeproof_harness::{HarnessError, Orchestrator, RunReport};
use edgeproof_scenarios::Scenario;

pub use mock_cluster::MockCluster;
pub use mock_docker::MockDocker;
pub use scripted::ScriptedExecutor;

/// `crictl ps` output with every container the suite discovers.
#[allow(dead_code)]
pub const CRICTL_PS: &str = "\
CONTAINER      IMAGE   CREATED  STATE    NAME                 ATTEMPT  POD ID   POD
3f1c2a9b8e7d4  img     1m       Running  kube-flannel         0        aaa      kube-flannel-ds-x
77aa88bb99cc0  img     1m       Running  yurt-hub             0        bbb      yurt-hub-worker
0123456789abc  img     1m       Running  kube-proxy           0        ccc      kube-proxy-x
abcdef0123456  img     1m       Running  yurt-e2e-test-nginx  0        ddd      yurt-e2e-test-nginx-worker
";

/// Config with short setup timeouts so failing setup paths finish quickly.
pub fn test_config() -> EdgeproofConfig {
    let mut config = EdgeproofConfig::default();
    config.poll.default_timeout_secs = 5;
    config.poll.default_interval_ms = 500;
    config.cluster.namespace_timeout_secs = 5;
    config
}

/// Executor where every supported scenario passes on the first attempt.
#[allow(dead_code)]
pub fn healthy_executor() -> ScriptedExecutor {
    ScriptedExecutor::new()
        .ok("crictl ps", CRICTL_PS)
        .ok("10248/healthz", "ok")
        .ok("127.0.0.1:80", "<h1>Welcome to nginx!</h1>")
        .ok("curl -s 10.244.2.7", "Welcome to nginx!")
        .ok("10267/v1/healthz", "OK")
        .ok("curl -s 10.0.0.5", "Welcome to nginx!")
}

/// Everything the tests inspect after a run.
pub struct Harness {
    pub cluster: Arc<MockCluster>,
    pub docker: Arc<MockDocker>,
    pub executor: Arc<ScriptedExecutor>,
    pub orchestrator: Orchestrator<MockCluster, MockDocker, ScriptedExecutor>,
}

impl Harness {
    pub fn new(cluster: MockCluster, docker: MockDocker, executor: ScriptedExecutor) -> Self {
        Self::build(test_config(), cluster, docker, executor, None)
    }

    #[allow(dead_code)]
    pub fn with_scenarios(
        cluster: MockCluster,
        docker: MockDocker,
        executor: ScriptedExecutor,
        scenarios: Vec<Scenario>,
    ) -> Self {
        Self::build(test_config(), cluster, docker, executor, Some(scenarios))
    }

    pub fn build(
        config: EdgeproofConfig,
        cluster: MockCluster,
        docker: MockDocker,
        executor: ScriptedExecutor,
        scenarios: Option<Vec<Scenario>>,
    ) -> Self {
        let cluster = Arc::new(cluster);
        let docker = Arc::new(docker);
        let executor = Arc::new(executor);

        let mut builder = Orchestrator::builder()
            .config(config)
            .cluster(Arc::clone(&cluster))
            .docker(Arc::clone(&docker))
            .executor(Arc::clone(&executor))
            .partition_retry(Duration::from_secs(5), 2, Duration::from_millis(100));
        if let Some(scenarios) = scenarios {
            builder = builder.scenarios(scenarios);
        }
        let orchestrator = builder.build().expect("test config should be valid");

        Self {
            cluster,
            docker,
            executor,
            orchestrator,
        }
    }

    pub async fn run(&mut self) -> Result<RunReport, HarnessError> {
        self.orchestrator.run().await
    }
}

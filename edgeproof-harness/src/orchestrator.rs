//! Harness orchestration -- setup, partition bracketing, scenario execution and teardown.
//!
//! The [`Orchestrator`] drives one run through a fixed sequence of phases:
//!
//! ```text
//! Init ──▶ FixturesResolved ──▶ Partitioned ──▶ ScenariosRunning ──▶ Reconnected ──▶ CleanedUp
//!  │            │                   │
//!  └─ setup error (namespace, fixtures, partition): clean up, no scenario runs
//! ```
//!
//! # Guarantees
//!
//! - Fixtures are resolved before the cloud node is disconnected.
//! - The partition is reversed exactly once by [`PartitionGuard::release`], whatever
//!   the scenarios did. A guard dropped without release reconnects in the background.
//! - Scenarios run one at a time, each in its own task, so a panicking scenario is
//!   reported as failed and the remaining scenarios still run.
//! - The test namespace is removed before setup and again after the run.
//! - A run cancelled before the partition never disconnects the cloud node.
//!   A cancelled run is never reported as passed.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use edgeproof_core::config::EdgeproofConfig;
use edgeproof_core::exec::RemoteExecutor;
use edgeproof_core::poll::{PollSpec, eventually_true};
use edgeproof_core::types::FixtureSet;
use edgeproof_node_runtime::{DockerClient, PartitionController, PartitionGuard};
use edgeproof_scenarios::{
    Scenario, ScenarioOutcome, ScenarioReport, ScenarioRunner, edge_autonomy_suite,
};

use crate::cluster::ClusterClient;
use crate::error::{
    EXIT_CANCELLED, EXIT_SCENARIO_FAILURE, EXIT_SUCCESS, EXIT_TEARDOWN, HarnessError,
};
use crate::fixtures::resolve_fixtures;

/// Interval between namespace deletion checks.
const NAMESPACE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Reason attached to scenarios that were never scheduled because the run was cancelled.
const CANCELLED_REASON: &str = "run cancelled before scenario started";

/// Phase reached by a harness run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarnessPhase {
    Init,
    FixturesResolved,
    Partitioned,
    ScenariosRunning,
    Reconnected,
    CleanedUp,
}

impl fmt::Display for HarnessPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "init",
            Self::FixturesResolved => "fixtures_resolved",
            Self::Partitioned => "partitioned",
            Self::ScenariosRunning => "scenarios_running",
            Self::Reconnected => "reconnected",
            Self::CleanedUp => "cleaned_up",
        };
        f.write_str(s)
    }
}

/// Result of a run that got past setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Fixtures every scenario saw.
    pub fixtures: FixtureSet,
    /// One report per scenario, in execution order.
    pub scenarios: Vec<ScenarioReport>,
    /// Reconnect and cleanup failures. Non-empty means the next run may start dirty.
    pub teardown_errors: Vec<String>,
    /// Last phase reached.
    pub phase: HarnessPhase,
    /// The run was cancelled and at least one scenario never started.
    #[serde(default)]
    pub cancelled: bool,
}

impl RunReport {
    /// True iff the run completed, no scenario failed and teardown was clean.
    pub fn passed(&self) -> bool {
        !self.cancelled
            && self.teardown_errors.is_empty()
            && !self.scenarios.iter().any(|s| s.outcome.is_failed())
    }

    /// Names of failed scenarios.
    pub fn failed_scenarios(&self) -> Vec<&str> {
        self.scenarios
            .iter()
            .filter(|s| s.outcome.is_failed())
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Process exit code. A teardown failure outranks cancellation, which
    /// outranks scenario failures.
    pub fn exit_code(&self) -> i32 {
        if !self.teardown_errors.is_empty() {
            EXIT_TEARDOWN
        } else if self.cancelled {
            EXIT_CANCELLED
        } else if self.passed() {
            EXIT_SUCCESS
        } else {
            EXIT_SCENARIO_FAILURE
        }
    }
}

/// Runs the edge autonomy suite against a kind cluster.
pub struct Orchestrator<C: ClusterClient, D: DockerClient, E: RemoteExecutor> {
    config: EdgeproofConfig,
    cluster: Arc<C>,
    docker: Arc<D>,
    partition: PartitionController<D>,
    executor: Arc<E>,
    scenarios: Vec<Arc<Scenario>>,
    cancel: CancellationToken,
    phase: HarnessPhase,
}

impl<C: ClusterClient, D: DockerClient, E: RemoteExecutor> Orchestrator<C, D, E> {
    /// Creates a new builder.
    pub fn builder() -> OrchestratorBuilder<C, D, E> {
        OrchestratorBuilder::new()
    }

    /// Last phase reached.
    pub fn phase(&self) -> HarnessPhase {
        self.phase
    }

    /// Token that stops scheduling further scenarios when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Names of the scenarios this orchestrator will run, in order.
    pub fn scenario_names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.name.as_str()).collect()
    }

    fn set_phase(&mut self, phase: HarnessPhase) {
        info!(from = %self.phase, to = %phase, "harness phase transition");
        self.phase = phase;
    }

    fn unscoped(&self) -> PollSpec {
        PollSpec::unscoped(&self.config.poll)
    }

    /// Runs setup, all scenarios and teardown.
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::Setup` if Docker is unreachable, the test namespace
    /// cannot be prepared, a fixture cannot be resolved or the partition cannot be
    /// established. Cleanup has been attempted by the time the error is returned.
    /// Scenario failures and teardown failures are reported in [`RunReport`].
    pub async fn run(&mut self) -> Result<RunReport, HarnessError> {
        self.phase = HarnessPhase::Init;
        let namespace = self.config.cluster.e2e_namespace.clone();

        info!(
            scenarios = self.scenarios.len(),
            namespace = namespace.as_str(),
            cloud_node = self.partition.cloud_node(),
            network = self.partition.network(),
            "harness run starting"
        );

        self.docker
            .ping()
            .await
            .map_err(|e| HarnessError::Setup(format!("docker unreachable: {e}")))?;

        // pre-clean
        if let Err(e) = self.cleanup_namespace(&namespace).await {
            return Err(HarnessError::Setup(format!("pre-clean failed: {e}")));
        }
        if let Err(e) = self.cluster.create_namespace(&namespace).await {
            self.abort_cleanup(&namespace).await;
            return Err(HarnessError::Setup(format!(
                "failed to create namespace '{namespace}': {e}"
            )));
        }

        let resolved =
            resolve_fixtures(self.cluster.as_ref(), &self.config, self.unscoped()).await;
        let fixtures = match resolved {
            Ok(fixtures) => fixtures,
            Err(e) => {
                error!(error = %e, "fixture resolution failed, aborting before partition");
                self.abort_cleanup(&namespace).await;
                return Err(e);
            }
        };
        self.set_phase(HarnessPhase::FixturesResolved);

        if self.cancel.is_cancelled() {
            warn!("run cancelled before partition, cloud node left connected");
            return Ok(self.cancelled_before_partition(fixtures, &namespace).await);
        }

        let (guard, partitioned) = self.partition.partition().await;
        if let Err(e) = partitioned {
            error!(error = %e, "partition failed, reconnecting and aborting");
            if let Err(re) = guard.release().await {
                error!(error = %re, "reconnect after failed partition also failed");
            }
            self.abort_cleanup(&namespace).await;
            return Err(HarnessError::Setup(format!(
                "failed to partition cloud node: {e}"
            )));
        }
        self.set_phase(HarnessPhase::Partitioned);

        self.set_phase(HarnessPhase::ScenariosRunning);
        let scenarios = self.run_scenarios(&fixtures).await;

        let mut teardown_errors = Vec::new();
        self.teardown(guard, &namespace, &mut teardown_errors).await;

        let cancelled = scenarios.iter().any(is_cancelled_skip);
        let report = RunReport {
            fixtures,
            scenarios,
            teardown_errors,
            phase: self.phase,
            cancelled,
        };
        info!(
            passed = report.passed(),
            failed = ?report.failed_scenarios(),
            teardown_errors = report.teardown_errors.len(),
            cancelled = report.cancelled,
            "harness run finished"
        );
        Ok(report)
    }

    /// Skips every scenario and removes the namespace. No partition was made.
    async fn cancelled_before_partition(
        &mut self,
        fixtures: FixtureSet,
        namespace: &str,
    ) -> RunReport {
        let scenarios = self
            .scenarios
            .iter()
            .map(|s| ScenarioReport::skipped(s.name.as_str(), CANCELLED_REASON))
            .collect();

        let mut teardown_errors = Vec::new();
        match self.cleanup_namespace(namespace).await {
            Ok(()) => self.set_phase(HarnessPhase::CleanedUp),
            Err(e) => {
                error!(namespace, error = %e, "failed to clean up namespace");
                teardown_errors.push(format!("namespace cleanup failed: {e}"));
            }
        }

        RunReport {
            fixtures,
            scenarios,
            teardown_errors,
            phase: self.phase,
            cancelled: true,
        }
    }

    /// Runs each scenario in its own task, strictly one after another.
    async fn run_scenarios(&self, fixtures: &FixtureSet) -> Vec<ScenarioReport> {
        let runner = ScenarioRunner::new(
            Arc::clone(&self.executor),
            Arc::new(fixtures.clone()),
            self.unscoped(),
        )
        .with_run_unsupported(self.config.scenarios.run_unsupported);

        let mut reports = Vec::with_capacity(self.scenarios.len());
        for scenario in &self.scenarios {
            if self.cancel.is_cancelled() {
                warn!(
                    scenario = scenario.name.as_str(),
                    "run cancelled, scenario not started"
                );
                reports.push(ScenarioReport::skipped(
                    scenario.name.as_str(),
                    CANCELLED_REASON,
                ));
                continue;
            }

            let task_runner = runner.clone();
            let task_scenario = Arc::clone(scenario);
            let handle = tokio::spawn(async move { task_runner.run(&task_scenario).await });

            let report = match handle.await {
                Ok(report) => report,
                Err(e) if e.is_panic() => {
                    let message = panic_message(e.into_panic().as_ref());
                    error!(
                        scenario = scenario.name.as_str(),
                        panic = message.as_str(),
                        "scenario panicked"
                    );
                    ScenarioReport::aborted(
                        scenario.name.as_str(),
                        format!("scenario panicked: {message}"),
                    )
                }
                Err(e) => ScenarioReport::aborted(
                    scenario.name.as_str(),
                    format!("scenario task failed: {e}"),
                ),
            };
            reports.push(report);
        }
        reports
    }

    /// Reconnects once, then removes the test namespace. Both steps always run.
    async fn teardown(
        &mut self,
        guard: PartitionGuard<D>,
        namespace: &str,
        errors: &mut Vec<String>,
    ) {
        match guard.release().await {
            Ok(()) => self.set_phase(HarnessPhase::Reconnected),
            Err(e) => {
                error!(error = %e, "failed to reconnect cloud node");
                errors.push(format!("reconnect failed: {e}"));
            }
        }

        match self.cleanup_namespace(namespace).await {
            Ok(()) => {
                if errors.is_empty() {
                    self.set_phase(HarnessPhase::CleanedUp);
                }
            }
            Err(e) => {
                error!(namespace, error = %e, "failed to clean up namespace");
                errors.push(format!("namespace cleanup failed: {e}"));
            }
        }
    }

    /// Post-clean on a setup failure. Errors are logged; the setup error wins.
    async fn abort_cleanup(&self, namespace: &str) {
        if let Err(e) = self.cleanup_namespace(namespace).await {
            error!(namespace, error = %e, "namespace cleanup after setup failure failed");
        }
    }

    /// Deletes the namespace and waits until it is gone.
    async fn cleanup_namespace(&self, namespace: &str) -> Result<(), HarnessError> {
        self.cluster.delete_namespace(namespace).await?;

        let spec = PollSpec::scoped(
            Duration::from_secs(self.config.cluster.namespace_timeout_secs),
            NAMESPACE_POLL_INTERVAL,
        );
        let cluster = self.cluster.as_ref();
        let gone = eventually_true(spec, move || async move {
            matches!(cluster.namespace_exists(namespace).await, Ok(false))
        })
        .await;

        if gone {
            info!(namespace, "namespace removed");
            Ok(())
        } else {
            Err(HarnessError::Teardown(format!(
                "namespace '{namespace}' still present after {}s",
                spec.timeout.as_secs()
            )))
        }
    }
}

fn is_cancelled_skip(report: &ScenarioReport) -> bool {
    matches!(&report.outcome, ScenarioOutcome::Skipped { reason } if reason == CANCELLED_REASON)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// Builder for [`Orchestrator`].
pub struct OrchestratorBuilder<C: ClusterClient, D: DockerClient, E: RemoteExecutor> {
    config: EdgeproofConfig,
    cluster: Option<Arc<C>>,
    docker: Option<Arc<D>>,
    executor: Option<Arc<E>>,
    scenarios: Option<Vec<Scenario>>,
    cancel: Option<CancellationToken>,
    partition_retry: Option<(Duration, u32, Duration)>,
}

impl<C: ClusterClient, D: DockerClient, E: RemoteExecutor> OrchestratorBuilder<C, D, E> {
    pub fn new() -> Self {
        Self {
            config: EdgeproofConfig::default(),
            cluster: None,
            docker: None,
            executor: None,
            scenarios: None,
            cancel: None,
            partition_retry: None,
        }
    }

    pub fn config(mut self, config: EdgeproofConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cluster(mut self, cluster: Arc<C>) -> Self {
        self.cluster = Some(cluster);
        self
    }

    pub fn docker(mut self, docker: Arc<D>) -> Self {
        self.docker = Some(docker);
        self
    }

    pub fn executor(mut self, executor: Arc<E>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Scenario list. Defaults to the configured edge autonomy suite.
    pub fn scenarios(mut self, scenarios: Vec<Scenario>) -> Self {
        self.scenarios = Some(scenarios);
        self
    }

    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Timeout, retry count and backoff for disconnect/reconnect.
    pub fn partition_retry(
        mut self,
        timeout: Duration,
        max_retries: u32,
        backoff: Duration,
    ) -> Self {
        self.partition_retry = Some((timeout, max_retries, backoff));
        self
    }

    /// # Errors
    ///
    /// Returns `HarnessError::Config` if the configuration is invalid or a
    /// collaborator is missing.
    pub fn build(self) -> Result<Orchestrator<C, D, E>, HarnessError> {
        self.config.validate()?;

        let cluster = self
            .cluster
            .ok_or_else(|| HarnessError::Config("cluster client is required".to_owned()))?;
        let docker = self
            .docker
            .ok_or_else(|| HarnessError::Config("docker client is required".to_owned()))?;
        let executor = self
            .executor
            .ok_or_else(|| HarnessError::Config("remote executor is required".to_owned()))?;

        let mut partition = PartitionController::new(
            Arc::clone(&docker),
            self.config.nodes.network.clone(),
            self.config.nodes.cloud_node.clone(),
        );
        if let Some((timeout, max_retries, backoff)) = self.partition_retry {
            partition = partition.with_retry(timeout, max_retries, backoff);
        }

        let scenarios = self
            .scenarios
            .unwrap_or_else(|| edge_autonomy_suite(&self.config))
            .into_iter()
            .map(Arc::new)
            .collect();

        Ok(Orchestrator {
            config: self.config,
            cluster,
            docker,
            partition,
            executor,
            scenarios,
            cancel: self.cancel.unwrap_or_default(),
            phase: HarnessPhase::Init,
        })
    }
}

impl<C: ClusterClient, D: DockerClient, E: RemoteExecutor> Default
    for OrchestratorBuilder<C, D, E>
{
    fn default() -> Self {
        Self::new()
    }
}

//! 시나리오와 실행기
//!
//! [`Scenario`]는 한 서브시스템의 복원력 검증을 구성하는 단계 목록입니다.
//! [`ScenarioRunner`]는 단계를 순서대로 실행하고 [`ScenarioReport`]를 생성합니다.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{error, info, warn};

use edgeproof_core::exec::RemoteExecutor;
use edgeproof_core::metrics as m;
use edgeproof_core::poll::PollSpec;
use edgeproof_core::types::FixtureSet;

use crate::state::ScenarioState;
use crate::step::{Step, StepContext};

/// 시나리오 지원 여부
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Support {
    /// 지원됨
    Supported,
    /// 알려진 제약으로 지원되지 않음 (기본적으로 건너뜀)
    ExpectedUnsupported { reason: String },
}

/// 한 서브시스템의 복원력 검증
#[derive(Debug)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub support: Support,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            support: Support::Supported,
            steps: Vec::new(),
        }
    }

    /// 지원되지 않는 시나리오로 표시합니다.
    pub fn expected_unsupported(mut self, reason: impl Into<String>) -> Self {
        self.support = Support::ExpectedUnsupported {
            reason: reason.into(),
        };
        self
    }

    /// 단계를 추가합니다.
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}

/// 시나리오 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ScenarioOutcome {
    /// 모든 단계 성공
    Passed,
    /// 단계 실패
    Failed {
        step: String,
        reason: String,
        detail: String,
    },
    /// 실행하지 않음
    Skipped { reason: String },
}

impl ScenarioOutcome {
    /// 메트릭 레이블 값
    pub fn label(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed { .. } => "failed",
            Self::Skipped { .. } => "skipped",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// 시나리오 실행 보고서
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: String,
    pub outcome: ScenarioOutcome,
    /// 실행 시간 (밀리초)
    pub elapsed_ms: u64,
    /// 성공적으로 끝난 단계 수
    pub steps_completed: usize,
}

impl ScenarioReport {
    /// 실행하지 않은 시나리오의 보고서를 생성합니다.
    pub fn skipped(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: ScenarioOutcome::Skipped {
                reason: reason.into(),
            },
            elapsed_ms: 0,
            steps_completed: 0,
        }
    }

    /// 단계 밖에서 실패한 시나리오(예: panic)의 보고서를 생성합니다.
    pub fn aborted(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: ScenarioOutcome::Failed {
                step: String::new(),
                reason: reason.into(),
                detail: String::new(),
            },
            elapsed_ms: 0,
            steps_completed: 0,
        }
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}

/// 시나리오 실행기
///
/// 실행기와 fixture를 공유 소유하므로 `tokio::spawn`된 태스크로 옮길 수 있습니다.
pub struct ScenarioRunner<E: RemoteExecutor> {
    executor: Arc<E>,
    fixtures: Arc<FixtureSet>,
    unscoped: PollSpec,
    run_unsupported: bool,
}

impl<E: RemoteExecutor> Clone for ScenarioRunner<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            fixtures: Arc::clone(&self.fixtures),
            unscoped: self.unscoped,
            run_unsupported: self.run_unsupported,
        }
    }
}

impl<E: RemoteExecutor> ScenarioRunner<E> {
    pub fn new(executor: Arc<E>, fixtures: Arc<FixtureSet>, unscoped: PollSpec) -> Self {
        Self {
            executor,
            fixtures,
            unscoped,
            run_unsupported: false,
        }
    }

    /// 지원되지 않는 시나리오도 실행하도록 설정합니다.
    pub fn with_run_unsupported(mut self, run_unsupported: bool) -> Self {
        self.run_unsupported = run_unsupported;
        self
    }

    /// 시나리오를 실행합니다.
    ///
    /// 단계는 엄격히 순서대로 실행되며, 첫 실패에서 나머지 단계를 실행하지 않습니다.
    pub async fn run(&self, scenario: &Scenario) -> ScenarioReport {
        if let Support::ExpectedUnsupported { reason } = &scenario.support {
            if !self.run_unsupported {
                warn!(
                    scenario = scenario.name.as_str(),
                    reason = reason.as_str(),
                    "scenario skipped"
                );
                let report = ScenarioReport::skipped(scenario.name.as_str(), reason.as_str());
                record_metrics(&report);
                return report;
            }
        }

        info!(
            scenario = scenario.name.as_str(),
            steps = scenario.steps.len(),
            "scenario started"
        );
        let start = Instant::now();
        let ctx = StepContext {
            executor: self.executor.as_ref(),
            fixtures: self.fixtures.as_ref(),
            unscoped: self.unscoped,
        };

        let mut state = ScenarioState::new();
        let mut steps_completed = 0;
        let mut outcome = ScenarioOutcome::Passed;

        for step in &scenario.steps {
            info!(scenario = scenario.name.as_str(), step = step.name.as_str(), "step started");
            match step.execute(&ctx, state).await {
                Ok(next) => {
                    state = next;
                    steps_completed += 1;
                }
                Err(failure) => {
                    error!(
                        scenario = scenario.name.as_str(),
                        step = failure.step.as_str(),
                        reason = failure.reason.as_str(),
                        detail = failure.detail.as_str(),
                        "scenario failed"
                    );
                    outcome = ScenarioOutcome::Failed {
                        step: failure.step,
                        reason: failure.reason,
                        detail: failure.detail,
                    };
                    break;
                }
            }
        }

        let elapsed = start.elapsed();
        if !outcome.is_failed() {
            info!(
                scenario = scenario.name.as_str(),
                elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                "scenario passed"
            );
        }

        let report = ScenarioReport {
            name: scenario.name.clone(),
            outcome,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            steps_completed,
        };
        metrics::histogram!(m::SCENARIO_DURATION_SECONDS, m::LABEL_SCENARIO => report.name.clone())
            .record(elapsed.as_secs_f64());
        record_metrics(&report);
        report
    }
}

fn record_metrics(report: &ScenarioReport) {
    metrics::counter!(
        m::SCENARIOS_TOTAL,
        m::LABEL_SCENARIO => report.name.clone(),
        m::LABEL_RESULT => report.outcome.label()
    )
    .increment(1);
}

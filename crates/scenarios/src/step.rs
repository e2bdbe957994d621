//! 시나리오 단계 -- 발견(discovery), 동작(action), 검증(verification)
//!
//! 각 단계는 [`ScenarioState`]를 값으로 받아 갱신된 상태를 반환합니다.
//! 모든 원격 호출은 [`eventually`]로 감싸져 일시적 실패를 흡수합니다.

use std::sync::OnceLock;

use tracing::{debug, info};

use edgeproof_core::exec::RemoteExecutor;
use edgeproof_core::matcher::OutputMatcher;
use edgeproof_core::poll::{PollOutcome, PollSpec, PollTimeout, eventually};
use edgeproof_core::types::{ExecOutput, ExecutionTarget, FixtureSet};
use edgeproof_node_runtime::crictl;

use crate::error::ScenarioError;
use crate::state::ScenarioState;
use crate::template::{CommandTemplate, lookup};

/// 실패 진단 메시지에 포함할 출력 최대 길이
const MAX_OUTPUT_EXCERPT: usize = 200;

/// 단계 실행 위치
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetRef {
    /// 이름이 고정된 노드
    Node(String),
    /// fixture 값(예: `dns_node`)으로 정해지는 노드
    FixtureNode(String),
    /// 노드 안에서 이전 단계가 발견한 런타임 컨테이너
    Container { node: String, key: String },
}

impl TargetRef {
    pub fn node(name: impl Into<String>) -> Self {
        Self::Node(name.into())
    }

    pub fn fixture_node(fixture: impl Into<String>) -> Self {
        Self::FixtureNode(fixture.into())
    }

    pub fn container(node: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Container {
            node: node.into(),
            key: key.into(),
        }
    }

    /// 실행 대상으로 해석합니다. 참조한 값이 없거나 비어 있으면 실패합니다.
    pub fn resolve(
        &self,
        state: &ScenarioState,
        fixtures: &FixtureSet,
    ) -> Result<ExecutionTarget, ScenarioError> {
        match self {
            Self::Node(name) => Ok(ExecutionTarget::node(name.as_str())),
            Self::FixtureNode(fixture) => {
                Ok(ExecutionTarget::node(lookup(fixture, state, fixtures)?))
            }
            Self::Container { node, key } => Ok(ExecutionTarget::container(
                node.as_str(),
                state.require(key)?,
            )),
        }
    }
}

/// 단계 종류
#[derive(Debug)]
pub enum StepKind {
    /// `crictl ps`에서 `needle`을 포함하는 컨테이너 ID를 찾아 `key`로 저장
    Discover { key: String, needle: String },
    /// 파괴적 명령 실행 (성공으로 수락될 때까지 폴링)
    Action { command: CommandTemplate },
    /// 사후 조건 폴링. `poll`이 없으면 유한한 기본값 사용
    Verify {
        command: CommandTemplate,
        matcher: Box<dyn OutputMatcher>,
        poll: Option<PollSpec>,
    },
}

/// 단계 실패
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    /// 실패한 단계 이름
    pub step: String,
    /// 사람이 읽을 수 있는 실패 사유
    pub reason: String,
    /// 진단용 상세 정보
    pub detail: String,
}

/// 단계 실행에 필요한 공유 자원
pub struct StepContext<'a, E: RemoteExecutor> {
    pub executor: &'a E,
    pub fixtures: &'a FixtureSet,
    /// 명시적 제한 시간이 없는 폴링에 쓰이는 기본값
    pub unscoped: PollSpec,
}

/// 시나리오 단계
#[derive(Debug)]
pub struct Step {
    pub name: String,
    pub target: TargetRef,
    pub kind: StepKind,
    /// 실패 시 보고되는 사유
    pub failure_reason: String,
}

impl Step {
    /// 발견 단계를 생성합니다.
    pub fn discover(
        name: impl Into<String>,
        target: TargetRef,
        key: impl Into<String>,
        needle: impl Into<String>,
        failure_reason: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target,
            kind: StepKind::Discover {
                key: key.into(),
                needle: needle.into(),
            },
            failure_reason: failure_reason.into(),
        }
    }

    /// 동작 단계를 생성합니다.
    pub fn action(
        name: impl Into<String>,
        target: TargetRef,
        command: impl Into<CommandTemplate>,
        failure_reason: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target,
            kind: StepKind::Action {
                command: command.into(),
            },
            failure_reason: failure_reason.into(),
        }
    }

    /// 검증 단계를 생성합니다.
    pub fn verify(
        name: impl Into<String>,
        target: TargetRef,
        command: impl Into<CommandTemplate>,
        matcher: impl OutputMatcher + 'static,
        poll: Option<PollSpec>,
        failure_reason: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target,
            kind: StepKind::Verify {
                command: command.into(),
                matcher: Box::new(matcher),
                poll,
            },
            failure_reason: failure_reason.into(),
        }
    }

    /// 단계를 실행하고 갱신된 상태를 반환합니다.
    ///
    /// 대상이나 명령의 placeholder가 해석되지 않으면 원격 명령을 실행하지 않고 실패합니다.
    pub async fn execute<E: RemoteExecutor>(
        &self,
        ctx: &StepContext<'_, E>,
        mut state: ScenarioState,
    ) -> Result<ScenarioState, StepFailure> {
        let target = self
            .target
            .resolve(&state, ctx.fixtures)
            .map_err(|e| self.failure(e.to_string()))?;

        match &self.kind {
            StepKind::Discover { key, needle } => {
                let id = self.run_discover(ctx, &target, needle).await?;
                info!(
                    step = self.name.as_str(),
                    key = key.as_str(),
                    id = id.as_str(),
                    "discovered container"
                );
                state
                    .insert(key.as_str(), id)
                    .map_err(|e| self.failure(e.to_string()))?;
            }
            StepKind::Action { command } => {
                let command = command
                    .render(&state, ctx.fixtures)
                    .map_err(|e| self.failure(e.to_string()))?;
                self.run_action(ctx, &target, &command).await?;
            }
            StepKind::Verify {
                command,
                matcher,
                poll,
            } => {
                let command = command
                    .render(&state, ctx.fixtures)
                    .map_err(|e| self.failure(e.to_string()))?;
                let spec = poll.unwrap_or(ctx.unscoped);
                self.run_verify(ctx, &target, &command, matcher.as_ref(), spec)
                    .await?;
            }
        }
        Ok(state)
    }

    async fn run_discover<E: RemoteExecutor>(
        &self,
        ctx: &StepContext<'_, E>,
        target: &ExecutionTarget,
        needle: &str,
    ) -> Result<String, StepFailure> {
        let found = OnceLock::new();
        let found_ref = &found;
        let executor = ctx.executor;

        let result = eventually(ctx.unscoped, move || async move {
            let out = executor.run(target, crictl::PS_COMMAND).await;
            if !out.ok {
                return PollOutcome::ExecError(excerpt(&out));
            }
            let text = out.text();
            match crictl::find_container_id(&text, needle) {
                Some(id) if crictl::validate_container_id(id).is_ok() => {
                    let _ = found_ref.set(id.to_owned());
                    PollOutcome::Matched
                }
                Some(id) => PollOutcome::ExecError(format!("invalid container id '{id}'")),
                None => PollOutcome::NotMatched,
            }
        })
        .await;

        match (result, found.into_inner()) {
            (Ok(_), Some(id)) => Ok(id),
            (Ok(_), None) => Err(self.failure(format!(
                "no running container matches '{needle}'"
            ))),
            (Err(timeout), _) => Err(self.timed_out(
                &format!("container matching '{needle}' on {target}"),
                timeout,
            )),
        }
    }

    async fn run_action<E: RemoteExecutor>(
        &self,
        ctx: &StepContext<'_, E>,
        target: &ExecutionTarget,
        command: &str,
    ) -> Result<(), StepFailure> {
        let executor = ctx.executor;
        info!(step = self.name.as_str(), target = %target, command, "running action");

        eventually(ctx.unscoped, move || async move {
            let out = executor.run(target, command).await;
            if out.ok {
                PollOutcome::Matched
            } else {
                PollOutcome::ExecError(excerpt(&out))
            }
        })
        .await
        .map(|report| {
            debug!(
                step = self.name.as_str(),
                attempts = report.attempts,
                "action accepted"
            );
        })
        .map_err(|timeout| {
            self.timed_out(&format!("'{command}' accepted on {target}"), timeout)
        })
    }

    async fn run_verify<E: RemoteExecutor>(
        &self,
        ctx: &StepContext<'_, E>,
        target: &ExecutionTarget,
        command: &str,
        matcher: &dyn OutputMatcher,
        spec: PollSpec,
    ) -> Result<(), StepFailure> {
        let executor = ctx.executor;
        info!(
            step = self.name.as_str(),
            target = %target,
            command,
            condition = matcher.describe().as_str(),
            timeout_ms = u64::try_from(spec.timeout.as_millis()).unwrap_or(u64::MAX),
            "verifying"
        );

        eventually(spec, move || async move {
            let out = executor.run(target, command).await;
            if matcher.matches(&out) {
                PollOutcome::Matched
            } else if !out.ok {
                PollOutcome::ExecError(excerpt(&out))
            } else {
                PollOutcome::NotMatched
            }
        })
        .await
        .map(|report| {
            info!(
                step = self.name.as_str(),
                attempts = report.attempts,
                elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
                "condition met"
            );
        })
        .map_err(|timeout| {
            self.timed_out(
                &format!("'{command}' on {target}: {}", matcher.describe()),
                timeout,
            )
        })
    }

    fn failure(&self, detail: String) -> StepFailure {
        StepFailure {
            step: self.name.clone(),
            reason: self.failure_reason.clone(),
            detail,
        }
    }

    fn timed_out(&self, waiting_for: &str, timeout: PollTimeout) -> StepFailure {
        let last = match &timeout.last {
            PollOutcome::ExecError(e) => format!(" (last error: {e})"),
            PollOutcome::NotMatched => " (last attempt did not match)".to_owned(),
            PollOutcome::Matched => String::new(),
        };
        let err = timeout.into_error(waiting_for);
        self.failure(format!("{err}{last}"))
    }
}

/// 진단용 출력 발췌
fn excerpt(out: &ExecOutput) -> String {
    let text = out.text();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "command failed with no output".to_owned();
    }
    match trimmed.char_indices().nth(MAX_OUTPUT_EXCERPT) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_owned(),
    }
}

//! # edgeproof-scenarios
//!
//! 시나리오 모델과 엣지 자율성 시나리오 모음입니다.
//!
//! - [`state`]: 단계 간에 전달되는 시나리오 상태 (`ScenarioState`)
//! - [`template`]: `{name}` placeholder 명령 템플릿 (`CommandTemplate`)
//! - [`step`]: 발견/동작/검증 단계 (`Step`, `StepKind`, `TargetRef`)
//! - [`scenario`]: 시나리오와 실행기 (`Scenario`, `ScenarioRunner`, `ScenarioReport`)
//! - [`suite`]: kubelet, flannel, yurthub, kube-proxy, coredns 시나리오
//!
//! ```text
//! Scenario ──steps──▶ Step::execute(state) ──▶ state'
//!                        │
//!                        ├─ RemoteExecutor::run
//!                        └─ eventually(PollSpec)
//! ```

pub mod error;
pub mod scenario;
pub mod state;
pub mod step;
pub mod suite;
pub mod template;

pub use error::ScenarioError;
pub use scenario::{Scenario, ScenarioOutcome, ScenarioReport, ScenarioRunner, Support};
pub use state::ScenarioState;
pub use step::{Step, StepContext, StepFailure, StepKind, TargetRef};
pub use suite::{all_scenarios, edge_autonomy_suite};
pub use template::CommandTemplate;

//! # edgeproof-core
//!
//! 엣지 자율성 검증 하네스의 공통 기반 크레이트입니다.
//!
//! - [`config`]: `edgeproof.toml` 파싱, 환경변수 오버라이드, 검증
//! - [`error`]: 도메인별 에러 타입
//! - [`exec`]: 원격 명령 실행 경계 ([`RemoteExecutor`])
//! - [`matcher`]: 명령 출력 판정 ([`OutputMatcher`])
//! - [`poll`]: 제한 시간 내 조건 폴러 ([`eventually`])
//! - [`types`]: 실행 대상, 명령 결과, fixture, 파티션 상태
//! - [`metrics`]: 메트릭 이름 상수

pub mod config;
pub mod error;
pub mod exec;
pub mod matcher;
pub mod metrics;
pub mod poll;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, EdgeproofError, ExecError, PollError};

// 설정
pub use config::{EdgeproofConfig, SCENARIO_NAMES};

// 실행/판정/폴링
pub use exec::RemoteExecutor;
pub use matcher::{CommandSucceeded, ContainsOutput, ExactOutput, OutputMatcher};
pub use poll::{PollOutcome, PollReport, PollSpec, PollTimeout, eventually, eventually_true};

// 도메인 타입
pub use types::{ExecOutput, ExecutionTarget, FixtureSet, PartitionState};

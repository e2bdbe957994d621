//! 메트릭 상수
//!
//! 모든 메트릭의 이름을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다. 레코더가 설치되지 않으면 호출은 no-op입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `edgeproof_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (matched, timeout, passed, failed, skipped, success, failure)
pub const LABEL_RESULT: &str = "result";

/// 시나리오 레이블 키 (kubelet, flannel, yurthub, kube-proxy, coredns)
pub const LABEL_SCENARIO: &str = "scenario";

/// 파티션 동작 레이블 키 (disconnect, reconnect)
pub const LABEL_OPERATION: &str = "operation";

// ─── 폴러 메트릭 ────────────────────────────────────────────────────

/// 폴러: 술어 평가 횟수 (counter)
pub const POLL_ATTEMPTS_TOTAL: &str = "edgeproof_poll_attempts_total";

/// 폴러: 폴링 소요 시간 (histogram, 초, label: result)
pub const POLL_DURATION_SECONDS: &str = "edgeproof_poll_duration_seconds";

// ─── 시나리오 메트릭 ────────────────────────────────────────────────

/// 시나리오: 결과별 실행 수 (counter, label: scenario, result)
pub const SCENARIOS_TOTAL: &str = "edgeproof_scenarios_total";

/// 시나리오: 실행 시간 (histogram, 초, label: scenario)
pub const SCENARIO_DURATION_SECONDS: &str = "edgeproof_scenario_duration_seconds";

// ─── 파티션 메트릭 ──────────────────────────────────────────────────

/// 파티션: 연결 해제/재연결 시도 수 (counter, label: operation, result)
pub const PARTITION_OPERATIONS_TOTAL: &str = "edgeproof_partition_operations_total";

/// 원격 실행: 명령 실행 수 (counter, label: result)
pub const REMOTE_EXEC_TOTAL: &str = "edgeproof_remote_exec_total";

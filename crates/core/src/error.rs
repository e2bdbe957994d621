//! 에러 타입 -- 도메인별 에러 정의

/// edgeproof 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum EdgeproofError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 원격 명령 실행 에러
    #[error("exec error: {0}")]
    Exec(#[from] ExecError),

    /// 조건 폴링 에러
    #[error("poll error: {0}")]
    Poll(#[from] PollError),

    /// 클러스터 API 에러
    #[error("cluster error: {0}")]
    Cluster(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 원격 명령 실행 에러
///
/// [`RemoteExecutor`](crate::exec::RemoteExecutor)는 이 에러를 호출자에게 노출하지 않고
/// `ok=false`로 축약합니다. 구현체 내부와 로그에서만 사용됩니다.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// 실행 대상 식별자가 유효하지 않음
    #[error("invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// 명령 실행 요청 실패
    #[error("exec on '{target}' failed: {reason}")]
    Failed { target: String, reason: String },
}

/// 조건 폴링 에러
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// 제한 시간 내에 조건이 참이 되지 않음
    #[error("timed out after {elapsed_ms}ms ({attempts} attempts) waiting for: {waiting_for}")]
    TimedOut {
        waiting_for: String,
        attempts: u32,
        elapsed_ms: u64,
    },
}

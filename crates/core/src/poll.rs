//! 조건 폴러 -- "결국 참이 된다" 형태의 검증 기본 요소
//!
//! 파티션 이후의 복구는 본질적으로 비동기(서비스 재시작, 캐시 수렴, 라우팅 재프로그래밍)이므로
//! 모든 검증은 [`eventually`]로 표현됩니다.
//!
//! # 동작
//! ```text
//! t=0        attempt ──▶ Matched? ──yes──▶ Ok(PollReport)
//!              │no
//!            sleep(min(interval, remaining))
//!              │
//! t=interval attempt ──▶ ...
//!              │
//! deadline   Err(PollTimeout)
//! ```
//!
//! 각 시도는 남은 시간으로 제한되므로, 시도가 멈춰 있어도 폴러는
//! `timeout + interval` 안에 반드시 종료합니다.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::config::PollConfig;
use crate::error::PollError;
use crate::metrics as m;

/// 폴링 간격 하한 (0 간격으로 인한 busy-spin 방지)
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// 폴링 제한 시간과 간격
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSpec {
    /// 전체 제한 시간
    pub timeout: Duration,
    /// 시도 간 간격
    pub interval: Duration,
}

impl PollSpec {
    /// 시나리오가 명시한 제한 시간과 간격으로 생성합니다.
    pub fn scoped(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// 명시적 제한 시간이 없는 호출에 쓰이는 유한한 기본값입니다.
    pub fn unscoped(config: &PollConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.default_timeout_secs),
            interval: Duration::from_millis(config.default_interval_ms),
        }
    }

    fn effective_interval(&self) -> Duration {
        self.interval.max(MIN_POLL_INTERVAL)
    }
}

impl Default for PollSpec {
    fn default() -> Self {
        Self::unscoped(&PollConfig::default())
    }
}

/// 단일 시도 결과 (폴러 내부에서만 소비됨)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// 조건 충족
    Matched,
    /// 조건 미충족
    NotMatched,
    /// 명령 실행 자체가 실패
    ExecError(String),
}

impl PollOutcome {
    /// bool 결과를 변환합니다.
    pub fn from_bool(matched: bool) -> Self {
        if matched {
            Self::Matched
        } else {
            Self::NotMatched
        }
    }

    /// 조건 충족 여부
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched)
    }
}

/// 성공한 폴링 요약
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    /// 수행한 시도 횟수
    pub attempts: u32,
    /// 첫 시도부터 성공까지 걸린 시간
    pub elapsed: Duration,
}

/// 제한 시간 초과 요약
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTimeout {
    /// 수행한 시도 횟수
    pub attempts: u32,
    /// 경과 시간
    pub elapsed: Duration,
    /// 마지막 시도 결과
    pub last: PollOutcome,
}

impl PollTimeout {
    /// 무엇을 기다리고 있었는지를 붙여 [`PollError`]로 변환합니다.
    pub fn into_error(self, waiting_for: impl Into<String>) -> PollError {
        PollError::TimedOut {
            waiting_for: waiting_for.into(),
            attempts: self.attempts,
            elapsed_ms: u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// 조건이 참이 될 때까지 `attempt`를 반복 평가합니다.
///
/// 즉시 한 번 평가한 뒤 `spec.interval` 간격으로 재평가합니다.
/// 첫 `Matched`에서 즉시 반환하고, 제한 시간이 지나면 [`PollTimeout`]을 반환합니다.
/// 폴러 자체는 출력 내용을 해석하지 않습니다.
pub async fn eventually<F, Fut>(spec: PollSpec, mut attempt: F) -> Result<PollReport, PollTimeout>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PollOutcome>,
{
    let start = Instant::now();
    let deadline = start + spec.timeout;
    let interval = spec.effective_interval();
    let mut attempts: u32 = 0;

    loop {
        attempts = attempts.saturating_add(1);
        metrics::counter!(m::POLL_ATTEMPTS_TOTAL).increment(1);

        let remaining = deadline.saturating_duration_since(Instant::now());
        let outcome = match tokio::time::timeout(remaining, attempt()).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => PollOutcome::ExecError("attempt exceeded poll deadline".to_owned()),
        };

        if outcome.is_matched() {
            let elapsed = start.elapsed();
            debug!(
                attempts,
                elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                "condition matched"
            );
            metrics::histogram!(m::POLL_DURATION_SECONDS, m::LABEL_RESULT => "matched")
                .record(elapsed.as_secs_f64());
            return Ok(PollReport { attempts, elapsed });
        }

        let now = Instant::now();
        if now >= deadline {
            let elapsed = start.elapsed();
            debug!(attempts, last = ?outcome, "condition not met before deadline");
            metrics::histogram!(m::POLL_DURATION_SECONDS, m::LABEL_RESULT => "timeout")
                .record(elapsed.as_secs_f64());
            return Err(PollTimeout {
                attempts,
                elapsed,
                last: outcome,
            });
        }

        debug!(attempt = attempts, outcome = ?outcome, "condition not met yet, retrying");
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

/// bool 술어 버전의 [`eventually`]. 조건 충족 여부만 반환합니다.
pub async fn eventually_true<F, Fut>(spec: PollSpec, mut predicate: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let attempt = move || {
        let fut = predicate();
        async move { PollOutcome::from_bool(fut.await) }
    };
    eventually(spec, attempt).await.is_ok()
}

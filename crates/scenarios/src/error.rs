//! 시나리오 에러 타입

/// 시나리오 상태/템플릿 에러
///
/// 모두 "파괴적 명령을 실행하기 전에" 발생하며, 해당 단계를 실패로 만듭니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScenarioError {
    /// 이전 단계에서 발견되지 않은 값 참조
    #[error("'{key}' was never discovered")]
    Undiscovered { key: String },

    /// 빈 값 저장 또는 참조
    #[error("'{key}' is empty")]
    EmptyValue { key: String },
}

//! 출력 매처 -- 명령 출력에 대한 교체 가능한 판정 로직
//!
//! 새 서브시스템 검증을 추가할 때 폴러를 건드리지 않고
//! [`OutputMatcher`] 구현만 추가하면 됩니다.

use std::fmt;

use crate::types::ExecOutput;

/// 명령 출력을 판정하는 trait
pub trait OutputMatcher: Send + Sync + fmt::Debug {
    /// 출력이 기대 조건을 충족하는지 판정합니다.
    fn matches(&self, output: &ExecOutput) -> bool;

    /// 사람이 읽을 수 있는 조건 설명 (로그/리포트용)
    fn describe(&self) -> String;
}

/// 명령이 성공하고 출력 전체가 기대 문자열과 같아야 함
///
/// TTY가 붙인 `\r\n` 등 앞뒤 공백은 비교 전에 제거합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactOutput(pub String);

impl ExactOutput {
    pub fn new(expected: impl Into<String>) -> Self {
        Self(expected.into())
    }
}

impl OutputMatcher for ExactOutput {
    fn matches(&self, output: &ExecOutput) -> bool {
        output.ok && output.text().trim() == self.0
    }

    fn describe(&self) -> String {
        format!("output equals {:?}", self.0)
    }
}

/// 명령이 성공하고 출력에 기대 문자열이 포함되어야 함
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainsOutput(pub String);

impl ContainsOutput {
    pub fn new(needle: impl Into<String>) -> Self {
        Self(needle.into())
    }
}

impl OutputMatcher for ContainsOutput {
    fn matches(&self, output: &ExecOutput) -> bool {
        output.ok && output.text().contains(&self.0)
    }

    fn describe(&self) -> String {
        format!("output contains {:?}", self.0)
    }
}

/// 명령 성공 여부만 확인
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandSucceeded;

impl OutputMatcher for CommandSucceeded {
    fn matches(&self, output: &ExecOutput) -> bool {
        output.ok
    }

    fn describe(&self) -> String {
        "command succeeds".to_owned()
    }
}

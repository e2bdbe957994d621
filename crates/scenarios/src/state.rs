//! 시나리오 상태 -- 한 시나리오 실행 안에서 단계 간에 전달되는 값

use std::collections::BTreeMap;

use crate::error::ScenarioError;

/// 시나리오 실행 하나가 단독으로 소유하는 값 저장소
///
/// 발견된 컨테이너 ID 등이 저장됩니다. 빈 값은 저장할 수 없으므로
/// 저장된 값은 항상 사용 가능합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioState {
    values: BTreeMap<String, String>,
}

impl ScenarioState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 값을 저장합니다. 빈 값(공백만 있는 값 포함)은 거부합니다.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ScenarioError> {
        let key = key.into();
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ScenarioError::EmptyValue { key });
        }
        self.values.insert(key, value);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// 값을 조회합니다. 없으면 [`ScenarioError::Undiscovered`]를 반환합니다.
    pub fn require(&self, key: &str) -> Result<&str, ScenarioError> {
        self.get(key).ok_or_else(|| ScenarioError::Undiscovered {
            key: key.to_owned(),
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 키 순서로 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

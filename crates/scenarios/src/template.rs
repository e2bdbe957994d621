//! 명령 템플릿 -- `{name}` placeholder를 시나리오 상태와 fixture로 치환
//!
//! placeholder 이름은 `[A-Za-z_][A-Za-z0-9_]*` 형식만 인식합니다.
//! 그 밖의 중괄호(`awk '{print $1}'` 등)는 그대로 유지됩니다.
//! 이름 형식의 중괄호를 그대로 쓰려면 `{{print}}`처럼 이중 중괄호로 이스케이프합니다.

use std::fmt;

use edgeproof_core::types::FixtureSet;

use crate::error::ScenarioError;
use crate::state::ScenarioState;

/// 텍스트 조각
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// placeholder를 포함한 명령 텍스트
///
/// `{name}`은 항상 placeholder입니다. `awk '{print}'`처럼 이름 형식의 중괄호를
/// 명령에 넣어야 하면 `awk '{{print}}'`로 작성합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    text: String,
    segments: Vec<Segment>,
}

impl CommandTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let segments = parse(&text);
        Self { text, segments }
    }

    /// 원본 텍스트
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// 등장 순서대로 placeholder 이름을 반환합니다.
    pub fn placeholders(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Placeholder(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// placeholder를 치환한 명령을 반환합니다.
    ///
    /// 시나리오 상태를 먼저 조회하고 없으면 fixture를 조회합니다.
    /// 어느 쪽에도 없거나 값이 비어 있으면 에러를 반환합니다.
    pub fn render(
        &self,
        state: &ScenarioState,
        fixtures: &FixtureSet,
    ) -> Result<String, ScenarioError> {
        let mut out = String::with_capacity(self.text.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => out.push_str(lookup(name, state, fixtures)?),
            }
        }
        Ok(out)
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for CommandTemplate {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for CommandTemplate {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// 상태 → fixture 순으로 값을 찾습니다.
pub(crate) fn lookup<'a>(
    name: &str,
    state: &'a ScenarioState,
    fixtures: &'a FixtureSet,
) -> Result<&'a str, ScenarioError> {
    let value = state
        .get(name)
        .or_else(|| fixtures.get(name))
        .ok_or_else(|| ScenarioError::Undiscovered {
            key: name.to_owned(),
        })?;
    if value.trim().is_empty() {
        return Err(ScenarioError::EmptyValue {
            key: name.to_owned(),
        });
    }
    Ok(value)
}

fn is_placeholder_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = text;

    while let Some(pos) = rest.find(['{', '}']) {
        literal.push_str(&rest[..pos]);
        let brace = &rest[pos..pos + 1];
        let after = &rest[pos + 1..];

        // `{{` and `}}` are escapes
        if after.starts_with(brace) {
            literal.push_str(brace);
            rest = &after[1..];
            continue;
        }
        if brace == "{" {
            if let Some(close) = after.find('}') {
                if is_placeholder_name(&after[..close]) {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(after[..close].to_owned()));
                    rest = &after[close + 1..];
                    continue;
                }
            }
        }
        literal.push_str(brace);
        rest = after;
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

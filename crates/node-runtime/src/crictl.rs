//! crictl 출력 파싱 및 런타임 컨테이너 명령 구성
//!
//! kind 노드 안의 컨테이너(kubelet이 관리하는 pod 컨테이너)는 Docker가 아니라
//! containerd가 실행하므로 `crictl`로 조회/정지/실행합니다.
//!
//! ```text
//! CONTAINER      IMAGE          CREATED        STATE    NAME          ATTEMPT  POD ID         POD
//! 3f1c2a9b8e7d   a1b2c3d4e5f6   2 minutes ago  Running  kube-flannel  0        9d8c7b6a5f4e   kube-flannel-ds-x
//! ```

use crate::error::NodeRuntimeError;

/// 실행 중인 컨테이너 목록 조회 명령
pub const PS_COMMAND: &str = "crictl ps";

/// `crictl ps` 헤더 첫 컬럼
const HEADER_PREFIX: &str = "CONTAINER";

/// 런타임 컨테이너 ID 최대 길이
const MAX_CONTAINER_ID_LEN: usize = 64;

/// `crictl ps` 출력에서 `needle`을 포함하는 첫 행의 컨테이너 ID(첫 컬럼)를 찾습니다.
///
/// 헤더 행은 건너뜁니다. 일치하는 행이 없으면 `None`을 반환합니다.
pub fn find_container_id<'a>(ps_output: &'a str, needle: &str) -> Option<&'a str> {
    ps_output
        .lines()
        .filter(|line| !line.trim_start().starts_with(HEADER_PREFIX))
        .find(|line| line.contains(needle))
        .and_then(|line| line.split_whitespace().next())
}

/// 런타임 컨테이너 ID를 검증합니다 (1-64자 ASCII hex).
pub fn validate_container_id(id: &str) -> Result<(), NodeRuntimeError> {
    if id.is_empty() || id.len() > MAX_CONTAINER_ID_LEN {
        return Err(NodeRuntimeError::InvalidContainerId {
            id: id.to_owned(),
            reason: format!("length {} (must be 1-{MAX_CONTAINER_ID_LEN})", id.len()),
        });
    }
    if !id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(NodeRuntimeError::InvalidContainerId {
            id: id.to_owned(),
            reason: "contains non-hex characters".to_owned(),
        });
    }
    Ok(())
}

/// 노드 셸에서 명령을 실행하는 argv
pub fn node_argv(command: &str) -> Vec<String> {
    vec!["/bin/bash".to_owned(), "-c".to_owned(), command.to_owned()]
}

/// 노드 안의 런타임 컨테이너에서 명령을 실행하는 argv
///
/// 호출 전에 [`validate_container_id`]로 ID를 검증해야 합니다.
pub fn container_argv(container_id: &str, command: &str) -> Vec<String> {
    vec![
        "crictl".to_owned(),
        "exec".to_owned(),
        "-i".to_owned(),
        container_id.to_owned(),
        "/bin/sh".to_owned(),
        "-c".to_owned(),
        command.to_owned(),
    ]
}

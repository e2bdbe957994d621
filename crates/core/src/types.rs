//! 도메인 타입 -- 시스템 전역에서 사용되는 공통 타입
//!
//! 실행 대상, 명령 결과, 클러스터 fixture, 파티션 상태를 정의합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 명령 실행 대상
///
/// 노드 컨테이너 이름은 설정으로 고정되며, 런타임 컨테이너 ID는
/// 시나리오 실행 중에 발견됩니다. 해당 프로세스가 정지되면 ID는 더 이상 유효하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionTarget {
    /// 노드 컨테이너 이름 (예: `openyurt-e2e-test-worker`)
    pub node: String,
    /// 노드 안의 런타임 컨테이너 ID (crictl exec 대상)
    pub container: Option<String>,
}

impl ExecutionTarget {
    /// 노드 자체에서 실행하는 대상을 생성합니다.
    pub fn node(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            container: None,
        }
    }

    /// 노드 안의 런타임 컨테이너에서 실행하는 대상을 생성합니다.
    pub fn container(node: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            container: Some(container.into()),
        }
    }
}

impl fmt::Display for ExecutionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.container {
            Some(id) => write!(f, "{}/{}", self.node, id),
            None => write!(f, "{}", self.node),
        }
    }
}

/// 원격 명령 결과
///
/// 원격 종료 코드가 0이 아니거나 실행 자체가 실패하면 `ok=false`입니다.
/// 두 경우는 호출자가 구분할 수 없습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// stdout/stderr 원본 바이트 (도착 순서)
    pub output: Vec<u8>,
    /// 성공 여부
    pub ok: bool,
}

impl ExecOutput {
    /// 성공 결과를 생성합니다.
    pub fn success(output: impl Into<Vec<u8>>) -> Self {
        Self {
            output: output.into(),
            ok: true,
        }
    }

    /// 실패 결과를 생성합니다.
    pub fn failure(output: impl Into<Vec<u8>>) -> Self {
        Self {
            output: output.into(),
            ok: false,
        }
    }

    /// 출력을 UTF-8 문자열로 변환합니다 (유효하지 않은 바이트는 대체 문자).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

/// 실행 시작 시 한 번 해석되는 클러스터 사실
///
/// 모든 시나리오가 실행되기 전에 성공적으로 해석되어야 하며,
/// 이후에는 읽기 전용으로 사용됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureSet {
    /// 두 번째 엣지 노드에서 실행 중인 nginx pod IP
    pub edge_pod_ip: String,
    /// nginx 서비스 cluster IP
    pub service_ip: String,
    /// DNS 서비스 cluster IP
    pub dns_service_ip: String,
    /// DNS pod가 실행 중인 노드 이름
    pub dns_node: String,
}

impl FixtureSet {
    /// 템플릿 placeholder 이름으로 fixture 값을 조회합니다.
    pub fn get(&self, name: &str) -> Option<&str> {
        match name {
            "edge_pod_ip" => Some(&self.edge_pod_ip),
            "service_ip" => Some(&self.service_ip),
            "dns_service_ip" => Some(&self.dns_service_ip),
            "dns_node" => Some(&self.dns_node),
            _ => None,
        }
    }
}

/// 클라우드 노드와 엣지 패브릭 사이의 네트워크 연결 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionState {
    /// 연결됨
    Connected,
    /// 연결 해제됨
    Disconnected,
}

impl fmt::Display for PartitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

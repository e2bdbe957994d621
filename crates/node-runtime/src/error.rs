//! 노드 런타임 에러 타입
//!
//! [`NodeRuntimeError`]는 Docker API 호출, 실행 대상 검증, 파티션 제어에서 발생하는 에러를 표현합니다.
//! `From<NodeRuntimeError> for EdgeproofError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use edgeproof_core::error::{EdgeproofError, ExecError};

/// 노드 런타임 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum NodeRuntimeError {
    /// Docker API 호출 실패
    #[error("docker api error: {0}")]
    DockerApi(String),

    /// Docker 소켓 연결 실패
    #[error("docker connection error: {0}")]
    DockerConnection(String),

    /// 노드 컨테이너를 찾을 수 없음
    #[error("node container not found: {0}")]
    NodeNotFound(String),

    /// 노드 컨테이너 이름이 유효하지 않음
    #[error("invalid node name '{name}': {reason}")]
    InvalidNodeName {
        /// 검증에 실패한 이름
        name: String,
        /// 실패 사유
        reason: String,
    },

    /// 런타임 컨테이너 ID가 유효하지 않음
    #[error("invalid container id '{id}': {reason}")]
    InvalidContainerId {
        /// 검증에 실패한 ID
        id: String,
        /// 실패 사유
        reason: String,
    },

    /// 네트워크 파티션 동작 실패
    #[error("partition {operation} on network '{network}' failed: {reason}")]
    Partition {
        /// disconnect 또는 reconnect
        operation: &'static str,
        /// 대상 Docker 네트워크
        network: String,
        /// 실패 사유
        reason: String,
    },
}

impl From<NodeRuntimeError> for EdgeproofError {
    fn from(err: NodeRuntimeError) -> Self {
        match &err {
            NodeRuntimeError::InvalidNodeName { name, .. } => {
                EdgeproofError::Exec(ExecError::InvalidTarget {
                    target: name.clone(),
                    reason: err.to_string(),
                })
            }
            NodeRuntimeError::InvalidContainerId { id, .. } => {
                EdgeproofError::Exec(ExecError::InvalidTarget {
                    target: id.clone(),
                    reason: err.to_string(),
                })
            }
            NodeRuntimeError::NodeNotFound(name) => EdgeproofError::Exec(ExecError::Failed {
                target: name.clone(),
                reason: err.to_string(),
            }),
            NodeRuntimeError::Partition { network, .. } => {
                EdgeproofError::Exec(ExecError::Failed {
                    target: network.clone(),
                    reason: err.to_string(),
                })
            }
            NodeRuntimeError::DockerApi(_) | NodeRuntimeError::DockerConnection(_) => {
                EdgeproofError::Exec(ExecError::Failed {
                    target: "docker".to_owned(),
                    reason: err.to_string(),
                })
            }
        }
    }
}

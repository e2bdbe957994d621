//! 네트워크 파티션 제어 -- 클라우드 노드와 엣지 패브릭 사이의 연결 해제/복구
//!
//! [`PartitionController`]는 클라우드 노드 컨테이너를 Docker 네트워크에서 분리하고 다시 연결합니다.
//! [`PartitionGuard`]는 분리 이후 재연결이 반드시 한 번 실행되도록 보장합니다.
//!
//! ```text
//! controller.partition() ──▶ PartitionGuard (armed)
//!                                 │
//!            scenarios ...        │
//!                                 ▼
//!                         guard.release()  ──▶ reconnect (1회)
//!                  or     drop(guard)      ──▶ reconnect spawn (백스톱)
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use edgeproof_core::metrics as m;
use edgeproof_core::types::PartitionState;

use crate::docker::DockerClient;
use crate::error::NodeRuntimeError;

/// 기본 동작 타임아웃
const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(30);
/// 기본 재시도 횟수
const DEFAULT_MAX_RETRIES: u32 = 2;
/// 기본 재시도 백오프 간격
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// 파티션 동작 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartitionOp {
    Disconnect,
    Reconnect,
}

impl PartitionOp {
    fn name(self) -> &'static str {
        match self {
            Self::Disconnect => "disconnect",
            Self::Reconnect => "reconnect",
        }
    }
}

/// 클라우드 노드의 네트워크 연결을 제어합니다.
///
/// 각 동작은 `action_timeout`으로 제한되고, 실패 시 선형 백오프로 재시도합니다.
pub struct PartitionController<D: DockerClient> {
    /// Docker 클라이언트
    docker: Arc<D>,
    /// 분리 대상 Docker 네트워크
    network: String,
    /// 클라우드 노드 컨테이너 이름
    cloud_node: String,
    /// 동작 타임아웃
    action_timeout: Duration,
    /// 재시도 최대 횟수
    max_retries: u32,
    /// 재시도 백오프 기본 간격
    retry_backoff_base: Duration,
}

impl<D: DockerClient> Clone for PartitionController<D> {
    fn clone(&self) -> Self {
        Self {
            docker: Arc::clone(&self.docker),
            network: self.network.clone(),
            cloud_node: self.cloud_node.clone(),
            action_timeout: self.action_timeout,
            max_retries: self.max_retries,
            retry_backoff_base: self.retry_backoff_base,
        }
    }
}

impl<D: DockerClient> PartitionController<D> {
    /// 기본 타임아웃/재시도 설정으로 컨트롤러를 생성합니다.
    pub fn new(docker: Arc<D>, network: impl Into<String>, cloud_node: impl Into<String>) -> Self {
        Self {
            docker,
            network: network.into(),
            cloud_node: cloud_node.into(),
            action_timeout: DEFAULT_ACTION_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff_base: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// 재시도 정책을 설정합니다.
    pub fn with_retry(
        mut self,
        action_timeout: Duration,
        max_retries: u32,
        retry_backoff_base: Duration,
    ) -> Self {
        self.action_timeout = action_timeout;
        self.max_retries = max_retries;
        self.retry_backoff_base = retry_backoff_base;
        self
    }

    /// 분리 대상 네트워크
    pub fn network(&self) -> &str {
        &self.network
    }

    /// 클라우드 노드 이름
    pub fn cloud_node(&self) -> &str {
        &self.cloud_node
    }

    /// 클라우드 노드를 네트워크에서 분리합니다.
    pub async fn disconnect(&self) -> Result<(), NodeRuntimeError> {
        self.run(PartitionOp::Disconnect).await
    }

    /// 클라우드 노드를 네트워크에 다시 연결합니다.
    pub async fn reconnect(&self) -> Result<(), NodeRuntimeError> {
        self.run(PartitionOp::Reconnect).await
    }

    /// 파티션을 생성하고 재연결을 책임지는 가드를 반환합니다.
    ///
    /// 분리가 실패해도 가드는 armed 상태로 반환됩니다.
    /// 부분적으로 적용된 분리가 있을 수 있으므로 재연결은 항상 필요합니다.
    pub async fn partition(&self) -> (PartitionGuard<D>, Result<(), NodeRuntimeError>) {
        let mut guard = PartitionGuard {
            controller: Some(self.clone()),
            state: PartitionState::Connected,
        };
        let result = self.disconnect().await;
        if result.is_ok() {
            guard.state = PartitionState::Disconnected;
        }
        (guard, result)
    }

    async fn run(&self, op: PartitionOp) -> Result<(), NodeRuntimeError> {
        info!(
            operation = op.name(),
            network = self.network.as_str(),
            node = self.cloud_node.as_str(),
            "executing partition operation"
        );

        let result = self.run_with_retry(op).await;

        let label = if result.is_ok() { "success" } else { "failure" };
        metrics::counter!(
            m::PARTITION_OPERATIONS_TOTAL,
            m::LABEL_OPERATION => op.name(),
            m::LABEL_RESULT => label
        )
        .increment(1);

        match &result {
            Ok(()) => info!(
                operation = op.name(),
                network = self.network.as_str(),
                "partition operation completed"
            ),
            Err(e) => error!(
                operation = op.name(),
                network = self.network.as_str(),
                error = %e,
                "partition operation failed"
            ),
        }
        result
    }

    async fn run_with_retry(&self, op: PartitionOp) -> Result<(), NodeRuntimeError> {
        let mut last_reason = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = self.retry_backoff_base * attempt;
                warn!(
                    operation = op.name(),
                    attempt,
                    backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                    "retrying partition operation"
                );
                tokio::time::sleep(backoff).await;
            }

            match tokio::time::timeout(self.action_timeout, self.run_once(op)).await {
                Ok(Ok(())) => return Ok(()),
                Ok(Err(e)) => last_reason = Some(e.to_string()),
                Err(_elapsed) => last_reason = Some("action timed out".to_owned()),
            }
        }

        Err(NodeRuntimeError::Partition {
            operation: op.name(),
            network: self.network.clone(),
            reason: last_reason.unwrap_or_else(|| "unknown error".to_owned()),
        })
    }

    async fn run_once(&self, op: PartitionOp) -> Result<(), NodeRuntimeError> {
        match op {
            PartitionOp::Disconnect => {
                self.docker
                    .disconnect_network(&self.cloud_node, &self.network)
                    .await
            }
            PartitionOp::Reconnect => {
                self.docker
                    .connect_network(&self.cloud_node, &self.network)
                    .await
            }
        }
    }
}

/// 파티션 재연결 가드
///
/// [`release`](Self::release)로 정확히 한 번 재연결합니다. 해제되지 않은 채 drop되면
/// 현재 tokio 런타임에 재연결을 spawn하고 에러를 기록합니다.
#[must_use = "dropping the guard without release() reconnects in the background"]
pub struct PartitionGuard<D: DockerClient> {
    controller: Option<PartitionController<D>>,
    state: PartitionState,
}

impl<D: DockerClient> PartitionGuard<D> {
    /// 가드 생성 시점의 분리 결과 상태
    pub fn state(&self) -> PartitionState {
        self.state
    }

    /// 재연결을 실행하고 가드를 해제합니다.
    pub async fn release(mut self) -> Result<(), NodeRuntimeError> {
        match self.controller.take() {
            Some(controller) => {
                let result = controller.reconnect().await;
                if result.is_ok() {
                    self.state = PartitionState::Connected;
                }
                result
            }
            None => Ok(()),
        }
    }
}

impl<D: DockerClient> Drop for PartitionGuard<D> {
    fn drop(&mut self) {
        let Some(controller) = self.controller.take() else {
            return;
        };

        error!(
            network = controller.network(),
            node = controller.cloud_node(),
            "partition guard dropped without release, reconnecting in background"
        );
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = controller.reconnect().await {
                        error!(error = %e, "background reconnect failed");
                    }
                });
            }
            Err(_) => error!(
                network = controller.network(),
                node = controller.cloud_node(),
                "no tokio runtime available, node left disconnected"
            ),
        }
    }
}

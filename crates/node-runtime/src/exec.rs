//! Docker 기반 원격 실행기
//!
//! [`DockerExecutor`]는 kind 노드 컨테이너에 `docker exec`로 명령을 실행합니다.
//! 대상에 런타임 컨테이너 ID가 있으면 노드 안에서 `crictl exec`로 한 번 더 감쌉니다.

use std::sync::Arc;

use tracing::{debug, warn};

use edgeproof_core::exec::RemoteExecutor;
use edgeproof_core::metrics as m;
use edgeproof_core::types::{ExecOutput, ExecutionTarget};

use crate::crictl;
use crate::docker::{DockerClient, validate_node_name};
use crate::error::NodeRuntimeError;

/// `docker exec` 기반 [`RemoteExecutor`] 구현
pub struct DockerExecutor<D: DockerClient> {
    docker: Arc<D>,
}

impl<D: DockerClient> DockerExecutor<D> {
    /// 새 실행기를 생성합니다.
    pub fn new(docker: Arc<D>) -> Self {
        Self { docker }
    }

    /// 대상과 명령으로 argv를 구성합니다. 식별자 검증에 실패하면 Docker를 호출하지 않습니다.
    fn build_argv(
        target: &ExecutionTarget,
        command: &str,
    ) -> Result<Vec<String>, NodeRuntimeError> {
        validate_node_name(&target.node)?;
        match &target.container {
            Some(id) => {
                crictl::validate_container_id(id)?;
                Ok(crictl::container_argv(id, command))
            }
            None => Ok(crictl::node_argv(command)),
        }
    }

    async fn try_run(
        &self,
        target: &ExecutionTarget,
        command: &str,
    ) -> Result<ExecOutput, NodeRuntimeError> {
        let argv = Self::build_argv(target, command)?;
        let result = self.docker.exec(&target.node, argv).await?;
        let ok = result.succeeded();
        debug!(
            target = %target,
            command,
            exit_code = ?result.exit_code,
            output_len = result.output.len(),
            "remote command finished"
        );
        Ok(ExecOutput {
            output: result.output,
            ok,
        })
    }
}

impl<D: DockerClient> RemoteExecutor for DockerExecutor<D> {
    async fn run(&self, target: &ExecutionTarget, command: &str) -> ExecOutput {
        let output = match self.try_run(target, command).await {
            Ok(output) => output,
            Err(e) => {
                warn!(target = %target, command, error = %e, "remote command could not run");
                ExecOutput::failure(Vec::new())
            }
        };

        let result = if output.ok { "success" } else { "failure" };
        metrics::counter!(m::REMOTE_EXEC_TOTAL, m::LABEL_RESULT => result).increment(1);
        output
    }
}

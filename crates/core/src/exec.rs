//! 원격 실행 trait -- 명령 실행 경계 정의

use std::future::Future;

use crate::types::{ExecOutput, ExecutionTarget};

/// 실행 대상에서 셸 명령을 실행하는 trait
///
/// 원격 종료 코드가 0이 아니어도 에러를 반환하지 않고 `ok=false`로 보고합니다.
/// 이 계층에서는 재시도하지 않으며, 재시도는 [`eventually`](crate::poll::eventually)의 책임입니다.
///
/// # 구현체
///
/// - `DockerExecutor` (`edgeproof-node-runtime`): kind 노드 컨테이너에 `docker exec`
/// - 테스트용 스크립트 실행기
pub trait RemoteExecutor: Send + Sync + 'static {
    /// 대상에서 명령을 실행하고 원본 출력과 성공 여부를 반환합니다.
    fn run(
        &self,
        target: &ExecutionTarget,
        command: &str,
    ) -> impl Future<Output = ExecOutput> + Send;
}

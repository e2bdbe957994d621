//! # edgeproof-node-runtime
//!
//! kind 노드 컨테이너에 대한 명령 실행과 네트워크 파티션 제어를 담당합니다.
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`NodeRuntimeError`)
//! - [`docker`]: Docker API abstraction (`DockerClient` trait, `BollardDockerClient`)
//! - [`crictl`]: `crictl ps` parsing and runtime container argv construction
//! - [`exec`]: `RemoteExecutor` implementation (`DockerExecutor`)
//! - [`partition`]: Cloud-node partition control (`PartitionController`, `PartitionGuard`)
//!
//! # Architecture
//!
//! ```text
//! Scenario step --run(target, cmd)--> DockerExecutor --exec--> node container
//!                                                               └─ crictl exec --> pod container
//!
//! Orchestrator --partition()--> PartitionController --disconnect/connect--> docker network
//! ```

pub mod crictl;
pub mod docker;
pub mod error;
pub mod exec;
pub mod partition;

// --- Public API Re-exports ---

// Docker API
pub use docker::{BollardDockerClient, DockerClient, ExecResult, validate_node_name};

// Error
pub use error::NodeRuntimeError;

// Executor
pub use exec::DockerExecutor;

// Partition
pub use partition::{PartitionController, PartitionGuard};

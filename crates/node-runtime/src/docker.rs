//! Docker API abstraction for testability.
//!
//! The [`DockerClient`] trait abstracts the bollard Docker API, allowing
//! production code to use [`BollardDockerClient`] while tests use `MockDockerClient`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────────────┐
//! │DockerExecutor│   │ PartitionController │
//! └──────┬───────┘   └──────────┬──────────┘
//!        │                      │
//!        ▼                      ▼
//!          ┌─────────────┐
//!          │DockerClient │ (trait)
//!          └─────────────┘
//!             │     │
//!             ▼     ▼
//!        ┌───────┐ ┌────┐
//!        │Bollard│ │Mock│
//!        └───┬───┘ └────┘
//!            │
//!            ▼
//!      Docker Daemon (kind node containers)
//! ```
//!
//! # Node Name Validation
//!
//! All methods that accept a node container name validate it before calling Docker:
//! - Must be 1-128 characters
//! - Must start with an ASCII alphanumeric character
//! - Remaining characters must be ASCII alphanumeric or one of `_ . -`

use std::future::Future;
use std::sync::Arc;

use bollard::errors::Error as BollardError;
use futures_util::StreamExt;
use tracing::{debug, warn};

use crate::error::NodeRuntimeError;

/// Maximum node container name length accepted by [`validate_node_name`].
const MAX_NODE_NAME_LEN: usize = 128;

/// Validates a node container name to prevent injection into Docker API paths.
pub fn validate_node_name(name: &str) -> Result<(), NodeRuntimeError> {
    let invalid = |reason: String| NodeRuntimeError::InvalidNodeName {
        name: name.to_owned(),
        reason,
    };

    if name.is_empty() || name.len() > MAX_NODE_NAME_LEN {
        return Err(invalid(format!(
            "length {} (must be 1-{MAX_NODE_NAME_LEN})",
            name.len()
        )));
    }
    let mut chars = name.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid("must start with an alphanumeric character".to_owned()));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')) {
        return Err(invalid("contains characters outside [a-zA-Z0-9_.-]".to_owned()));
    }
    Ok(())
}

/// Result of a finished `docker exec`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// stdout and stderr, in arrival order.
    pub output: Vec<u8>,
    /// Exit code reported by `inspect_exec`, if the process finished.
    pub exit_code: Option<i64>,
}

impl ExecResult {
    /// Returns `true` only when the process finished with exit code 0.
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Trait abstracting Docker API operations.
///
/// All Docker API calls go through this trait, enabling testability via mocking.
/// The trait is `Send + Sync + 'static`, allowing safe sharing across async contexts.
///
/// # Implementations
///
/// - [`BollardDockerClient`]: Production implementation using the `bollard` library
/// - `MockDockerClient`: Test implementation with configurable responses (available in tests only)
///
/// # Error Handling
///
/// - **404 errors**: Converted to `NodeRuntimeError::NodeNotFound`
/// - **Connection errors**: Wrapped as `NodeRuntimeError::DockerConnection`
/// - **Everything else**: Wrapped as `NodeRuntimeError::DockerApi`
pub trait DockerClient: Send + Sync + 'static {
    /// Runs `argv` inside the node container and waits for it to finish.
    ///
    /// A non-zero exit code is not an error; it is reported in [`ExecResult::exit_code`].
    ///
    /// # Errors
    ///
    /// - `NodeRuntimeError::InvalidNodeName`: Invalid node name
    /// - `NodeRuntimeError::NodeNotFound`: Node container does not exist (404)
    /// - `NodeRuntimeError::DockerApi`: Exec could not be created or started
    fn exec(
        &self,
        node: &str,
        argv: Vec<String>,
    ) -> impl Future<Output = Result<ExecResult, NodeRuntimeError>> + Send;

    /// Disconnects a node container from a network.
    ///
    /// Uses `force: true`. A container that is already disconnected counts as success.
    fn disconnect_network(
        &self,
        node: &str,
        network: &str,
    ) -> impl Future<Output = Result<(), NodeRuntimeError>> + Send;

    /// Connects a node container to a network.
    ///
    /// A container that is already connected counts as success.
    fn connect_network(
        &self,
        node: &str,
        network: &str,
    ) -> impl Future<Output = Result<(), NodeRuntimeError>> + Send;

    /// Checks Docker daemon connectivity.
    ///
    /// # Errors
    ///
    /// Returns `NodeRuntimeError::DockerConnection` if the daemon is unreachable.
    fn ping(&self) -> impl Future<Output = Result<(), NodeRuntimeError>> + Send;
}

/// Production Docker client implementation using `bollard`.
///
/// Communicates with the Docker daemon via a Unix socket.
/// Internally uses `Arc<bollard::Docker>` for safe sharing across async tasks.
///
/// # Examples
///
/// ```ignore
/// use edgeproof_node_runtime::BollardDockerClient;
///
/// // Connect to default Docker socket
/// let client = BollardDockerClient::connect_local()?;
///
/// // Or connect to a specific socket
/// let client = BollardDockerClient::connect_with_socket("/run/docker.sock")?;
/// # Ok::<(), edgeproof_node_runtime::NodeRuntimeError>(())
/// ```
pub struct BollardDockerClient {
    docker: Arc<bollard::Docker>,
}

impl BollardDockerClient {
    /// Connects to Docker using the default local socket.
    ///
    /// # Errors
    ///
    /// Returns `NodeRuntimeError::DockerConnection` if the connection fails.
    pub fn connect_local() -> Result<Self, NodeRuntimeError> {
        let docker = bollard::Docker::connect_with_local_defaults().map_err(|e| {
            NodeRuntimeError::DockerConnection(format!("failed to connect to docker: {e}"))
        })?;
        Ok(Self {
            docker: Arc::new(docker),
        })
    }

    /// Connects to Docker using a specific socket path.
    pub fn connect_with_socket(socket_path: &str) -> Result<Self, NodeRuntimeError> {
        let docker =
            bollard::Docker::connect_with_socket(socket_path, 120, bollard::API_DEFAULT_VERSION)
                .map_err(|e| {
                    NodeRuntimeError::DockerConnection(format!(
                        "failed to connect to docker at {socket_path}: {e}"
                    ))
                })?;
        Ok(Self {
            docker: Arc::new(docker),
        })
    }

    /// Connects to the configured socket, or the platform default when `socket_path` is empty.
    pub fn connect(socket_path: &str) -> Result<Self, NodeRuntimeError> {
        if socket_path.is_empty() {
            Self::connect_local()
        } else {
            Self::connect_with_socket(socket_path)
        }
    }
}

/// Maps a bollard error for a node-scoped call.
fn map_node_error(node: &str, context: &str, e: BollardError) -> NodeRuntimeError {
    match e {
        BollardError::DockerResponseServerError {
            status_code: 404, ..
        } => NodeRuntimeError::NodeNotFound(node.to_owned()),
        other => NodeRuntimeError::DockerApi(format!("{context} on '{node}' failed: {other}")),
    }
}

/// Returns `true` if the daemon rejected the call because the container is
/// already in the requested network state.
fn is_already_in_state(e: &BollardError, marker: &str) -> bool {
    match e {
        BollardError::DockerResponseServerError {
            status_code,
            message,
        } => *status_code == 403 && message.contains(marker),
        _ => false,
    }
}

impl DockerClient for BollardDockerClient {
    async fn exec(&self, node: &str, argv: Vec<String>) -> Result<ExecResult, NodeRuntimeError> {
        validate_node_name(node)?;

        use bollard::exec::{CreateExecOptions, StartExecResults};

        let created = self
            .docker
            .create_exec(
                node,
                CreateExecOptions {
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    cmd: Some(argv),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| map_node_error(node, "create exec", e))?;

        let mut output = Vec::new();
        match self
            .docker
            .start_exec(&created.id, None)
            .await
            .map_err(|e| map_node_error(node, "start exec", e))?
        {
            StartExecResults::Attached {
                output: mut stream,
                ..
            } => {
                while let Some(chunk) = stream.next().await {
                    match chunk {
                        Ok(log) => output.extend_from_slice(&log.into_bytes()),
                        Err(e) => {
                            // Partial output is still useful for matching/diagnostics
                            warn!(node, error = %e, "exec output stream ended with error");
                            break;
                        }
                    }
                }
            }
            StartExecResults::Detached => {
                debug!(node, "exec started detached, no output collected");
            }
        }

        let inspected = self
            .docker
            .inspect_exec(&created.id)
            .await
            .map_err(|e| map_node_error(node, "inspect exec", e))?;

        Ok(ExecResult {
            output,
            exit_code: inspected.exit_code,
        })
    }

    async fn disconnect_network(&self, node: &str, network: &str) -> Result<(), NodeRuntimeError> {
        validate_node_name(node)?;

        use bollard::network::DisconnectNetworkOptions;

        match self
            .docker
            .disconnect_network(
                network,
                DisconnectNetworkOptions {
                    container: node.to_owned(),
                    force: true,
                },
            )
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if is_already_in_state(&e, "is not connected") => {
                debug!(node, network, "node already disconnected from network");
                Ok(())
            }
            Err(e) => Err(map_node_error(node, "network disconnect", e)),
        }
    }

    async fn connect_network(&self, node: &str, network: &str) -> Result<(), NodeRuntimeError> {
        validate_node_name(node)?;

        use bollard::models::EndpointSettings;
        use bollard::network::ConnectNetworkOptions;

        match self
            .docker
            .connect_network(
                network,
                ConnectNetworkOptions {
                    container: node.to_owned(),
                    endpoint_config: EndpointSettings::default(),
                },
            )
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if is_already_in_state(&e, "already exists") => {
                debug!(node, network, "node already connected to network");
                Ok(())
            }
            Err(e) => Err(map_node_error(node, "network connect", e)),
        }
    }

    async fn ping(&self) -> Result<(), NodeRuntimeError> {
        self.docker
            .ping()
            .await
            .map_err(|e| NodeRuntimeError::DockerConnection(format!("ping failed: {e}")))?;
        Ok(())
    }
}

/// 테스트용 Mock Docker 클라이언트
///
/// 명령 문자열에 포함된 키워드로 exec 응답을 고르고, 모든 호출을 기록합니다.
#[cfg(test)]
#[derive(Default)]
pub struct MockDockerClient {
    /// (키워드, 응답) 목록. argv를 공백으로 이은 문자열에 키워드가 포함되면 해당 응답을 반환
    pub exec_responses: Vec<(String, ExecResult)>,
    /// 네트워크 호출이 실패할 남은 횟수
    pub network_failures: std::sync::atomic::AtomicU32,
    /// 네트워크 호출 지연 시간
    pub network_delay: std::time::Duration,
    /// 호출 기록 (예: `exec worker crictl ps`, `disconnect kind control-plane`)
    pub calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockDockerClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 키워드에 대한 exec 응답을 추가합니다.
    pub fn with_exec(mut self, keyword: &str, output: &str, exit_code: i64) -> Self {
        self.exec_responses.push((
            keyword.to_owned(),
            ExecResult {
                output: output.as_bytes().to_vec(),
                exit_code: Some(exit_code),
            },
        ));
        self
    }

    /// 처음 `n`번의 네트워크 호출이 실패하도록 설정합니다.
    pub fn with_network_failures(self, n: u32) -> Self {
        self.network_failures
            .store(n, std::sync::atomic::Ordering::SeqCst);
        self
    }

    /// 네트워크 호출에 지연을 추가합니다.
    pub fn with_network_delay(mut self, delay: std::time::Duration) -> Self {
        self.network_delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    async fn network_call(&self, call: String) -> Result<(), NodeRuntimeError> {
        use std::sync::atomic::Ordering;

        self.record(call);
        if !self.network_delay.is_zero() {
            tokio::time::sleep(self.network_delay).await;
        }
        let remaining = self.network_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.network_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(NodeRuntimeError::DockerApi("mock failure".to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
impl DockerClient for MockDockerClient {
    async fn exec(&self, node: &str, argv: Vec<String>) -> Result<ExecResult, NodeRuntimeError> {
        validate_node_name(node)?;
        let joined = argv.join(" ");
        self.record(format!("exec {node} {joined}"));
        Ok(self
            .exec_responses
            .iter()
            .find(|(keyword, _)| joined.contains(keyword.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or(ExecResult {
                output: Vec::new(),
                exit_code: Some(0),
            }))
    }

    async fn disconnect_network(&self, node: &str, network: &str) -> Result<(), NodeRuntimeError> {
        self.network_call(format!("disconnect {network} {node}"))
            .await
    }

    async fn connect_network(&self, node: &str, network: &str) -> Result<(), NodeRuntimeError> {
        self.network_call(format!("connect {network} {node}")).await
    }

    async fn ping(&self) -> Result<(), NodeRuntimeError> {
        Ok(())
    }
}

//! Mock Docker client recording network operations.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use edgeproof_node_runtime::{DockerClient, ExecResult, NodeRuntimeError};

/// Records `disconnect <network> <node>` / `connect <network> <node>` calls.
#[derive(Default)]
pub struct MockDocker {
    disconnect_failures: AtomicU32,
    connect_failures: AtomicU32,
    ping_fails: bool,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockDocker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first `n` disconnect attempts fail.
    pub fn failing_disconnect(self, n: u32) -> Self {
        self.disconnect_failures.store(n, Ordering::SeqCst);
        self
    }

    /// The first `n` connect attempts fail.
    pub fn failing_connect(self, n: u32) -> Self {
        self.connect_failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.ping_fails = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn network_call(&self, call: String, failures: &AtomicU32) -> Result<(), NodeRuntimeError> {
        self.calls.lock().unwrap().push(call);
        let remaining = failures.load(Ordering::SeqCst);
        if remaining > 0 {
            failures.store(remaining - 1, Ordering::SeqCst);
            return Err(NodeRuntimeError::DockerApi("mock network failure".to_owned()));
        }
        Ok(())
    }
}

impl DockerClient for MockDocker {
    async fn exec(&self, node: &str, argv: Vec<String>) -> Result<ExecResult, NodeRuntimeError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("exec {node} {}", argv.join(" ")));
        Ok(ExecResult {
            output: Vec::new(),
            exit_code: Some(0),
        })
    }

    async fn disconnect_network(&self, node: &str, network: &str) -> Result<(), NodeRuntimeError> {
        self.network_call(format!("disconnect {network} {node}"), &self.disconnect_failures)
    }

    async fn connect_network(&self, node: &str, network: &str) -> Result<(), NodeRuntimeError> {
        self.network_call(format!("connect {network} {node}"), &self.connect_failures)
    }

    async fn ping(&self) -> Result<(), NodeRuntimeError> {
        if self.ping_fails {
            return Err(NodeRuntimeError::DockerConnection("mock daemon down".to_owned()));
        }
        Ok(())
    }
}

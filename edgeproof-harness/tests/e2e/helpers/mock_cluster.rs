//! In-memory cluster API.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use edgeproof_harness::{ClusterClient, HarnessError};

/// Namespaces live in a set; lookups return configured values.
pub struct MockCluster {
    namespaces: Mutex<HashSet<String>>,
    pod_ip: String,
    service_ip: String,
    dns_service_ip: String,
    dns_nodes: Vec<String>,
    /// Checks for which a deleted namespace still shows as present.
    terminating_checks: AtomicU32,
    fail_delete: bool,
    calls: Mutex<Vec<String>>,
}

impl Default for MockCluster {
    fn default() -> Self {
        Self {
            namespaces: Mutex::new(HashSet::new()),
            pod_ip: "10.244.2.7".to_owned(),
            service_ip: "10.0.0.5".to_owned(),
            dns_service_ip: "10.96.0.10".to_owned(),
            dns_nodes: vec!["openyurt-e2e-test-worker2".to_owned()],
            terminating_checks: AtomicU32::new(0),
            fail_delete: false,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[allow(dead_code)]
impl MockCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Namespace left over from an earlier run.
    pub fn with_existing_namespace(self, name: &str) -> Self {
        self.namespaces.lock().unwrap().insert(name.to_owned());
        self
    }

    /// Pod has no IP assigned.
    pub fn without_pod_ip(mut self) -> Self {
        self.pod_ip = String::new();
        self
    }

    pub fn with_dns_nodes(mut self, nodes: &[&str]) -> Self {
        self.dns_nodes = nodes.iter().map(|n| (*n).to_owned()).collect();
        self
    }

    /// A deleted namespace stays visible for `n` existence checks.
    pub fn terminating_for(self, n: u32) -> Self {
        self.terminating_checks.store(n, Ordering::SeqCst);
        self
    }

    pub fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn has_namespace(&self, name: &str) -> bool {
        self.namespaces.lock().unwrap().contains(name)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ClusterClient for MockCluster {
    async fn create_namespace(&self, name: &str) -> Result<(), HarnessError> {
        self.record(format!("create {name}"));
        self.namespaces.lock().unwrap().insert(name.to_owned());
        Ok(())
    }

    async fn delete_namespace(&self, name: &str) -> Result<(), HarnessError> {
        self.record(format!("delete {name}"));
        if self.fail_delete {
            return Err(HarnessError::Cluster("mock delete forbidden".to_owned()));
        }
        self.namespaces.lock().unwrap().remove(name);
        Ok(())
    }

    async fn namespace_exists(&self, name: &str) -> Result<bool, HarnessError> {
        let remaining = self.terminating_checks.load(Ordering::SeqCst);
        if remaining > 0 {
            self.terminating_checks.store(remaining - 1, Ordering::SeqCst);
            return Ok(true);
        }
        Ok(self.namespaces.lock().unwrap().contains(name))
    }

    async fn pod_ip(&self, _namespace: &str, name: &str) -> Result<String, HarnessError> {
        self.record(format!("get pod {name}"));
        Ok(self.pod_ip.clone())
    }

    async fn service_cluster_ip(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<String, HarnessError> {
        self.record(format!("get service {namespace}/{name}"));
        if namespace == "kube-system" {
            Ok(self.dns_service_ip.clone())
        } else {
            Ok(self.service_ip.clone())
        }
    }

    async fn pod_nodes(
        &self,
        _namespace: &str,
        selector: &str,
    ) -> Result<Vec<String>, HarnessError> {
        self.record(format!("list pods {selector}"));
        Ok(self.dns_nodes.clone())
    }
}

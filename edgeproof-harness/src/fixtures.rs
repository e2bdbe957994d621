//! Fixture resolution.
//!
//! Resolves the cluster facts every scenario reads: the nginx pod IP on the
//! second edge node, the nginx and DNS service cluster IPs, and the node that
//! hosts a DNS pod. Each lookup is polled with the unscoped spec; an empty
//! value counts as unresolved.

use std::future::Future;
use std::sync::OnceLock;

use tracing::info;

use edgeproof_core::config::EdgeproofConfig;
use edgeproof_core::poll::{PollOutcome, PollSpec, eventually};
use edgeproof_core::types::FixtureSet;

use crate::cluster::ClusterClient;
use crate::error::HarnessError;

/// Resolves the [`FixtureSet`] or fails before anything destructive happens.
pub async fn resolve_fixtures<C: ClusterClient>(
    cluster: &C,
    config: &EdgeproofConfig,
    spec: PollSpec,
) -> Result<FixtureSet, HarnessError> {
    let workload = config.cluster.workload_namespace.as_str();
    let system = config.cluster.system_namespace.as_str();

    let edge_pod_ip = poll_value(spec, "nginx pod ip", move || {
        cluster.pod_ip(workload, &config.cluster.nginx_pod)
    })
    .await?;
    info!(
        pod = config.cluster.nginx_pod.as_str(),
        ip = edge_pod_ip.as_str(),
        "resolved edge pod ip"
    );

    let service_ip = poll_value(spec, "nginx service cluster ip", move || {
        cluster.service_cluster_ip(workload, &config.cluster.nginx_service)
    })
    .await?;
    info!(
        service = config.cluster.nginx_service.as_str(),
        ip = service_ip.as_str(),
        "resolved service ip"
    );

    let dns_service_ip = poll_value(spec, "dns service cluster ip", move || {
        cluster.service_cluster_ip(system, &config.cluster.dns_service)
    })
    .await?;
    info!(
        service = config.cluster.dns_service.as_str(),
        ip = dns_service_ip.as_str(),
        "resolved dns service ip"
    );

    let dns_node = poll_value(spec, "node hosting a dns pod", move || async move {
        let nodes = cluster.pod_nodes(system, &config.cluster.dns_selector).await?;
        Ok(pick_dns_node(&nodes, config))
    })
    .await?;
    info!(node = dns_node.as_str(), "resolved dns node");

    Ok(FixtureSet {
        edge_pod_ip,
        service_ip,
        dns_service_ip,
        dns_node,
    })
}

/// Prefers the second edge node, then the first. Any other placement is unresolved.
fn pick_dns_node(nodes: &[String], config: &EdgeproofConfig) -> String {
    [&config.nodes.edge_node2, &config.nodes.edge_node]
        .into_iter()
        .find(|candidate| nodes.iter().any(|n| n == *candidate))
        .cloned()
        .unwrap_or_default()
}

async fn poll_value<F, Fut>(
    spec: PollSpec,
    what: &str,
    mut lookup: F,
) -> Result<String, HarnessError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, HarnessError>>,
{
    let found = OnceLock::new();
    let found_ref = &found;

    let result = eventually(spec, move || {
        let fut = lookup();
        async move {
            match fut.await {
                Ok(value) if !value.is_empty() => {
                    let _ = found_ref.set(value);
                    PollOutcome::Matched
                }
                Ok(_) => PollOutcome::NotMatched,
                Err(e) => PollOutcome::ExecError(e.to_string()),
            }
        }
    })
    .await;

    match (result, found.into_inner()) {
        (Ok(_), Some(value)) => Ok(value),
        (Ok(_), None) => Err(HarnessError::Setup(format!(
            "{what} resolved to an empty value"
        ))),
        (Err(timeout), _) => {
            let last = match timeout.last {
                PollOutcome::ExecError(reason) => reason,
                _ => "empty value".to_owned(),
            };
            Err(HarnessError::Setup(format!(
                "failed to resolve {what} after {} attempts: {last}",
                timeout.attempts
            )))
        }
    }
}

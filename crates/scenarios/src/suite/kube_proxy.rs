//! kube-proxy 정지 및 iptables 초기화 후 서비스 IP 도달성 복구 검증

use edgeproof_core::config::EdgeproofConfig;
use edgeproof_core::matcher::ContainsOutput;

use crate::scenario::Scenario;
use crate::step::{Step, TargetRef};

use super::verify_spec;

pub const NAME: &str = "kube-proxy";

pub fn scenario(config: &EdgeproofConfig) -> Scenario {
    let node = config.nodes.edge_node.as_str();
    let edge = TargetRef::node(node);

    Scenario::new(NAME, "stop kube-proxy, flush iptables and reach the service ip")
        .step(Step::discover(
            "find kube-proxy container",
            edge.clone(),
            "kube_proxy",
            "kube-proxy",
            "fail to get kube-proxy container ID",
        ))
        .step(Step::action(
            "stop kube-proxy",
            edge.clone(),
            "crictl stop {kube_proxy}",
            "fail to stop kube-proxy",
        ))
        .step(Step::action(
            "flush iptables",
            edge.clone(),
            "iptables -F",
            format!("fail to remove iptables on node {node}"),
        ))
        .step(Step::verify(
            "curl service ip",
            edge,
            "curl -s {service_ip}",
            ContainsOutput::new("nginx"),
            Some(verify_spec(config, config.scenarios.kube_proxy_timeout_secs)),
            format!(
                "fail to read curl response from service: {}",
                config.cluster.nginx_service
            ),
        ))
}

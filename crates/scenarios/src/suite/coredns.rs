//! CoreDNS 정지 후 서비스 이름 조회 검증 (현재 미지원)

use edgeproof_core::config::EdgeproofConfig;
use edgeproof_core::matcher::ContainsOutput;

use crate::scenario::Scenario;
use crate::step::{Step, TargetRef};

use super::verify_spec;

pub const NAME: &str = "coredns";

pub fn scenario(config: &EdgeproofConfig) -> Scenario {
    let dns_node = TargetRef::fixture_node("dns_node");
    let fqdn = format!(
        "{}.{}.svc.cluster.local",
        config.cluster.nginx_service, config.cluster.workload_namespace
    );

    Scenario::new(NAME, "stop coredns on its node and resolve a service name")
        .expected_unsupported("current coredns does not support edge-autonomy")
        .step(Step::discover(
            "find coredns container",
            dns_node.clone(),
            "coredns",
            "coredns",
            "fail to get coredns container ID",
        ))
        .step(Step::action(
            "stop coredns",
            dns_node,
            "crictl stop {coredns}",
            "fail to stop coredns",
        ))
        .step(Step::verify(
            "dig service name",
            TargetRef::node(config.nodes.edge_node.as_str()),
            format!("dig @{{dns_service_ip}} {fqdn}"),
            ContainsOutput::new("NOERROR"),
            Some(verify_spec(config, config.scenarios.coredns_timeout_secs)),
            "DNS resolution contains error, coreDNS dig failed",
        ))
}

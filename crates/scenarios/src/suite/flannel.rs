//! CNI(flannel) 컨테이너 정지 후 교차 노드 pod 도달성 검증

use edgeproof_core::config::EdgeproofConfig;
use edgeproof_core::matcher::ContainsOutput;

use crate::scenario::Scenario;
use crate::step::{Step, TargetRef};

use super::verify_spec;

pub const NAME: &str = "flannel";

pub fn scenario(config: &EdgeproofConfig) -> Scenario {
    let node = config.nodes.edge_node.as_str();
    let edge = TargetRef::node(node);

    Scenario::new(NAME, "stop the flannel container and reach a pod on another edge node")
        .step(Step::discover(
            "find flannel container",
            edge.clone(),
            "flannel",
            "kube-flannel",
            "fail to get flannel container ID",
        ))
        .step(Step::action(
            "stop flannel",
            edge.clone(),
            "crictl stop {flannel}",
            "fail to stop flannel",
        ))
        .step(Step::discover(
            "find nginx container",
            edge,
            "nginx",
            config.cluster.nginx_service.as_str(),
            "fail to get nginx container ID",
        ))
        .step(Step::verify(
            "curl peer pod ip",
            TargetRef::container(node, "nginx"),
            "curl -s {edge_pod_ip}",
            ContainsOutput::new("nginx"),
            Some(verify_spec(config, config.scenarios.flannel_timeout_secs)),
            "cross-node pod reachability not restored",
        ))
}

//! kubelet 재시작 후 노드 로컬 서비스 유지 검증

use edgeproof_core::config::EdgeproofConfig;
use edgeproof_core::matcher::{ContainsOutput, ExactOutput};

use crate::scenario::Scenario;
use crate::step::{Step, TargetRef};

use super::verify_spec;

pub const NAME: &str = "kubelet";

pub fn scenario(config: &EdgeproofConfig) -> Scenario {
    let edge = TargetRef::node(config.nodes.edge_node.as_str());

    Scenario::new(NAME, "restart kubelet on the edge node while partitioned")
        .step(Step::action(
            "restart kubelet",
            edge.clone(),
            "systemctl restart kubelet",
            "fail to restart kubelet",
        ))
        .step(Step::verify(
            "kubelet healthz",
            edge.clone(),
            "curl -s http://127.0.0.1:10248/healthz",
            ExactOutput::new("ok"),
            Some(verify_spec(config, config.scenarios.kubelet_timeout_secs)),
            "fail to check kubelet health",
        ))
        .step(Step::verify(
            "local nginx serves",
            edge,
            "curl -s http://127.0.0.1:80",
            ContainsOutput::new("nginx"),
            None,
            "nginx pod not running",
        ))
}

//! yurthub 컨테이너 정지 후 로컬 hub healthz 복구 검증

use edgeproof_core::config::EdgeproofConfig;
use edgeproof_core::matcher::ContainsOutput;

use crate::scenario::Scenario;
use crate::step::{Step, TargetRef};

use super::verify_spec;

pub const NAME: &str = "yurthub";

pub fn scenario(config: &EdgeproofConfig) -> Scenario {
    let edge = TargetRef::node(config.nodes.edge_node.as_str());

    Scenario::new(NAME, "stop yurthub and wait for it to serve from its local cache")
        .step(Step::discover(
            "find yurthub container",
            edge.clone(),
            "yurthub",
            "yurt-hub",
            "fail to get yurthub container ID",
        ))
        .step(Step::action(
            "stop yurthub",
            edge.clone(),
            "crictl stop {yurthub}",
            "fail to stop yurthub",
        ))
        .step(Step::verify(
            "yurthub healthz",
            edge,
            "curl -s http://127.0.0.1:10267/v1/healthz",
            ContainsOutput::new("OK"),
            Some(verify_spec(config, config.scenarios.yurthub_timeout_secs)),
            "fail to check yurthub health",
        ))
}

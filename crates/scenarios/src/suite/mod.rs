//! 엣지 자율성 시나리오 모음
//!
//! 실행 순서는 항상 kubelet, flannel, yurthub, kube-proxy, coredns 입니다.
//! 각 시나리오는 같은 노드의 런타임/패킷 필터 상태를 교란하므로 동시에 실행하지 않습니다.

pub mod coredns;
pub mod flannel;
pub mod kube_proxy;
pub mod kubelet;
pub mod yurthub;

use std::time::Duration;

use edgeproof_core::config::EdgeproofConfig;
use edgeproof_core::poll::PollSpec;

use crate::scenario::Scenario;

/// 시나리오별 검증 폴링 설정
pub(crate) fn verify_spec(config: &EdgeproofConfig, timeout_secs: u64) -> PollSpec {
    PollSpec::scoped(
        Duration::from_secs(timeout_secs),
        Duration::from_millis(config.scenarios.verify_interval_ms),
    )
}

/// 필터를 적용하지 않은 전체 시나리오 목록
pub fn all_scenarios(config: &EdgeproofConfig) -> Vec<Scenario> {
    vec![
        kubelet::scenario(config),
        flannel::scenario(config),
        yurthub::scenario(config),
        kube_proxy::scenario(config),
        coredns::scenario(config),
    ]
}

/// `scenarios.only` / `scenarios.skip` 필터를 적용한 시나리오 목록
pub fn edge_autonomy_suite(config: &EdgeproofConfig) -> Vec<Scenario> {
    all_scenarios(config)
        .into_iter()
        .filter(|s| config.scenarios.is_selected(&s.name))
        .collect()
}

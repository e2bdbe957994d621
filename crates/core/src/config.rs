//! 설정 관리 -- edgeproof.toml 파싱 및 런타임 설정
//!
//! [`EdgeproofConfig`]는 하네스 전체 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`EDGEPROOF_NODES_CLOUD_NODE=...` 형식)
//! 3. 설정 파일 (`edgeproof.toml`)
//! 4. 기본값 (`Default` 구현, kind 기반 OpenYurt e2e 클러스터 기준)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), edgeproof_core::error::EdgeproofError> {
//! use edgeproof_core::config::EdgeproofConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = EdgeproofConfig::load("edgeproof.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = EdgeproofConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, EdgeproofError};

/// 시나리오 이름 (실행 순서)
pub const SCENARIO_NAMES: [&str; 5] = ["kubelet", "flannel", "yurthub", "kube-proxy", "coredns"];

/// 설정 상한값 상수
const MAX_TIMEOUT_SECS: u64 = 3600;
const MAX_INTERVAL_MS: u64 = 60_000;
const MAX_NAMESPACE_TIMEOUT_SECS: u64 = 600;

/// edgeproof 통합 설정
///
/// `edgeproof.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeproofConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 클러스터 API 설정
    #[serde(default)]
    pub cluster: ClusterConfig,
    /// 노드/네트워크 설정
    #[serde(default)]
    pub nodes: NodesConfig,
    /// 조건 폴러 기본값
    #[serde(default)]
    pub poll: PollConfig,
    /// 시나리오 설정
    #[serde(default)]
    pub scenarios: ScenariosConfig,
    /// 실행 리포트 설정
    #[serde(default)]
    pub report: ReportConfig,
}

impl EdgeproofConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, EdgeproofError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, EdgeproofError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EdgeproofError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                EdgeproofError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, EdgeproofError> {
        toml::from_str(toml_str).map_err(|e| {
            EdgeproofError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `EDGEPROOF_{SECTION}_{FIELD}`
    /// 예: `EDGEPROOF_NODES_EDGE_NODE=worker-a`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "EDGEPROOF_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "EDGEPROOF_GENERAL_LOG_FORMAT");

        // Cluster
        override_string(&mut self.cluster.kubeconfig, "EDGEPROOF_CLUSTER_KUBECONFIG");
        override_string(
            &mut self.cluster.e2e_namespace,
            "EDGEPROOF_CLUSTER_E2E_NAMESPACE",
        );
        override_string(
            &mut self.cluster.nginx_service,
            "EDGEPROOF_CLUSTER_NGINX_SERVICE",
        );
        override_string(&mut self.cluster.nginx_pod, "EDGEPROOF_CLUSTER_NGINX_POD");
        override_string(
            &mut self.cluster.workload_namespace,
            "EDGEPROOF_CLUSTER_WORKLOAD_NAMESPACE",
        );
        override_string(
            &mut self.cluster.system_namespace,
            "EDGEPROOF_CLUSTER_SYSTEM_NAMESPACE",
        );
        override_string(&mut self.cluster.dns_service, "EDGEPROOF_CLUSTER_DNS_SERVICE");
        override_string(
            &mut self.cluster.dns_selector,
            "EDGEPROOF_CLUSTER_DNS_SELECTOR",
        );
        override_u64(
            &mut self.cluster.namespace_timeout_secs,
            "EDGEPROOF_CLUSTER_NAMESPACE_TIMEOUT_SECS",
        );

        // Nodes
        override_string(&mut self.nodes.cloud_node, "EDGEPROOF_NODES_CLOUD_NODE");
        override_string(&mut self.nodes.edge_node, "EDGEPROOF_NODES_EDGE_NODE");
        override_string(&mut self.nodes.edge_node2, "EDGEPROOF_NODES_EDGE_NODE2");
        override_string(&mut self.nodes.network, "EDGEPROOF_NODES_NETWORK");
        override_string(
            &mut self.nodes.docker_socket,
            "EDGEPROOF_NODES_DOCKER_SOCKET",
        );

        // Poll
        override_u64(
            &mut self.poll.default_timeout_secs,
            "EDGEPROOF_POLL_DEFAULT_TIMEOUT_SECS",
        );
        override_u64(
            &mut self.poll.default_interval_ms,
            "EDGEPROOF_POLL_DEFAULT_INTERVAL_MS",
        );

        // Scenarios
        for (field, env) in [
            (
                &mut self.scenarios.kubelet_timeout_secs,
                "EDGEPROOF_SCENARIOS_KUBELET_TIMEOUT_SECS",
            ),
            (
                &mut self.scenarios.flannel_timeout_secs,
                "EDGEPROOF_SCENARIOS_FLANNEL_TIMEOUT_SECS",
            ),
            (
                &mut self.scenarios.yurthub_timeout_secs,
                "EDGEPROOF_SCENARIOS_YURTHUB_TIMEOUT_SECS",
            ),
            (
                &mut self.scenarios.kube_proxy_timeout_secs,
                "EDGEPROOF_SCENARIOS_KUBE_PROXY_TIMEOUT_SECS",
            ),
            (
                &mut self.scenarios.coredns_timeout_secs,
                "EDGEPROOF_SCENARIOS_COREDNS_TIMEOUT_SECS",
            ),
            (
                &mut self.scenarios.verify_interval_ms,
                "EDGEPROOF_SCENARIOS_VERIFY_INTERVAL_MS",
            ),
        ] {
            override_u64(field, env);
        }
        override_bool(
            &mut self.scenarios.run_unsupported,
            "EDGEPROOF_SCENARIOS_RUN_UNSUPPORTED",
        );
        override_csv(&mut self.scenarios.only, "EDGEPROOF_SCENARIOS_ONLY");
        override_csv(&mut self.scenarios.skip, "EDGEPROOF_SCENARIOS_SKIP");

        // Report
        override_string(&mut self.report.json_path, "EDGEPROOF_REPORT_JSON_PATH");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), EdgeproofError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        for (field, value) in [
            ("nodes.cloud_node", &self.nodes.cloud_node),
            ("nodes.edge_node", &self.nodes.edge_node),
            ("nodes.edge_node2", &self.nodes.edge_node2),
            ("nodes.network", &self.nodes.network),
            ("cluster.e2e_namespace", &self.cluster.e2e_namespace),
            ("cluster.workload_namespace", &self.cluster.workload_namespace),
            ("cluster.system_namespace", &self.cluster.system_namespace),
            ("cluster.nginx_service", &self.cluster.nginx_service),
            ("cluster.nginx_pod", &self.cluster.nginx_pod),
            ("cluster.dns_service", &self.cluster.dns_service),
            ("cluster.dns_selector", &self.cluster.dns_selector),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(field, "must not be empty".to_owned()));
            }
        }

        if self.nodes.cloud_node == self.nodes.edge_node
            || self.nodes.cloud_node == self.nodes.edge_node2
        {
            return Err(invalid(
                "nodes.cloud_node",
                "cloud node must differ from the edge nodes".to_owned(),
            ));
        }

        check_range(
            "cluster.namespace_timeout_secs",
            self.cluster.namespace_timeout_secs,
            MAX_NAMESPACE_TIMEOUT_SECS,
        )?;
        check_range(
            "poll.default_timeout_secs",
            self.poll.default_timeout_secs,
            MAX_TIMEOUT_SECS,
        )?;
        check_range(
            "poll.default_interval_ms",
            self.poll.default_interval_ms,
            MAX_INTERVAL_MS,
        )?;

        let s = &self.scenarios;
        for (field, value) in [
            ("scenarios.kubelet_timeout_secs", s.kubelet_timeout_secs),
            ("scenarios.flannel_timeout_secs", s.flannel_timeout_secs),
            ("scenarios.yurthub_timeout_secs", s.yurthub_timeout_secs),
            ("scenarios.kube_proxy_timeout_secs", s.kube_proxy_timeout_secs),
            ("scenarios.coredns_timeout_secs", s.coredns_timeout_secs),
        ] {
            check_range(field, value, MAX_TIMEOUT_SECS)?;
        }
        check_range(
            "scenarios.verify_interval_ms",
            s.verify_interval_ms,
            MAX_INTERVAL_MS,
        )?;

        for (field, names) in [("scenarios.only", &s.only), ("scenarios.skip", &s.skip)] {
            if let Some(unknown) = names
                .iter()
                .find(|n| !SCENARIO_NAMES.contains(&n.as_str()))
            {
                return Err(invalid(
                    field,
                    format!(
                        "unknown scenario '{unknown}', expected one of: {}",
                        SCENARIO_NAMES.join(", ")
                    ),
                ));
            }
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 클러스터 API 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// kubeconfig 경로 (빈 문자열이면 기본 탐색 규칙 사용)
    pub kubeconfig: String,
    /// 테스트가 생성/삭제하는 네임스페이스
    pub e2e_namespace: String,
    /// nginx 워크로드 네임스페이스
    pub workload_namespace: String,
    /// 시스템 컴포넌트 네임스페이스
    pub system_namespace: String,
    /// nginx 서비스 이름 (crictl 검색어로도 사용)
    pub nginx_service: String,
    /// 두 번째 엣지 노드의 nginx pod 이름
    pub nginx_pod: String,
    /// DNS 서비스 이름
    pub dns_service: String,
    /// DNS pod 레이블 셀렉터
    pub dns_selector: String,
    /// 네임스페이스 삭제 대기 시간 (초)
    pub namespace_timeout_secs: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            kubeconfig: String::new(),
            e2e_namespace: "yurt-e2e-test".to_owned(),
            workload_namespace: "default".to_owned(),
            system_namespace: "kube-system".to_owned(),
            nginx_service: "yurt-e2e-test-nginx".to_owned(),
            nginx_pod: "yurt-e2e-test-nginx-openyurt-e2e-test-worker2".to_owned(),
            dns_service: "kube-dns".to_owned(),
            dns_selector: "k8s-app=kube-dns".to_owned(),
            namespace_timeout_secs: 60,
        }
    }
}

/// 노드/네트워크 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodesConfig {
    /// 클라우드(컨트롤 플레인) 노드 컨테이너 이름
    pub cloud_node: String,
    /// 시나리오 대상 엣지 노드
    pub edge_node: String,
    /// 교차 노드 검증용 두 번째 엣지 노드
    pub edge_node2: String,
    /// 파티션 대상 Docker 네트워크
    pub network: String,
    /// Docker 소켓 경로 (빈 문자열이면 플랫폼 기본값)
    pub docker_socket: String,
}

impl Default for NodesConfig {
    fn default() -> Self {
        Self {
            cloud_node: "openyurt-e2e-test-control-plane".to_owned(),
            edge_node: "openyurt-e2e-test-worker".to_owned(),
            edge_node2: "openyurt-e2e-test-worker2".to_owned(),
            network: "kind".to_owned(),
            docker_socket: String::new(),
        }
    }
}

/// 명시적 제한 시간이 없는 폴링의 기본값
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// 기본 제한 시간 (초)
    pub default_timeout_secs: u64,
    /// 기본 폴링 간격 (밀리초)
    pub default_interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: 30,
            default_interval_ms: 500,
        }
    }
}

/// 시나리오 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenariosConfig {
    /// kubelet healthz 검증 제한 시간 (초)
    pub kubelet_timeout_secs: u64,
    /// 교차 노드 pod 도달성 검증 제한 시간 (초)
    pub flannel_timeout_secs: u64,
    /// yurthub healthz 검증 제한 시간 (초)
    pub yurthub_timeout_secs: u64,
    /// 서비스 IP 도달성 검증 제한 시간 (초)
    pub kube_proxy_timeout_secs: u64,
    /// DNS 조회 검증 제한 시간 (초)
    pub coredns_timeout_secs: u64,
    /// 검증 폴링 간격 (밀리초)
    pub verify_interval_ms: u64,
    /// 지원되지 않는 것으로 표시된 시나리오도 실행
    pub run_unsupported: bool,
    /// 이 목록의 시나리오만 실행 (비어 있으면 전체)
    pub only: Vec<String>,
    /// 건너뛸 시나리오
    pub skip: Vec<String>,
}

impl Default for ScenariosConfig {
    fn default() -> Self {
        Self {
            kubelet_timeout_secs: 10,
            flannel_timeout_secs: 10,
            yurthub_timeout_secs: 120,
            kube_proxy_timeout_secs: 10,
            coredns_timeout_secs: 10,
            verify_interval_ms: 1000,
            run_unsupported: false,
            only: Vec::new(),
            skip: Vec::new(),
        }
    }
}

impl ScenariosConfig {
    /// 이름 필터(`only`/`skip`)를 적용했을 때 시나리오가 선택되는지 확인합니다.
    pub fn is_selected(&self, name: &str) -> bool {
        let included = self.only.is_empty() || self.only.iter().any(|n| n == name);
        included && !self.skip.iter().any(|n| n == name)
    }
}

/// 실행 리포트 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// JSON 리포트 출력 경로 (빈 문자열이면 출력하지 않음)
    pub json_path: String,
}

fn invalid(field: &str, reason: String) -> EdgeproofError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

fn check_range(field: &str, value: u64, max: u64) -> Result<(), EdgeproofError> {
    if value == 0 || value > max {
        return Err(invalid(field, format!("must be 1-{max}")));
    }
    Ok(())
}

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

//! Cluster API collaborator.
//!
//! [`ClusterClient`] covers the handful of namespace, pod and service lookups
//! the harness needs before and after the scenarios run. [`KubeClusterClient`]
//! implements it over `kube` with the typed `k8s-openapi` resources.

use std::future::Future;

use k8s_openapi::api::core::v1::{Namespace, Pod, Service};
use kube::api::{Api, DeleteParams, ListParams, ObjectMeta, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::{debug, info, warn};

use crate::error::HarnessError;

/// Cluster-scoped API operations consumed by the harness.
///
/// Lookups return the raw field value; an unassigned IP comes back as an
/// empty string and is rejected by fixture resolution.
pub trait ClusterClient: Send + Sync + 'static {
    /// Creates a namespace. An existing namespace counts as success.
    fn create_namespace(&self, name: &str) -> impl Future<Output = Result<(), HarnessError>> + Send;

    /// Deletes a namespace. An absent namespace counts as success.
    fn delete_namespace(&self, name: &str) -> impl Future<Output = Result<(), HarnessError>> + Send;

    /// Whether the namespace still exists (including `Terminating`).
    fn namespace_exists(&self, name: &str)
    -> impl Future<Output = Result<bool, HarnessError>> + Send;

    /// `status.podIP` of a pod.
    fn pod_ip(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<String, HarnessError>> + Send;

    /// `spec.clusterIP` of a service.
    fn service_cluster_ip(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<String, HarnessError>> + Send;

    /// Node names hosting the pods that match a label selector.
    fn pod_nodes(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> impl Future<Output = Result<Vec<String>, HarnessError>> + Send;
}

/// `kube`-backed cluster client.
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    /// Builds a client from `kubeconfig`, or from the default lookup
    /// (`KUBECONFIG`, `~/.kube/config`, in-cluster) when it is empty.
    pub async fn connect(kubeconfig: &str) -> Result<Self, HarnessError> {
        let client = if kubeconfig.is_empty() {
            Client::try_default()
                .await
                .map_err(|e| HarnessError::Cluster(format!("failed to create client: {e}")))?
        } else {
            let kubeconfig = Kubeconfig::read_from(kubeconfig)
                .map_err(|e| HarnessError::Cluster(format!("failed to read kubeconfig: {e}")))?;
            let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| HarnessError::Cluster(format!("failed to load kubeconfig: {e}")))?;
            Client::try_from(config)
                .map_err(|e| HarnessError::Cluster(format!("failed to create client: {e}")))?
        };
        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn api_error(context: &str, name: &str, e: kube::Error) -> HarnessError {
    HarnessError::Cluster(format!("{context} '{name}': {e}"))
}

fn is_status(e: &kube::Error, code: u16) -> bool {
    matches!(e, kube::Error::Api(resp) if resp.code == code)
}

impl ClusterClient for KubeClusterClient {
    async fn create_namespace(&self, name: &str) -> Result<(), HarnessError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let namespace = Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_owned()),
                ..Default::default()
            },
            ..Default::default()
        };
        match api.create(&PostParams::default(), &namespace).await {
            Ok(_) => {
                info!(namespace = name, "namespace created");
                Ok(())
            }
            Err(e) if is_status(&e, 409) => {
                warn!(namespace = name, "namespace already exists");
                Ok(())
            }
            Err(e) => Err(api_error("failed to create namespace", name, e)),
        }
    }

    async fn delete_namespace(&self, name: &str) -> Result<(), HarnessError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        match api.delete(name, &DeleteParams::default()).await {
            Ok(_) => {
                info!(namespace = name, "namespace deletion requested");
                Ok(())
            }
            Err(e) if is_status(&e, 404) => {
                debug!(namespace = name, "namespace already absent");
                Ok(())
            }
            Err(e) => Err(api_error("failed to delete namespace", name, e)),
        }
    }

    async fn namespace_exists(&self, name: &str) -> Result<bool, HarnessError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        api.get_opt(name)
            .await
            .map(|ns| ns.is_some())
            .map_err(|e| api_error("failed to get namespace", name, e))
    }

    async fn pod_ip(&self, namespace: &str, name: &str) -> Result<String, HarnessError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pod = api
            .get(name)
            .await
            .map_err(|e| api_error("failed to get pod", name, e))?;
        Ok(pod.status.and_then(|s| s.pod_ip).unwrap_or_default())
    }

    async fn service_cluster_ip(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<String, HarnessError> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        let service = api
            .get(name)
            .await
            .map_err(|e| api_error("failed to get service", name, e))?;
        Ok(service.spec.and_then(|s| s.cluster_ip).unwrap_or_default())
    }

    async fn pod_nodes(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<String>, HarnessError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pods = api
            .list(&ListParams::default().labels(label_selector))
            .await
            .map_err(|e| api_error("failed to list pods", label_selector, e))?;
        Ok(pods
            .items
            .into_iter()
            .filter_map(|pod| pod.spec.and_then(|s| s.node_name))
            .collect())
    }
}

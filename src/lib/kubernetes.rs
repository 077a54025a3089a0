use k8s_openapi::api::core::v1::{Node, Pod};
use kube::{Client, Config, config::KubeConfigOptions};
use log::{debug, info};

use crate::lib::quantity::{ResourceList, parse_resources};
use crate::{
    Config as ReportConfig, ConfigError::InvalidValue, KubernetesError::ApiError,
    KubernetesError::ConnectionFailed, Result,
};

/// A node's declared resource ceilings.
#[derive(Debug, Clone)]
pub struct NodeResources {
    pub name: String,
    pub allocatable: ResourceList,
    pub capacity: ResourceList,
}

/// A pod's declared resource intent, with its scheduling assignment.
#[derive(Debug, Clone)]
pub struct PodResources {
    pub name: String,
    pub namespace: String,
    pub node_name: Option<String>,
    pub containers: Vec<ContainerResources>,
}

#[derive(Debug, Clone)]
pub struct ContainerResources {
    pub name: String,
    pub requests: ResourceList,
    pub limits: ResourceList,
}

/// Builds a Kubernetes client from kubeconfig and lists node and pod specs.
pub struct KubernetesLoader {
    client: Client,
}

impl KubernetesLoader {
    pub async fn new(config: &ReportConfig) -> Result<Self> {
        let client = create_client(config).await?;
        info!("Successfully created Kubernetes client");
        Ok(Self { client })
    }

    /// The underlying client, for sharing with the metrics client.
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// Lists every node in the cluster with its allocatable and capacity
    /// quantities.
    pub async fn list_nodes(&self) -> Result<Vec<NodeResources>> {
        let lp = kube::api::ListParams::default();
        debug!("Listing all nodes");
        let api: kube::Api<Node> = kube::Api::all(self.client.clone());
        let nodes = api.list(&lp).await.map_err(|e| ApiError(e.to_string()))?;

        let node_resources: Vec<NodeResources> = nodes
            .items
            .into_iter()
            .map(|node| {
                let status = node.status;
                NodeResources {
                    name: node.metadata.name.unwrap_or_default(),
                    allocatable: status
                        .as_ref()
                        .and_then(|s| s.allocatable.as_ref())
                        .map(parse_resources)
                        .unwrap_or_default(),
                    capacity: status
                        .as_ref()
                        .and_then(|s| s.capacity.as_ref())
                        .map(parse_resources)
                        .unwrap_or_default(),
                }
            })
            .collect();

        info!("Retrieved {} nodes", node_resources.len());
        Ok(node_resources)
    }

    /// Lists pod specs across all namespaces.
    ///
    /// Always unfiltered: the join only consumes specs for pods that show
    /// up in the (possibly namespace-scoped) usage listing.
    pub async fn list_pods(&self) -> Result<Vec<PodResources>> {
        let lp = kube::api::ListParams::default();
        debug!("Listing pod specs in all namespaces");
        let api: kube::Api<Pod> = kube::Api::all(self.client.clone());
        let pods = api.list(&lp).await.map_err(|e| ApiError(e.to_string()))?;

        let mut pod_resources = Vec::new();

        for pod in pods.items {
            let name = pod.metadata.name.unwrap_or_default();
            let namespace = pod.metadata.namespace.unwrap_or_default();

            let Some(spec) = pod.spec else {
                continue;
            };

            let containers: Vec<ContainerResources> = spec
                .containers
                .iter()
                .map(|container| {
                    let resources = container.resources.as_ref();
                    ContainerResources {
                        name: container.name.clone(),
                        requests: resources
                            .and_then(|r| r.requests.as_ref())
                            .map(parse_resources)
                            .unwrap_or_default(),
                        limits: resources
                            .and_then(|r| r.limits.as_ref())
                            .map(parse_resources)
                            .unwrap_or_default(),
                    }
                })
                .collect();

            pod_resources.push(PodResources {
                name,
                namespace,
                node_name: spec.node_name,
                containers,
            });
        }

        info!("Retrieved {} pod specs", pod_resources.len());
        Ok(pod_resources)
    }
}

/// Create a Kubernetes client, honoring an optional kubeconfig context
/// override. Without an override the default loading rules apply
/// (`KUBECONFIG`, `~/.kube/config`, in-cluster).
pub async fn create_client(config: &ReportConfig) -> Result<Client> {
    let client = if let Some(ref context) = config.context {
        debug!("Using custom context for Kubeconfig");
        let custom_config = Config::from_kubeconfig(&KubeConfigOptions {
            context: Some(context.clone()),
            ..Default::default()
        })
        .await
        .map_err(|e| InvalidValue(e.to_string()))?;

        debug!("Creating a Kubernetes client using custom Kubeconfig");
        Client::try_from(custom_config).map_err(|e| ConnectionFailed(e.to_string()))?
    } else {
        debug!("Creating a Kubernetes client using default Kubeconfig");
        Client::try_default()
            .await
            .map_err(|e| ConnectionFailed(e.to_string()))?
    };

    Ok(client)
}

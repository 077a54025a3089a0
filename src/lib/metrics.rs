use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::{ClusterResourceScope, NamespaceResourceScope};
use kube::Client;
use log::{debug, info};
use serde::Deserialize;

use crate::lib::quantity::{ResourceList, parse_resources};
use crate::{MetricsError::ApiError, Result};

/// A node's instantaneous observed consumption.
#[derive(Debug, Clone)]
pub struct NodeUsage {
    pub name: String,
    pub usage: ResourceList,
}

/// A pod's instantaneous observed consumption, per container.
#[derive(Debug, Clone)]
pub struct PodUsage {
    pub name: String,
    pub namespace: String,
    pub containers: Vec<ContainerUsage>,
}

#[derive(Debug, Clone)]
pub struct ContainerUsage {
    pub name: String,
    pub usage: ResourceList,
}

/// Wire type for `metrics.k8s.io/v1beta1` NodeMetrics.
///
/// The metrics API group is not part of k8s-openapi, so the list types are
/// defined here with the resource trait impls `kube::Api` needs.
#[derive(Clone, Debug, Deserialize)]
pub struct NodeMetrics {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub usage: BTreeMap<String, Quantity>,
}

impl k8s_openapi::Resource for NodeMetrics {
    const API_VERSION: &'static str = "metrics.k8s.io/v1beta1";
    const GROUP: &'static str = "metrics.k8s.io";
    const KIND: &'static str = "NodeMetrics";
    const VERSION: &'static str = "v1beta1";
    const URL_PATH_SEGMENT: &'static str = "nodes";
    type Scope = ClusterResourceScope;
}

impl k8s_openapi::ListableResource for NodeMetrics {
    const LIST_KIND: &'static str = "NodeMetricsList";
}

impl k8s_openapi::Metadata for NodeMetrics {
    type Ty = ObjectMeta;

    fn metadata(&self) -> &Self::Ty {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Self::Ty {
        &mut self.metadata
    }
}

/// Wire type for `metrics.k8s.io/v1beta1` PodMetrics.
#[derive(Clone, Debug, Deserialize)]
pub struct PodMetrics {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub containers: Vec<PodMetricsContainer>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PodMetricsContainer {
    pub name: String,
    #[serde(default)]
    pub usage: BTreeMap<String, Quantity>,
}

impl k8s_openapi::Resource for PodMetrics {
    const API_VERSION: &'static str = "metrics.k8s.io/v1beta1";
    const GROUP: &'static str = "metrics.k8s.io";
    const KIND: &'static str = "PodMetrics";
    const VERSION: &'static str = "v1beta1";
    const URL_PATH_SEGMENT: &'static str = "pods";
    type Scope = NamespaceResourceScope;
}

impl k8s_openapi::ListableResource for PodMetrics {
    const LIST_KIND: &'static str = "PodMetricsList";
}

impl k8s_openapi::Metadata for PodMetrics {
    type Ty = ObjectMeta;

    fn metadata(&self) -> &Self::Ty {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Self::Ty {
        &mut self.metadata
    }
}

/// Lists instantaneous node and pod usage from the metrics API.
pub struct MetricsClient {
    client: Client,
    namespace: Option<String>,
}

impl MetricsClient {
    pub fn new(client: Client, namespace: Option<String>) -> Self {
        Self { client, namespace }
    }

    /// Lists observed usage for every node.
    pub async fn list_node_usage(&self) -> Result<Vec<NodeUsage>> {
        let lp = kube::api::ListParams::default();
        debug!("Listing node metrics");
        let api: kube::Api<NodeMetrics> = kube::Api::all(self.client.clone());
        let metrics = api.list(&lp).await.map_err(|e| ApiError(e.to_string()))?;

        let usage: Vec<NodeUsage> = metrics
            .items
            .into_iter()
            .map(|node| NodeUsage {
                name: node.metadata.name.unwrap_or_default(),
                usage: parse_resources(&node.usage),
            })
            .collect();

        info!("Retrieved metrics for {} nodes", usage.len());
        Ok(usage)
    }

    /// Lists observed usage for pods, scoped to the configured namespace
    /// (all namespaces when unset).
    pub async fn list_pod_usage(&self) -> Result<Vec<PodUsage>> {
        let lp = kube::api::ListParams::default();
        let metrics = if let Some(namespace) = self.namespace.as_deref() {
            debug!("Listing pod metrics in {namespace} namespace");
            let api: kube::Api<PodMetrics> = kube::Api::namespaced(self.client.clone(), namespace);
            api.list(&lp).await.map_err(|e| ApiError(e.to_string()))?
        } else {
            debug!("Listing pod metrics in all namespaces");
            let api: kube::Api<PodMetrics> = kube::Api::all(self.client.clone());
            api.list(&lp).await.map_err(|e| ApiError(e.to_string()))?
        };

        let usage: Vec<PodUsage> = metrics
            .items
            .into_iter()
            .map(|pod| PodUsage {
                name: pod.metadata.name.unwrap_or_default(),
                namespace: pod.metadata.namespace.unwrap_or_default(),
                containers: pod
                    .containers
                    .into_iter()
                    .map(|container| ContainerUsage {
                        name: container.name,
                        usage: parse_resources(&container.usage),
                    })
                    .collect(),
            })
            .collect();

        info!("Retrieved metrics for {} pods", usage.len());
        Ok(usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pod_metrics_deserialize_from_api_json() {
        let json = r#"{
            "metadata": {"name": "web-5d78f6b8b9-abcde", "namespace": "default"},
            "timestamp": "2026-08-08T10:00:00Z",
            "window": "15s",
            "containers": [
                {"name": "web", "usage": {"cpu": "156340000n", "memory": "131072Ki"}}
            ]
        }"#;
        let metrics: PodMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(metrics.metadata.name.as_deref(), Some("web-5d78f6b8b9-abcde"));
        assert_eq!(metrics.containers.len(), 1);
        assert_eq!(
            metrics.containers[0].usage["cpu"],
            Quantity("156340000n".to_string())
        );
    }

    #[test]
    fn node_metrics_deserialize_without_usage() {
        let json = r#"{"metadata": {"name": "worker-1"}}"#;
        let metrics: NodeMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(metrics.metadata.name.as_deref(), Some("worker-1"));
        assert!(metrics.usage.is_empty());
    }
}

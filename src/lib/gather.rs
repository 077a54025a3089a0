use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};

use crate::lib::error::{ReportError, Result};
use crate::lib::kubernetes::{KubernetesLoader, NodeResources, PodResources};
use crate::lib::metrics::{MetricsClient, NodeUsage, PodUsage};

/// Which of the four retrievals a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTarget {
    NodeUsage,
    NodeResources,
    PodUsage,
    PodResources,
}

impl fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchTarget::NodeUsage => "node metrics",
            FetchTarget::NodeResources => "node resources",
            FetchTarget::PodUsage => "pod metrics",
            FetchTarget::PodResources => "pod resources",
        };
        write!(f, "{name}")
    }
}

/// A failed retrieval, kept so it can be reported alongside the tables
/// instead of silently producing partial data.
#[derive(Debug)]
pub struct FetchFailure {
    pub target: FetchTarget,
    pub error: ReportError,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unable to get {}: {}", self.target, self.error)
    }
}

/// All data for one report cycle: four disjoint name-keyed mappings plus
/// the failures recorded while populating them.
///
/// Pods are keyed by `namespace/name` so same-named pods in different
/// namespaces never collide; nodes are cluster-scoped and keyed by name.
/// A snapshot is built fresh per cycle and dropped after rendering.
#[derive(Debug, Default)]
pub struct ClusterSnapshot {
    pub node_usage: HashMap<String, NodeUsage>,
    pub node_resources: HashMap<String, NodeResources>,
    pub pod_usage: HashMap<String, PodUsage>,
    pub pod_resources: HashMap<String, PodResources>,
    pub failures: Vec<FetchFailure>,
}

/// Namespace-qualified pod key used in both pod mappings.
pub fn pod_key(namespace: &str, name: &str) -> String {
    format!("{namespace}/{name}")
}

impl ClusterSnapshot {
    /// Assembles a snapshot from the four retrieval outcomes.
    ///
    /// A failed retrieval leaves its mapping empty and is recorded; the
    /// other three are kept as-is.
    pub fn from_results(
        node_usage: Result<Vec<NodeUsage>>,
        node_resources: Result<Vec<NodeResources>>,
        pod_usage: Result<Vec<PodUsage>>,
        pod_resources: Result<Vec<PodResources>>,
    ) -> Self {
        let mut snapshot = ClusterSnapshot::default();

        match node_usage {
            Ok(nodes) => {
                snapshot.node_usage = nodes.into_iter().map(|n| (n.name.clone(), n)).collect();
            }
            Err(error) => snapshot.record_failure(FetchTarget::NodeUsage, error),
        }

        match node_resources {
            Ok(nodes) => {
                snapshot.node_resources = nodes.into_iter().map(|n| (n.name.clone(), n)).collect();
            }
            Err(error) => snapshot.record_failure(FetchTarget::NodeResources, error),
        }

        match pod_usage {
            Ok(pods) => {
                snapshot.pod_usage = pods
                    .into_iter()
                    .map(|p| (pod_key(&p.namespace, &p.name), p))
                    .collect();
            }
            Err(error) => snapshot.record_failure(FetchTarget::PodUsage, error),
        }

        match pod_resources {
            Ok(pods) => {
                snapshot.pod_resources = pods
                    .into_iter()
                    .map(|p| (pod_key(&p.namespace, &p.name), p))
                    .collect();
            }
            Err(error) => snapshot.record_failure(FetchTarget::PodResources, error),
        }

        snapshot
    }

    fn record_failure(&mut self, target: FetchTarget, error: ReportError) {
        warn!("unable to get {target}: {error}");
        self.failures.push(FetchFailure { target, error });
    }
}

/// Runs the four retrievals concurrently and waits for all of them.
///
/// This is a rendezvous barrier, not a race: an early failure does not
/// cancel the remaining retrievals, and every outcome is collected.
pub async fn gather(kubernetes: &KubernetesLoader, metrics: &MetricsClient) -> ClusterSnapshot {
    debug!("Gathering cluster state");
    let (node_usage, node_resources, pod_usage, pod_resources) = tokio::join!(
        metrics.list_node_usage(),
        kubernetes.list_nodes(),
        metrics.list_pod_usage(),
        kubernetes.list_pods(),
    );

    ClusterSnapshot::from_results(node_usage, node_resources, pod_usage, pod_resources)
}

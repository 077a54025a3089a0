use std::collections::HashMap;

use log::debug;

use crate::lib::gather::ClusterSnapshot;
use crate::lib::quantity::{ResourceList, accumulate_resources};

/// One correlated (pod, container) pair: observed usage next to the
/// container's declared requests and limits.
#[derive(Debug, Clone, PartialEq)]
pub struct PodRow {
    pub namespace: String,
    pub pod: String,
    pub container: String,
    pub usage: ResourceList,
    pub requests: ResourceList,
    pub limits: ResourceList,
}

/// One node with its observed usage, allocatable ceiling, and the summed
/// requests/limits of every container scheduled to it.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRow {
    pub name: String,
    pub usage: ResourceList,
    pub allocatable: ResourceList,
    pub requests: ResourceList,
    pub limits: ResourceList,
}

/// The correlated and aggregated output of one report cycle.
#[derive(Debug, Clone, Default)]
pub struct UsageReport {
    pub pod_rows: Vec<PodRow>,
    pub node_rows: Vec<NodeRow>,
}

/// Correlates pod usage with pod specs and folds per-container
/// requests/limits into per-node totals.
///
/// Containers are paired by name within their pod, never by position. A
/// pod or container without a matching spec still produces a usage row,
/// with empty requests/limits, and contributes nothing to any node total.
/// Rows are sorted (namespace, pod, container / node name) so output is
/// deterministic.
pub fn build_report(snapshot: &ClusterSnapshot) -> UsageReport {
    let mut pod_rows = Vec::new();
    let mut node_requests: HashMap<String, ResourceList> = HashMap::new();
    let mut node_limits: HashMap<String, ResourceList> = HashMap::new();

    for (key, usage) in &snapshot.pod_usage {
        let spec = snapshot.pod_resources.get(key);
        if spec.is_none() {
            debug!("No spec found for pod {key}; reporting usage without requests/limits");
        }
        let node_name = spec.and_then(|s| s.node_name.as_deref());

        for container in &usage.containers {
            let container_spec =
                spec.and_then(|s| s.containers.iter().find(|c| c.name == container.name));
            let (requests, limits) = match container_spec {
                Some(cs) => (cs.requests.clone(), cs.limits.clone()),
                None => (ResourceList::new(), ResourceList::new()),
            };

            if let Some(node) = node_name {
                accumulate_resources(
                    node_requests.entry(node.to_string()).or_default(),
                    &requests,
                );
                accumulate_resources(node_limits.entry(node.to_string()).or_default(), &limits);
            }

            pod_rows.push(PodRow {
                namespace: usage.namespace.clone(),
                pod: usage.name.clone(),
                container: container.name.clone(),
                usage: container.usage.clone(),
                requests,
                limits,
            });
        }
    }

    let mut node_rows: Vec<NodeRow> = snapshot
        .node_usage
        .values()
        .map(|node| NodeRow {
            name: node.name.clone(),
            usage: node.usage.clone(),
            allocatable: snapshot
                .node_resources
                .get(&node.name)
                .map(|n| n.allocatable.clone())
                .unwrap_or_default(),
            requests: node_requests.remove(&node.name).unwrap_or_default(),
            limits: node_limits.remove(&node.name).unwrap_or_default(),
        })
        .collect();

    pod_rows.sort_by(|a, b| {
        (&a.namespace, &a.pod, &a.container).cmp(&(&b.namespace, &b.pod, &b.container))
    });
    node_rows.sort_by(|a, b| a.name.cmp(&b.name));

    UsageReport {
        pod_rows,
        node_rows,
    }
}

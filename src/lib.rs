//! Kubernetes Resource Report Library
//!
//! This library fetches observed CPU/memory usage from the metrics API and
//! declared requests/limits from the Kubernetes API server, correlates the
//! two per container, and renders pod-level and node-level reports.

pub mod lib {
    pub mod cli;
    pub mod config;
    pub mod error;
    pub mod gather;
    pub mod kubernetes;
    pub mod logger;
    pub mod metrics;
    pub mod quantity;
    pub mod render;
    pub mod report;
}

// Re-export commonly used types at the root level for convenience
pub use lib::cli::{Cli, OutputFormat};
pub use lib::config::Config;
pub use lib::error::{
    ConfigError, KubernetesError, MetricsError, ParseQuantityError, ReportError, Result,
};
pub use lib::gather::{ClusterSnapshot, FetchFailure, FetchTarget, gather, pod_key};
pub use lib::kubernetes::{
    ContainerResources, KubernetesLoader, NodeResources, PodResources, create_client,
};
pub use lib::logger::init_logger;
pub use lib::metrics::{ContainerUsage, MetricsClient, NodeUsage, PodUsage};
pub use lib::quantity::{
    ResourceAmount, ResourceList, add_resources, format_resources, parse_resources,
};
pub use lib::render::{NodeReportRow, PodReportRow, ReportOutput, render, truncate_name};
pub use lib::report::{NodeRow, PodRow, UsageReport, build_report};

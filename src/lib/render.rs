use std::io::Write;

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::lib::cli::OutputFormat;
use crate::lib::error::Result;
use crate::lib::gather::FetchFailure;
use crate::lib::quantity::format_resources;
use crate::lib::report::UsageReport;

/// Maximum display width for any identifier cell.
// TODO: Make configurable
pub const MAX_NAME_WIDTH: usize = 30;

/// Shortens over-long identifiers to `first15...last15`, keeping the
/// readable prefix and the distinguishing suffix (generated pod hashes)
/// instead of a blunt cut. Identifiers within the limit pass through
/// unchanged. Counts characters, not bytes.
pub fn truncate_name(name: &str) -> String {
    let count = name.chars().count();
    if count <= MAX_NAME_WIDTH {
        return name.to_string();
    }
    let half = MAX_NAME_WIDTH / 2;
    let prefix: String = name.chars().take(half).collect();
    let suffix: String = name.chars().skip(count - half).collect();
    format!("{prefix}...{suffix}")
}

/// Display row for the pod-level table.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct PodReportRow {
    #[tabled(rename = "Namespace")]
    pub namespace: String,
    #[tabled(rename = "Pod")]
    pub pod: String,
    #[tabled(rename = "Container")]
    pub container: String,
    #[tabled(rename = "Usage")]
    pub usage: String,
    #[tabled(rename = "Requests")]
    pub requests: String,
    #[tabled(rename = "Limits")]
    pub limits: String,
}

/// Display row for the node-level table.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct NodeReportRow {
    #[tabled(rename = "Node")]
    pub node: String,
    #[tabled(rename = "Usage")]
    pub usage: String,
    #[tabled(rename = "Allocatable")]
    pub allocatable: String,
    #[tabled(rename = "Resource Requests")]
    pub requests: String,
    #[tabled(rename = "Resource Limits")]
    pub limits: String,
}

/// Top-level output document: metadata plus both row sets.
///
/// The same truncated and formatted strings back the table and JSON
/// output modes.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput {
    pub metadata: ReportMetadata,
    pub pods: Vec<PodReportRow>,
    pub nodes: Vec<NodeReportRow>,
}

/// Metadata about the report generation
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub timestamp: String,
    pub namespace: Option<String>,
    pub total_pod_rows: usize,
    pub total_nodes: usize,
    pub warnings: Vec<String>,
}

impl ReportOutput {
    pub fn new(
        namespace: Option<String>,
        report: &UsageReport,
        failures: &[FetchFailure],
    ) -> Self {
        let pods = pod_report_rows(report);
        let nodes = node_report_rows(report);

        Self {
            metadata: ReportMetadata {
                timestamp: chrono::Utc::now().to_rfc3339(),
                namespace,
                total_pod_rows: pods.len(),
                total_nodes: nodes.len(),
                warnings: failures.iter().map(|f| f.to_string()).collect(),
            },
            pods,
            nodes,
        }
    }
}

/// Converts correlated pod rows into display rows.
pub fn pod_report_rows(report: &UsageReport) -> Vec<PodReportRow> {
    report
        .pod_rows
        .iter()
        .map(|row| PodReportRow {
            namespace: truncate_name(&row.namespace),
            pod: truncate_name(&row.pod),
            container: truncate_name(&row.container),
            usage: format_resources(&row.usage),
            requests: format_resources(&row.requests),
            limits: format_resources(&row.limits),
        })
        .collect()
}

/// Converts aggregated node rows into display rows.
pub fn node_report_rows(report: &UsageReport) -> Vec<NodeReportRow> {
    report
        .node_rows
        .iter()
        .map(|row| NodeReportRow {
            node: truncate_name(&row.name),
            usage: format_resources(&row.usage),
            allocatable: format_resources(&row.allocatable),
            requests: format_resources(&row.requests),
            limits: format_resources(&row.limits),
        })
        .collect()
}

/// Writes the report to the sink: two sequential tables with headers, or
/// one JSON document. Headers render even when a row set is empty.
pub fn render<W: Write>(out: &mut W, output: &ReportOutput, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            let pods = Table::new(&output.pods).with(Style::ascii()).to_string();
            writeln!(out, "{pods}")?;
            let nodes = Table::new(&output.nodes).with(Style::ascii()).to_string();
            writeln!(out, "{nodes}")?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(output)?;
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lib::quantity::{ResourceAmount, ResourceList};
    use crate::lib::report::{NodeRow, PodRow};

    fn resources(cpu: &str, memory: &str) -> ResourceList {
        ResourceList::from([
            ("cpu".to_string(), cpu.parse::<ResourceAmount>().unwrap()),
            (
                "memory".to_string(),
                memory.parse::<ResourceAmount>().unwrap(),
            ),
        ])
    }

    #[test]
    fn names_at_the_boundary_pass_through() {
        let at_29 = "a".repeat(29);
        let at_30 = "a".repeat(30);
        assert_eq!(truncate_name(&at_29), at_29);
        assert_eq!(truncate_name(&at_30), at_30);
    }

    #[test]
    fn names_over_the_boundary_keep_prefix_and_suffix() {
        let name = format!("{}{}", "a".repeat(16), "b".repeat(15)); // 31 chars
        let truncated = truncate_name(&name);
        assert_eq!(truncated, format!("{}...{}", "a".repeat(15), "b".repeat(15)));

        let pod = "checkout-service-workers-5d78f6b8b9-x2vqk";
        assert_eq!(truncate_name(pod), "checkout-servic...d78f6b8b9-x2vqk");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let name = "ü".repeat(31);
        let truncated = truncate_name(&name);
        assert_eq!(truncated.chars().count(), 33);
        assert!(truncated.contains("..."));
    }

    #[test]
    fn pod_rows_format_quantities_and_truncate_names() {
        let report = UsageReport {
            pod_rows: vec![PodRow {
                namespace: "default".to_string(),
                pod: "very-long-deployment-name-5d78f6b8b9-x2vqk".to_string(),
                container: "app".to_string(),
                usage: resources("156m", "130Mi"),
                requests: resources("100m", "50Mi"),
                limits: ResourceList::new(),
            }],
            node_rows: vec![],
        };
        let rows = pod_report_rows(&report);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].namespace, "default");
        assert!(rows[0].pod.contains("..."));
        assert_eq!(rows[0].usage, "cpu=156m mem=130Mi");
        assert_eq!(rows[0].requests, "cpu=100m mem=50Mi");
        assert_eq!(rows[0].limits, "cpu=0 mem=0Mi");
    }

    #[test]
    fn node_table_renders_headers_and_rows() {
        let report = UsageReport {
            pod_rows: vec![],
            node_rows: vec![NodeRow {
                name: "worker-1".to_string(),
                usage: resources("1", "1Gi"),
                allocatable: resources("4", "8Gi"),
                requests: resources("200m", "100Mi"),
                limits: resources("400m", "200Mi"),
            }],
        };
        let output = ReportOutput::new(None, &report, &[]);
        let mut buf = Vec::new();
        render(&mut buf, &output, OutputFormat::Table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Resource Requests"));
        assert!(text.contains("Resource Limits"));
        assert!(text.contains("worker-1"));
        assert!(text.contains("cpu=200m mem=100Mi"));
        // the (empty) pod table still renders its header row
        assert!(text.contains("Namespace"));
    }

    #[test]
    fn json_output_carries_metadata_and_warnings() {
        let report = UsageReport::default();
        let failures = [];
        let output = ReportOutput::new(Some("default".to_string()), &report, &failures);
        let mut buf = Vec::new();
        render(&mut buf, &output, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["metadata"]["namespace"], "default");
        assert_eq!(value["metadata"]["total_nodes"], 0);
        assert!(value["pods"].as_array().unwrap().is_empty());
    }
}

//! Results persistence module

use anyhow::{Context, Result};
use crate::cluster::metrics::{summarize, Cluster};
use crate::graph::Graph;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use serde_json::{json, to_string_pretty};

/// Save clustering results to the specified directory
pub fn save_results(graph: &Graph, clusters: &[Cluster], output_dir: &Path) -> Result<()> {
    log::info!("Saving {} clusters to {}", clusters.len(), output_dir.display());

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    save_summary(graph, clusters, output_dir)?;
    save_clusters(clusters, output_dir)?;

    log::info!("Results saved successfully");

    Ok(())
}

/// Save partition statistics
fn save_summary(graph: &Graph, clusters: &[Cluster], output_dir: &Path) -> Result<()> {
    let path = output_dir.join("summary.json");
    let mut file = File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let summary = summarize(graph, clusters);
    let clusterheads: Vec<_> = clusters.iter().map(|c| c.head).collect();

    let document = json!({
        "graph_stats": {
            "node_count": summary.node_count,
            "edge_count": summary.edge_count,
            "component_count": summary.component_count,
            "max_degree": graph.max_degree(),
        },
        "cluster_stats": {
            "cluster_count": summary.cluster_count,
            "largest_cluster_size": summary.largest_cluster_size,
            "smallest_cluster_size": summary.smallest_cluster_size,
            "avg_cluster_size": summary.avg_cluster_size,
            "clusterheads": clusterheads,
        }
    });

    file.write_all(to_string_pretty(&document)?.as_bytes())?;

    Ok(())
}

/// Save every cluster with its members
fn save_clusters(clusters: &[Cluster], output_dir: &Path) -> Result<()> {
    let path = output_dir.join("clusters.json");
    let mut file = File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let document = json!({ "clusters": clusters });
    file.write_all(to_string_pretty(&document)?.as_bytes())?;

    Ok(())
}

//! Visualization generation module
//!
//! Writes Graphviz DOT descriptions of the topology and of the clustered
//! graph, and hands them to an external layout program for rendering.

use anyhow::{anyhow, Context, Result};
use crate::config::Config;
use crate::error::ClusterError;
use crate::graph::{Graph, NodeId};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Fill colors, indexed by clusterhead identity
pub const PALETTE: [&str; 12] = [
    "green", "blue", "black", "red", "yellow", "gray", "brown", "purple", "turquoise", "sienna",
    "orange", "pink",
];

/// Color of the cluster headed by `head`
pub fn cluster_color(head: NodeId) -> &'static str {
    PALETTE[head as usize % PALETTE.len()]
}

fn write_edges(out: &mut String, graph: &Graph) -> std::fmt::Result {
    for (from, to) in graph.edges() {
        writeln!(out, "\t{}--{};", from, to)?;
    }
    Ok(())
}

/// DOT description listing every edge once
pub fn topology_dot(graph: &Graph) -> Result<String> {
    let mut out = String::from("graph {\n");
    write_edges(&mut out, graph)?;
    out.push('}');
    Ok(out)
}

/// DOT description with every node labelled `id,weight` and filled with the
/// color of its cluster
pub fn clustered_dot(graph: &Graph) -> Result<String> {
    if !graph.is_clustered() {
        return Err(ClusterError::NotClustered.into());
    }

    let mut out = String::from("graph {\nlayout=\"fdp\" sep=\"10\"\n");
    for node in graph.nodes() {
        let head = node.cluster_head().unwrap_or(node.id());
        writeln!(
            out,
            "{} [label=\"{},{}\",fillcolor={},fontcolor=white,style=filled];",
            node.id(),
            node.id(),
            node.weight(),
            cluster_color(head)
        )?;
    }
    write_edges(&mut out, graph)?;
    out.push('}');
    Ok(out)
}

/// Write a DOT description to `path`
pub fn write_dot(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Lay out `dot_path` with `program` and render it to PNG at `png_path`
pub fn render(program: &str, dot_path: &Path, png_path: &Path) -> Result<()> {
    log::debug!("Rendering {} with {}", dot_path.display(), program);

    let output = Command::new(program)
        .arg("-Tpng")
        .arg(dot_path)
        .arg("-o")
        .arg(png_path)
        .output()
        .with_context(|| format!("failed to run {}", program))?;

    if !output.status.success() {
        return Err(anyhow!(
            "{} exited with {}: {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    Ok(())
}

/// Write `<name>.dot` into `output_dir` and, if enabled, render `<name>.png`.
///
/// A failed render is logged and does not fail the call; the DOT file is
/// still useful without the layout tool installed.
fn emit(name: &str, contents: &str, output_dir: &Path, config: &Config) -> Result<PathBuf> {
    let dot_path = output_dir.join(format!("{}.dot", name));
    write_dot(&dot_path, contents)?;

    if config.render {
        let png_path = output_dir.join(format!("{}.png", name));
        match render(&config.layout_program, &dot_path, &png_path) {
            Ok(()) => log::info!("Rendered {}", png_path.display()),
            Err(err) => log::warn!("Skipping {}: {:#}", png_path.display(), err),
        }
    }

    Ok(dot_path)
}

/// Topology visualization, available before clustering
pub fn generate_topology_visualization(
    graph: &Graph,
    output_dir: &Path,
    config: &Config,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    emit("topology", &topology_dot(graph)?, output_dir, config)
}

/// Clustered visualization; fails with `NotClustered` before a run
pub fn generate_clustered_visualization(
    graph: &Graph,
    output_dir: &Path,
    config: &Config,
) -> Result<PathBuf> {
    let dot = clustered_dot(graph)?;
    fs::create_dir_all(output_dir)?;
    emit("clustered", &dot, output_dir, config)
}

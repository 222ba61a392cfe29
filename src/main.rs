use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use clusterhead_election::cluster::metrics;
use clusterhead_election::graph::algorithms::{connected_components, local_maxima};
use clusterhead_election::graph::builder::load_topology;
use clusterhead_election::{run_clustering, storage, viz, Config};

#[derive(Parser, Debug)]
#[clap(
    name = "dca",
    about = "Distributed highest-weight clusterhead election over a weighted graph"
)]
struct Cli {
    /// Path to the topology description file
    #[clap(long, short = 'f')]
    file: PathBuf,

    /// Output directory for results and visualizations
    #[clap(long, default_value = "cluster_results")]
    output_dir: PathBuf,

    /// Capacity of each node's inbound queues
    #[clap(long, default_value = "100")]
    mailbox_capacity: usize,

    /// Graphviz program used to render DOT files
    #[clap(long, default_value = "neato")]
    layout: String,

    /// Skip visualizations
    #[clap(long)]
    skip_viz: bool,

    /// Write DOT files but do not render them
    #[clap(long)]
    skip_render: bool,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() {
    let args = Cli::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .parse_default_env()
        .init();

    if let Err(err) = run(args) {
        log::error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run(args: Cli) -> Result<()> {
    let config = Config::new(args.mailbox_capacity, args.layout, !args.skip_render);

    log::info!("Input: {}", args.file.display());
    log::info!("Output: {}", args.output_dir.display());

    // 1. Load topology
    let mut graph = load_topology(&args.file)
        .with_context(|| format!("failed to load topology from {}", args.file.display()))?;

    log::info!(
        "Loaded graph with {} nodes, {} edges and {} components (max degree {})",
        graph.node_count(),
        graph.edge_count(),
        connected_components(&graph).len(),
        graph.max_degree()
    );
    log::info!(
        "{} local maxima will elect themselves at start",
        local_maxima(&graph).len()
    );

    if log::log_enabled!(log::Level::Debug) {
        for node in graph.nodes() {
            log::debug!("{}", graph.adjacency_line(node.id())?);
        }
    }

    std::fs::create_dir_all(&args.output_dir)?;

    if !args.skip_viz {
        viz::generate_topology_visualization(&graph, &args.output_dir, &config)?;
    }

    // 2. Run the election
    run_clustering(&mut graph, &config)?;

    for violation in metrics::validate_partition(&graph)? {
        log::warn!("Partition check: {}", violation);
    }

    // 3. Report
    let clusters = metrics::clusters(&graph)?;
    println!("{}", metrics::format_report(&clusters));

    // 4. Save results
    storage::save_results(&graph, &clusters, &args.output_dir)?;

    if !args.skip_viz {
        viz::generate_clustered_visualization(&graph, &args.output_dir, &config)?;
    }

    log::info!(
        "Found {} clusters. Results saved to {}",
        clusters.len(),
        args.output_dir.display()
    );

    Ok(())
}

//! Decentralized highest-weight clusterhead election over a weighted graph

pub mod config;
pub mod error;
pub mod graph;
pub mod cluster;
pub mod storage;
pub mod viz;

pub use cluster::coordinator::run_clustering;
pub use config::Config;
pub use error::{ClusterError, Result};
pub use graph::{Graph, NodeId, Weight};

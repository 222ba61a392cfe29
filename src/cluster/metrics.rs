//! Partition extraction, validation and statistics

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ClusterError, Result};
use crate::graph::algorithms::connected_components;
use crate::graph::{Graph, Node, NodeId, Weight};

/// Above this many nodes clusters are grouped in parallel
const PARALLEL_THRESHOLD: usize = 1000;

/// A node as listed in a cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: NodeId,
    pub weight: Weight,
}

/// A clusterhead and every node that belongs to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub head: NodeId,
    pub head_weight: Weight,

    /// Clusterhead first, then members by identity
    pub members: Vec<Member>,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn member_ids(&self) -> Vec<NodeId> {
        self.members.iter().map(|member| member.id).collect()
    }
}

/// Group the nodes of a clustered graph by clusterhead, ordered by clusterhead
pub fn clusters(graph: &Graph) -> Result<Vec<Cluster>> {
    if !graph.is_clustered() {
        return Err(ClusterError::NotClustered);
    }

    let assign = |node: &Node| {
        node.cluster_head().map(|head| {
            (
                head,
                Member {
                    id: node.id(),
                    weight: node.weight(),
                },
            )
        })
    };

    let assignments: Vec<(NodeId, Member)> = if graph.node_count() < PARALLEL_THRESHOLD {
        graph.nodes().iter().filter_map(assign).collect()
    } else {
        graph.nodes().par_iter().filter_map(assign).collect()
    };

    let grouped: BTreeMap<NodeId, Vec<Member>> = assignments
        .into_iter()
        .into_group_map()
        .into_iter()
        .collect();

    let mut result = Vec::with_capacity(grouped.len());
    for (head, mut members) in grouped {
        let head_weight = graph
            .node(head)
            .map(Node::weight)
            .ok_or(ClusterError::UnknownNode { id: head })?;
        members.sort_by_key(|member| (member.id != head, member.id));
        result.push(Cluster {
            head,
            head_weight,
            members,
        });
    }

    Ok(result)
}

/// A node whose final state breaks the partition property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    Undecided(NodeId),
    /// Both a clusterhead and a member of some cluster
    ConflictingRoles(NodeId),
    /// Joined a node that is not a clusterhead
    HeadNotClusterhead { node: NodeId, head: NodeId },
    /// Joined a node it is not adjacent to
    HeadNotNeighbor { node: NodeId, head: NodeId },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Undecided(node) => write!(f, "node {} is undecided", node),
            Violation::ConflictingRoles(node) => {
                write!(f, "node {} is both clusterhead and member", node)
            }
            Violation::HeadNotClusterhead { node, head } => {
                write!(f, "node {} joined {}, which is not a clusterhead", node, head)
            }
            Violation::HeadNotNeighbor { node, head } => {
                write!(f, "node {} joined {}, which is not a neighbor", node, head)
            }
        }
    }
}

/// Check that every node is either a clusterhead or a member of a
/// neighboring clusterhead, never both and never neither
pub fn validate_partition(graph: &Graph) -> Result<Vec<Violation>> {
    if !graph.is_clustered() {
        return Err(ClusterError::NotClustered);
    }

    let mut violations = Vec::new();
    for node in graph.nodes() {
        match (node.is_clusterhead(), node.belongs_to()) {
            (true, None) => {}
            (true, Some(_)) => violations.push(Violation::ConflictingRoles(node.id())),
            (false, None) => violations.push(Violation::Undecided(node.id())),
            (false, Some(head)) => {
                if !graph.node(head).map_or(false, Node::is_clusterhead) {
                    violations.push(Violation::HeadNotClusterhead {
                        node: node.id(),
                        head,
                    });
                }
                if !node.neighbors().contains(&head) {
                    violations.push(Violation::HeadNotNeighbor {
                        node: node.id(),
                        head,
                    });
                }
            }
        }
    }

    Ok(violations)
}

/// Console report: one line per cluster with `(id,weight)` of each member
pub fn format_report(clusters: &[Cluster]) -> String {
    clusters
        .iter()
        .map(|cluster| {
            format!(
                "Cluster {}: {}",
                cluster.head,
                cluster
                    .members
                    .iter()
                    .map(|member| format!("({},{})", member.id, member.weight))
                    .join(" ")
            )
        })
        .join("\n")
}

/// Whole-partition statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub component_count: usize,
    pub cluster_count: usize,
    pub largest_cluster_size: usize,
    pub smallest_cluster_size: usize,
    pub avg_cluster_size: f64,
}

pub fn summarize(graph: &Graph, clusters: &[Cluster]) -> PartitionSummary {
    let sizes: Vec<usize> = clusters.iter().map(Cluster::size).collect();
    let total: usize = sizes.iter().sum();

    PartitionSummary {
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        component_count: connected_components(graph).len(),
        cluster_count: clusters.len(),
        largest_cluster_size: sizes.iter().copied().max().unwrap_or(0),
        smallest_cluster_size: sizes.iter().copied().min().unwrap_or(0),
        avg_cluster_size: total as f64
            / if clusters.is_empty() {
                1.0
            } else {
                clusters.len() as f64
            },
    }
}

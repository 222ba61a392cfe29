//! Structural queries over a topology

use std::collections::HashMap;

use petgraph::unionfind::UnionFind;

use crate::error::{ClusterError, Result};
use crate::graph::{Graph, NodeId};

/// Connected components, each sorted by identity, ordered by their lowest identity
pub fn connected_components(graph: &Graph) -> Vec<Vec<NodeId>> {
    let node_count = graph.node_count();
    let mut sets = UnionFind::<usize>::new(node_count);

    for (from, to) in graph.edges() {
        sets.union(from as usize - 1, to as usize - 1);
    }

    // Group by root, keeping first-seen order so components come out sorted
    let mut order: Vec<usize> = Vec::new();
    let mut by_root: HashMap<usize, Vec<NodeId>> = HashMap::new();
    for idx in 0..node_count {
        let root = sets.find(idx);
        by_root
            .entry(root)
            .or_insert_with(|| {
                order.push(root);
                Vec::new()
            })
            .push(idx as NodeId + 1);
    }

    order
        .into_iter()
        .filter_map(|root| by_root.remove(&root))
        .collect()
}

/// Nodes heavier than every one of their neighbors. Isolated nodes count.
pub fn local_maxima(graph: &Graph) -> Vec<NodeId> {
    graph
        .nodes()
        .iter()
        .filter(|node| {
            node.neighbors()
                .iter()
                .filter_map(|&n| graph.node(n))
                .all(|neighbor| neighbor.weight() < node.weight())
        })
        .map(|node| node.id())
        .collect()
}

/// A subgraph renumbered densely from 1
#[derive(Debug, Clone)]
pub struct Subgraph {
    pub graph: Graph,

    /// `original_ids[new_id - 1]` is the identity in the source graph
    pub original_ids: Vec<NodeId>,
}

/// Extract the subgraph induced by `members`.
///
/// Members are renumbered in ascending order of their original identity, so
/// the relative order of identities (and therefore edge direction) is kept.
pub fn induced_subgraph(graph: &Graph, members: &[NodeId]) -> Result<Subgraph> {
    let mut original_ids = members.to_vec();
    original_ids.sort_unstable();
    original_ids.dedup();

    let mut sub = Graph::new();
    let mut old_to_new: HashMap<NodeId, NodeId> = HashMap::with_capacity(original_ids.len());
    for &old in &original_ids {
        let node = graph
            .node(old)
            .ok_or(ClusterError::UnknownNode { id: old })?;
        let new = sub.add_node(node.weight() as i64)?;
        old_to_new.insert(old, new);
    }

    for (from, to) in graph.edges() {
        if let (Some(&a), Some(&b)) = (old_to_new.get(&from), old_to_new.get(&to)) {
            sub.connect_nodes(a, b)?;
        }
    }

    Ok(Subgraph {
        graph: sub,
        original_ids,
    })
}

//! Weighted undirected topology with protocol state attached to each node

use std::collections::HashMap;

use itertools::Itertools;

use crate::cluster::NodeState;
use crate::error::{ClusterError, Result};

/// Node identity, dense and assigned sequentially from 1
pub type NodeId = u32;

/// Node weight, positive and unique across the graph
pub type Weight = u64;

/// Static view of a neighbor handed to a protocol engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peer {
    pub id: NodeId,
    pub weight: Weight,
}

/// A vertex of the topology
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    weight: Weight,
    /// Neighbor identities in the order the edges were declared
    neighbors: Vec<NodeId>,
    /// Final protocol state, written back by the coordinator after a run
    state: NodeState,
}

impl Node {
    fn new(id: NodeId, weight: Weight) -> Self {
        Self {
            id,
            weight,
            neighbors: Vec::new(),
            state: NodeState::default(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn weight(&self) -> Weight {
        self.weight
    }

    pub fn neighbors(&self) -> &[NodeId] {
        &self.neighbors
    }

    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn is_clusterhead(&self) -> bool {
        self.state.is_clusterhead
    }

    pub fn belongs_to(&self) -> Option<NodeId> {
        self.state.belongs_to
    }

    /// Clusterhead of the cluster this node ended up in, if decided
    pub fn cluster_head(&self) -> Option<NodeId> {
        if self.state.is_clusterhead {
            Some(self.id)
        } else {
            self.state.belongs_to
        }
    }
}

/// Topology plus the clustering-complete flag.
///
/// Nodes are stored densely: node `id` lives at index `id - 1`.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,

    /// Weight to owning node, for the uniqueness check
    weight_index: HashMap<Weight, NodeId>,

    edge_count: usize,

    clustered: bool,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with the given weight and return its identity
    pub fn add_node(&mut self, weight: i64) -> Result<NodeId> {
        if weight <= 0 {
            return Err(ClusterError::InvalidWeight { weight });
        }
        let weight = weight as Weight;

        if let Some(&existing) = self.weight_index.get(&weight) {
            return Err(ClusterError::DuplicateWeight { weight, existing });
        }

        let id = self.nodes.len() as NodeId + 1;
        self.nodes.push(Node::new(id, weight));
        self.weight_index.insert(weight, id);

        log::trace!("added node {} with weight {}", id, weight);
        Ok(id)
    }

    /// Connect two existing nodes; `from` must be the lower identity
    pub fn connect_nodes(&mut self, from: NodeId, to: NodeId) -> Result<()> {
        if to <= from {
            return Err(ClusterError::InvalidEdgeOrder { from, to });
        }
        let from_idx = self.index_of(from)?;
        let to_idx = self.index_of(to)?;

        if self.nodes[from_idx].neighbors.contains(&to) {
            return Err(ClusterError::DuplicateEdge { from, to });
        }

        self.nodes[from_idx].neighbors.push(to);
        self.nodes[to_idx].neighbors.push(from);
        self.edge_count += 1;

        log::trace!("connected {} and {}", from, to);
        Ok(())
    }

    fn index_of(&self, id: NodeId) -> Result<usize> {
        if id == 0 || id as usize > self.nodes.len() {
            return Err(ClusterError::UnknownNode { id });
        }
        Ok(id as usize - 1)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index_of(id).ok().map(|idx| &self.nodes[idx])
    }

    /// All nodes in identity order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn max_degree(&self) -> usize {
        self.nodes.iter().map(Node::degree).max().unwrap_or(0)
    }

    /// Every edge once, lower identity first
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut edges = Vec::with_capacity(self.edge_count);
        for node in &self.nodes {
            for &neighbor in &node.neighbors {
                if node.id < neighbor {
                    edges.push((node.id, neighbor));
                }
            }
        }
        edges
    }

    /// Identity and weight of each neighbor of `id`, in neighbor-set order
    pub fn peers(&self, id: NodeId) -> Result<Vec<Peer>> {
        let node = &self.nodes[self.index_of(id)?];
        Ok(node
            .neighbors
            .iter()
            .map(|&n| Peer {
                id: n,
                weight: self.nodes[n as usize - 1].weight,
            })
            .collect())
    }

    /// One adjacency line for `id`: `id -> (n1,w1) (n2,w2) ...`
    pub fn adjacency_line(&self, id: NodeId) -> Result<String> {
        let peers = self.peers(id)?;
        Ok(format!(
            "{} -> {}",
            id,
            peers
                .iter()
                .map(|peer| format!("({},{})", peer.id, peer.weight))
                .join(" ")
        ))
    }

    pub fn is_clustered(&self) -> bool {
        self.clustered
    }

    /// Drop results of any previous run
    pub(crate) fn reset_clustering(&mut self) {
        self.clustered = false;
        for node in &mut self.nodes {
            node.state = NodeState::default();
        }
    }

    /// Install the final engine states and mark the graph clustered
    pub(crate) fn complete_clustering(&mut self, states: Vec<(NodeId, NodeState)>) -> Result<()> {
        for (id, state) in states {
            let idx = self.index_of(id)?;
            self.nodes[idx].state = state;
        }
        self.clustered = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(weights: &[i64]) -> Graph {
        let mut graph = Graph::new();
        for &w in weights {
            graph.add_node(w).unwrap();
        }
        graph
    }

    #[test]
    fn adjacency_line_lists_neighbor_weights() {
        let mut graph = graph_with(&[30, 10, 20]);
        graph.connect_nodes(1, 2).unwrap();
        graph.connect_nodes(2, 3).unwrap();

        assert_eq!(graph.adjacency_line(2).unwrap(), "2 -> (1,30) (3,20)");
        assert_eq!(graph.adjacency_line(1).unwrap(), "1 -> (2,10)");
        assert!(matches!(
            graph.adjacency_line(4),
            Err(ClusterError::UnknownNode { id: 4 })
        ));
    }

    #[test]
    fn identities_are_sequential_from_one() {
        let mut graph = Graph::new();
        assert_eq!(graph.add_node(10).unwrap(), 1);
        assert_eq!(graph.add_node(15).unwrap(), 2);
        assert_eq!(graph.add_node(7).unwrap(), 3);
        assert_eq!(graph.node(2).unwrap().weight(), 15);
    }

    #[test]
    fn duplicate_weight_is_rejected_and_graph_unchanged() {
        let mut graph = graph_with(&[10]);
        match graph.add_node(10) {
            Err(ClusterError::DuplicateWeight { weight, existing }) => {
                assert_eq!(weight, 10);
                assert_eq!(existing, 1);
            }
            other => panic!("expected DuplicateWeight, got {:?}", other),
        }
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.add_node(11).unwrap(), 2);
    }

    #[test]
    fn non_positive_weights_are_rejected() {
        let mut graph = Graph::new();
        assert!(matches!(
            graph.add_node(0),
            Err(ClusterError::InvalidWeight { weight: 0 })
        ));
        assert!(matches!(
            graph.add_node(-3),
            Err(ClusterError::InvalidWeight { weight: -3 })
        ));
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn connect_nodes_requires_ascending_order() {
        let mut graph = graph_with(&[10, 15]);
        assert!(matches!(
            graph.connect_nodes(2, 1),
            Err(ClusterError::InvalidEdgeOrder { from: 2, to: 1 })
        ));
        assert!(matches!(
            graph.connect_nodes(1, 1),
            Err(ClusterError::InvalidEdgeOrder { .. })
        ));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn connect_nodes_rejects_unknown_identities() {
        let mut graph = graph_with(&[10, 15]);
        assert!(matches!(
            graph.connect_nodes(1, 3),
            Err(ClusterError::UnknownNode { id: 3 })
        ));
        assert!(matches!(
            graph.connect_nodes(0, 2),
            Err(ClusterError::UnknownNode { id: 0 })
        ));
    }

    #[test]
    fn connect_nodes_is_symmetric_and_rejects_multi_edges() {
        let mut graph = graph_with(&[10, 15, 20]);
        graph.connect_nodes(1, 2).unwrap();
        graph.connect_nodes(2, 3).unwrap();

        assert_eq!(graph.node(1).unwrap().neighbors(), &[2]);
        assert_eq!(graph.node(2).unwrap().neighbors(), &[1, 3]);
        assert_eq!(graph.node(3).unwrap().neighbors(), &[2]);

        assert!(matches!(
            graph.connect_nodes(1, 2),
            Err(ClusterError::DuplicateEdge { from: 1, to: 2 })
        ));
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edges(), vec![(1, 2), (2, 3)]);
        assert_eq!(graph.max_degree(), 2);
    }

    #[test]
    fn peers_carry_neighbor_weights() {
        let mut graph = graph_with(&[10, 15, 20]);
        graph.connect_nodes(1, 3).unwrap();
        graph.connect_nodes(2, 3).unwrap();

        let peers = graph.peers(3).unwrap();
        assert_eq!(
            peers,
            vec![Peer { id: 1, weight: 10 }, Peer { id: 2, weight: 15 }]
        );
        assert!(graph.peers(4).is_err());
    }

    #[test]
    fn fresh_graph_is_not_clustered() {
        let graph = graph_with(&[1]);
        assert!(!graph.is_clustered());
        assert!(!graph.node(1).unwrap().is_clusterhead());
        assert_eq!(graph.node(1).unwrap().belongs_to(), None);
    }
}

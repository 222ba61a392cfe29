#![allow(dead_code)]

use clusterhead_election::cluster::Phase;
use clusterhead_election::{run_clustering, Config, Graph, NodeId};

/// Build a graph from weights (identity = position + 1) and ascending edges
pub fn build(weights: &[i64], edges: &[(NodeId, NodeId)]) -> Graph {
    let mut graph = Graph::new();
    for &weight in weights {
        graph.add_node(weight).unwrap();
    }
    for &(from, to) in edges {
        graph.connect_nodes(from, to).unwrap();
    }
    graph
}

pub fn cluster(graph: &mut Graph) {
    run_clustering(graph, &Config::default()).unwrap();
}

pub fn phases(graph: &Graph) -> Vec<Phase> {
    graph.nodes().iter().map(|node| node.state().phase()).collect()
}

/// Sequential reference: visit nodes heaviest first; a node joins its
/// heaviest neighboring clusterhead that outweighs it, or becomes a
/// clusterhead when there is none.
pub fn reference_partition(graph: &Graph) -> Vec<Phase> {
    let mut order: Vec<_> = graph.nodes().iter().collect();
    order.sort_by(|a, b| b.weight().cmp(&a.weight()));

    let mut roles: Vec<Option<Phase>> = vec![None; graph.node_count()];
    for node in order {
        let head = node
            .neighbors()
            .iter()
            .map(|&n| graph.node(n).unwrap())
            .filter(|neighbor| neighbor.weight() > node.weight())
            .filter(|neighbor| {
                matches!(roles[neighbor.id() as usize - 1], Some(Phase::Clusterhead))
            })
            .max_by_key(|neighbor| neighbor.weight())
            .map(|neighbor| neighbor.id());

        roles[node.id() as usize - 1] = Some(match head {
            Some(head) => Phase::Member(head),
            None => Phase::Clusterhead,
        });
    }

    roles.into_iter().map(|role| role.unwrap()).collect()
}

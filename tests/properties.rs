mod common;

use clusterhead_election::cluster::metrics::validate_partition;
use clusterhead_election::{ClusterError, Graph, NodeId};
use proptest::prelude::*;

use common::{build, cluster, phases, reference_partition};

/// Distinct shuffled weights and a random subset of the possible edges
fn topology() -> impl Strategy<Value = (Vec<i64>, Vec<(NodeId, NodeId)>)> {
    (1usize..14)
        .prop_flat_map(|n| {
            let weights = Just((1..=n as i64).map(|w| w * 7).collect::<Vec<_>>()).prop_shuffle();
            let mask = prop::collection::vec(any::<bool>(), n * (n - 1) / 2);
            (weights, mask)
        })
        .prop_map(|(weights, mask)| {
            let n = weights.len() as NodeId;
            let mut edges = Vec::new();
            let mut bits = mask.into_iter();
            for from in 1..=n {
                for to in (from + 1)..=n {
                    if bits.next().unwrap_or(false) {
                        edges.push((from, to));
                    }
                }
            }
            (weights, edges)
        })
}

fn heaviest(graph: &Graph) -> NodeId {
    graph
        .nodes()
        .iter()
        .max_by_key(|node| node.weight())
        .map(|node| node.id())
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_node_ends_in_exactly_one_role((weights, edges) in topology()) {
        let mut graph = build(&weights, &edges);
        cluster(&mut graph);

        prop_assert!(graph.nodes().iter().all(|node| node.state().terminated()));
        prop_assert!(validate_partition(&graph).unwrap().is_empty());
    }

    #[test]
    fn heaviest_node_is_clusterhead((weights, edges) in topology()) {
        let mut graph = build(&weights, &edges);
        cluster(&mut graph);

        let top = heaviest(&graph);
        prop_assert!(graph.node(top).unwrap().is_clusterhead());
    }

    #[test]
    fn matches_sequential_reference((weights, edges) in topology()) {
        let mut graph = build(&weights, &edges);
        cluster(&mut graph);

        prop_assert_eq!(phases(&graph), reference_partition(&graph));
    }

    #[test]
    fn clustering_is_idempotent((weights, edges) in topology()) {
        let mut graph = build(&weights, &edges);
        cluster(&mut graph);
        let first = phases(&graph);

        cluster(&mut graph);
        prop_assert_eq!(phases(&graph), first);
    }

    #[test]
    fn duplicate_weight_leaves_graph_unchanged((weights, edges) in topology()) {
        let mut graph = build(&weights, &edges);
        let before = graph.node_count();

        let taken = weights[0];
        let rejected = matches!(
            graph.add_node(taken),
            Err(ClusterError::DuplicateWeight { .. })
        );
        prop_assert!(rejected);
        prop_assert_eq!(graph.node_count(), before);
        prop_assert_eq!(graph.edge_count(), edges.len());
    }
}

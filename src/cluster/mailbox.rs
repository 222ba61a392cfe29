//! Per-node bounded inboxes and per-edge routing entries

use crossbeam::channel::{bounded, Receiver, Sender};

use crate::cluster::{ClusterheadAnnouncement, JoinAnnouncement};
use crate::graph::{Graph, NodeId};

/// Default capacity of each inbound queue
pub const DEFAULT_CAPACITY: usize = 100;

/// The two inbound queues owned by a node
#[derive(Debug)]
pub struct Mailbox {
    pub clusterheads: Receiver<ClusterheadAnnouncement>,
    pub joins: Receiver<JoinAnnouncement>,
}

/// Endpoint of one neighbor's inbound queues
#[derive(Debug, Clone)]
pub struct Route {
    clusterheads: Sender<ClusterheadAnnouncement>,
    joins: Sender<JoinAnnouncement>,
}

/// A message kind that can travel over a [`Route`]
pub trait Announcement: Copy + std::fmt::Debug + Send + 'static {
    fn endpoint(route: &Route) -> &Sender<Self>;
}

impl Announcement for ClusterheadAnnouncement {
    fn endpoint(route: &Route) -> &Sender<Self> {
        &route.clusterheads
    }
}

impl Announcement for JoinAnnouncement {
    fn endpoint(route: &Route) -> &Sender<Self> {
        &route.joins
    }
}

/// Routing table of one node: a route per neighbor, in neighbor-set order
#[derive(Debug, Clone, Default)]
pub struct Routes {
    entries: Vec<(NodeId, Route)>,
}

impl Routes {
    pub fn neighbors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    /// Enqueue `message` at one neighbor. Blocks while the queue is full.
    ///
    /// Returns false if the neighbor has already stopped listening.
    pub fn send<M: Announcement>(&self, to: NodeId, message: M) -> bool {
        match self.entries.iter().find(|(id, _)| *id == to) {
            Some((_, route)) => deliver(to, route, message),
            None => {
                log::warn!("no route to {} for {:?}", to, message);
                false
            }
        }
    }

    /// Send `message` to every neighbor; returns how many accepted it
    pub fn broadcast<M: Announcement>(&self, message: M) -> usize {
        self.entries
            .iter()
            .map(|(to, route)| deliver(*to, route, message))
            .filter(|&accepted| accepted)
            .count()
    }
}

fn deliver<M: Announcement>(to: NodeId, route: &Route, message: M) -> bool {
    match M::endpoint(route).send(message) {
        Ok(()) => {
            log::trace!("delivered {:?} to {}", message, to);
            true
        }
        Err(_) => {
            // Receiver dropped: the neighbor already reached a terminal state
            log::trace!("{} has stopped, dropping {:?}", to, message);
            false
        }
    }
}

/// Mailboxes and routing tables for every node of a graph
pub struct MailboxFabric {
    /// Indexed by `id - 1`, taken out as engines are created
    slots: Vec<Option<(Mailbox, Routes)>>,
}

impl MailboxFabric {
    /// Create the queues of every node and wire one route per edge endpoint.
    ///
    /// A node's queues hold at least `degree` messages: each neighbor sends
    /// at most one announcement of each kind, so no broadcast blocks forever.
    pub fn wire(graph: &Graph, capacity: usize) -> Self {
        let mut endpoints = Vec::with_capacity(graph.node_count());
        let mut mailboxes = Vec::with_capacity(graph.node_count());

        for node in graph.nodes() {
            let effective = capacity.max(node.degree()).max(1);
            if effective > capacity {
                log::debug!(
                    "node {} has degree {}, raising mailbox capacity from {} to {}",
                    node.id(),
                    node.degree(),
                    capacity,
                    effective
                );
            }

            let (ch_tx, ch_rx) = bounded(effective);
            let (join_tx, join_rx) = bounded(effective);
            endpoints.push(Route {
                clusterheads: ch_tx,
                joins: join_tx,
            });
            mailboxes.push(Mailbox {
                clusterheads: ch_rx,
                joins: join_rx,
            });
        }

        let slots = graph
            .nodes()
            .iter()
            .zip(mailboxes)
            .map(|(node, mailbox)| {
                let entries = node
                    .neighbors()
                    .iter()
                    .map(|&n| (n, endpoints[n as usize - 1].clone()))
                    .collect();
                Some((mailbox, Routes { entries }))
            })
            .collect();

        log::debug!(
            "wired {} mailboxes over {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        // `endpoints` drops here, so a queue closes once every neighbor
        // holding a route to it has stopped.
        Self { slots }
    }

    /// Hand out the mailbox and routing table of `id`, once
    pub fn take(&mut self, id: NodeId) -> Option<(Mailbox, Routes)> {
        let idx = (id as usize).checked_sub(1)?;
        self.slots.get_mut(idx)?.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::parse_topology;

    fn star() -> Graph {
        parse_topology("1,10\n2,20\n3,30\n1-2\n1-3").unwrap()
    }

    #[test]
    fn routes_follow_adjacency() {
        let graph = star();
        let mut fabric = MailboxFabric::wire(&graph, DEFAULT_CAPACITY);

        let (_, routes) = fabric.take(1).unwrap();
        assert_eq!(routes.neighbors().collect::<Vec<_>>(), vec![2, 3]);

        let (_, routes) = fabric.take(3).unwrap();
        assert_eq!(routes.neighbors().collect::<Vec<_>>(), vec![1]);

        assert!(fabric.take(3).is_none());
        assert!(fabric.take(0).is_none());
        assert!(fabric.take(9).is_none());
    }

    #[test]
    fn broadcast_reaches_every_neighbor_in_fifo_order() {
        let graph = star();
        let mut fabric = MailboxFabric::wire(&graph, DEFAULT_CAPACITY);
        let (_, routes) = fabric.take(1).unwrap();
        let (inbox2, _) = fabric.take(2).unwrap();
        let (inbox3, _) = fabric.take(3).unwrap();

        let first = JoinAnnouncement { from: 1, target: 3 };
        let second = JoinAnnouncement { from: 1, target: 2 };
        assert_eq!(routes.broadcast(first), 2);
        assert_eq!(routes.broadcast(second), 2);

        assert_eq!(inbox2.joins.try_recv().unwrap(), first);
        assert_eq!(inbox2.joins.try_recv().unwrap(), second);
        assert_eq!(inbox3.joins.try_recv().unwrap(), first);
        assert!(inbox3.clusterheads.try_recv().is_err());
    }

    #[test]
    fn message_kinds_use_separate_queues() {
        let graph = star();
        let mut fabric = MailboxFabric::wire(&graph, DEFAULT_CAPACITY);
        let (_, routes) = fabric.take(3).unwrap();
        let (inbox1, _) = fabric.take(1).unwrap();

        let announcement = ClusterheadAnnouncement { from: 3, weight: 30 };
        assert!(routes.send(1, announcement));
        assert!(!routes.send(2, announcement));

        assert_eq!(inbox1.clusterheads.try_recv().unwrap(), announcement);
        assert!(inbox1.joins.try_recv().is_err());
    }

    #[test]
    fn sending_to_stopped_neighbor_is_dropped() {
        let graph = star();
        let mut fabric = MailboxFabric::wire(&graph, DEFAULT_CAPACITY);
        let (_, routes) = fabric.take(1).unwrap();
        let (inbox2, _) = fabric.take(2).unwrap();
        drop(inbox2);

        assert_eq!(
            routes.broadcast(ClusterheadAnnouncement { from: 1, weight: 10 }),
            1
        );
    }

    #[test]
    fn capacity_covers_degree() {
        let graph = star();
        let mut fabric = MailboxFabric::wire(&graph, 1);
        let (inbox1, _) = fabric.take(1).unwrap();
        let (_, routes2) = fabric.take(2).unwrap();
        let (_, routes3) = fabric.take(3).unwrap();

        // Node 1 has two neighbors, so two messages fit despite capacity 1
        assert!(routes2.send(1, JoinAnnouncement { from: 2, target: 3 }));
        assert!(routes3.send(1, JoinAnnouncement { from: 3, target: 3 }));
        assert_eq!(inbox1.joins.len(), 2);
    }
}

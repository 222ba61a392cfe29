//! Distributed clusterhead election
//!
//! Every node runs its own [`protocol::Engine`] and learns about its
//! neighbors only through the two announcement kinds defined here. The
//! [`coordinator`] starts one engine per node and waits for all of them.

pub mod mailbox;
pub mod protocol;
pub mod coordinator;
pub mod metrics;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::{NodeId, Weight};

/// Broadcast by a node that has become a clusterhead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterheadAnnouncement {
    pub from: NodeId,
    pub weight: Weight,
}

/// Broadcast by a node that has joined the cluster of `target`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinAnnouncement {
    pub from: NodeId,
    pub target: NodeId,
}

/// Heaviest higher neighbor seen so far that had not yet announced anything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: NodeId,
    pub weight: Weight,
}

/// Where a node stands in the election
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Undecided,
    /// Elected, still waiting for lower neighbors to join somewhere
    ClusterheadAnnounced,
    Clusterhead,
    Member(NodeId),
}

/// Protocol state of one node. Only the node's own engine writes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeState {
    pub(crate) is_clusterhead: bool,
    pub(crate) belongs_to: Option<NodeId>,
    pub(crate) candidate: Option<Candidate>,
    pub(crate) received_clusterheads: BTreeMap<NodeId, ClusterheadAnnouncement>,
    pub(crate) received_joins: BTreeMap<NodeId, JoinAnnouncement>,
    pub(crate) terminated: bool,
}

impl NodeState {
    pub fn is_clusterhead(&self) -> bool {
        self.is_clusterhead
    }

    pub fn belongs_to(&self) -> Option<NodeId> {
        self.belongs_to
    }

    pub fn candidate(&self) -> Option<Candidate> {
        self.candidate
    }

    pub fn terminated(&self) -> bool {
        self.terminated
    }

    pub fn received_clusterheads(&self) -> &BTreeMap<NodeId, ClusterheadAnnouncement> {
        &self.received_clusterheads
    }

    pub fn received_joins(&self) -> &BTreeMap<NodeId, JoinAnnouncement> {
        &self.received_joins
    }

    pub fn phase(&self) -> Phase {
        match (self.is_clusterhead, self.belongs_to) {
            (true, _) if self.terminated => Phase::Clusterhead,
            (true, _) => Phase::ClusterheadAnnounced,
            (false, Some(head)) => Phase::Member(head),
            (false, None) => Phase::Undecided,
        }
    }

    /// Record a clusterhead announcement; the first one from a sender wins
    pub(crate) fn record_clusterhead(&mut self, announcement: ClusterheadAnnouncement) {
        self.received_clusterheads
            .entry(announcement.from)
            .or_insert(announcement);
    }

    /// Record a join announcement; the first one from a sender wins
    pub(crate) fn record_join(&mut self, announcement: JoinAnnouncement) {
        self.received_joins
            .entry(announcement.from)
            .or_insert(announcement);
    }
}

//! Per-node election engine
//!
//! A node that outweighs all of its neighbors elects itself clusterhead at
//! start. Every other node defers until its heavier neighbors have resolved,
//! then either joins the heaviest neighboring clusterhead or, if all heavier
//! neighbors joined elsewhere, becomes a clusterhead itself. A clusterhead
//! keeps listening until every lighter neighbor has announced a join.
//!
//! Decisions are taken over the set of announcements received so far, so the
//! outcome does not depend on the interleaving of the two queues.

use crossbeam::channel::{never, Receiver};

use crate::cluster::mailbox::{Mailbox, Routes};
use crate::cluster::{Candidate, ClusterheadAnnouncement, JoinAnnouncement, NodeState};
use crate::graph::{NodeId, Peer, Weight};

/// The actor driving one node through the election
pub struct Engine {
    id: NodeId,
    weight: Weight,
    /// Static neighbor identities and weights
    peers: Vec<Peer>,
    routes: Routes,
    state: NodeState,
}

impl Engine {
    pub fn new(id: NodeId, weight: Weight, peers: Vec<Peer>, routes: Routes) -> Self {
        Self {
            id,
            weight,
            peers,
            routes,
            state: NodeState::default(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    /// Run the node to completion: entry action, then dispatch from both
    /// queues until the node reaches a terminal state.
    pub fn run(mut self, mailbox: Mailbox) -> NodeState {
        let Mailbox { clusterheads, joins } = mailbox;
        let closed_clusterheads: Receiver<ClusterheadAnnouncement> = never();
        let closed_joins: Receiver<JoinAnnouncement> = never();
        let mut clusterheads_open = true;
        let mut joins_open = true;

        self.start();

        while !self.state.terminated {
            if !clusterheads_open && !joins_open {
                log::error!(
                    "[{}] every neighbor stopped before a decision was reached",
                    self.id
                );
                break;
            }

            let clusterhead_rx = if clusterheads_open {
                &clusterheads
            } else {
                &closed_clusterheads
            };
            let join_rx = if joins_open { &joins } else { &closed_joins };

            crossbeam::select! {
                recv(clusterhead_rx) -> msg => match msg {
                    Ok(announcement) => self.handle_clusterhead(announcement),
                    Err(_) => clusterheads_open = false,
                },
                recv(join_rx) -> msg => match msg {
                    Ok(announcement) => self.handle_join(announcement),
                    Err(_) => joins_open = false,
                },
            }
        }

        log::debug!("[{}] stopped as {:?}", self.id, self.state.phase());
        self.state
    }

    /// Entry action: a local maximum elects itself without waiting
    pub fn start(&mut self) {
        log::trace!("[{}] init, weight {}", self.id, self.weight);
        if !self.peers.iter().all(|peer| peer.weight < self.weight) {
            return;
        }

        self.state.is_clusterhead = true;
        log::debug!("[{}] local maximum, elected clusterhead", self.id);
        self.routes.broadcast(ClusterheadAnnouncement {
            from: self.id,
            weight: self.weight,
        });

        if self.lower_confirmed() {
            self.terminate();
        }
    }

    pub fn handle_clusterhead(&mut self, announcement: ClusterheadAnnouncement) {
        if self.state.terminated {
            return;
        }
        log::trace!("[{}] received {:?}", self.id, announcement);
        self.state.record_clusterhead(announcement);

        if self.state.is_clusterhead {
            return;
        }

        if self.can_join(&announcement) {
            self.join(announcement.from);
            return;
        }

        self.update_candidate(&announcement);
    }

    pub fn handle_join(&mut self, announcement: JoinAnnouncement) {
        if self.state.terminated {
            return;
        }
        log::trace!("[{}] received {:?}", self.id, announcement);
        self.state.record_join(announcement);

        if self.state.is_clusterhead {
            if announcement.target == self.id {
                log::debug!("[{}] node {} joined", self.id, announcement.from);
            }
            if self.lower_confirmed() {
                self.terminate();
            }
            return;
        }

        if self.higher().all(|peer| self.has_reported(peer.id)) {
            if self.higher().all(|peer| self.has_joined(peer.id)) {
                self.elect();
            } else if let Some(head) = self.heaviest_clusterhead() {
                self.join(head.from);
            }
            return;
        }

        // Some heavier neighbor is still silent. The heaviest clusterhead heard
        // from so far is safe once everything heavier than it has joined.
        if let Some(head) = self.heaviest_clusterhead() {
            if self.can_join(&head) {
                self.join(head.from);
            }
        }
    }

    fn higher(&self) -> impl Iterator<Item = &Peer> + '_ {
        self.peers.iter().filter(move |peer| peer.weight > self.weight)
    }

    fn has_joined(&self, id: NodeId) -> bool {
        self.state.received_joins.contains_key(&id)
    }

    fn has_reported(&self, id: NodeId) -> bool {
        self.has_joined(id) || self.state.received_clusterheads.contains_key(&id)
    }

    /// Every strictly lighter neighbor has announced a join
    fn lower_confirmed(&self) -> bool {
        self.peers
            .iter()
            .filter(|peer| peer.weight < self.weight)
            .all(|peer| self.has_joined(peer.id))
    }

    /// `head` is a safe choice once every other neighbor heavier than it has
    /// committed to some cluster
    fn can_join(&self, head: &ClusterheadAnnouncement) -> bool {
        self.peers
            .iter()
            .filter(|peer| peer.id != head.from && peer.weight > head.weight)
            .all(|peer| self.has_joined(peer.id))
    }

    fn heaviest_clusterhead(&self) -> Option<ClusterheadAnnouncement> {
        self.state
            .received_clusterheads
            .values()
            .max_by_key(|announcement| announcement.weight)
            .copied()
    }

    fn update_candidate(&mut self, head: &ClusterheadAnnouncement) {
        let best = self
            .peers
            .iter()
            .filter(|peer| peer.id != head.from && peer.weight > head.weight)
            .filter(|peer| !self.has_reported(peer.id))
            .max_by_key(|peer| peer.weight)
            .copied();

        if let Some(peer) = best {
            let better = self
                .state
                .candidate
                .map_or(true, |current| current.weight < peer.weight);
            if better {
                log::trace!("[{}] waiting on candidate {}", self.id, peer.id);
                self.state.candidate = Some(Candidate {
                    id: peer.id,
                    weight: peer.weight,
                });
            }
        }
    }

    fn join(&mut self, head: NodeId) {
        self.state.belongs_to = Some(head);
        log::debug!("[{}] joining cluster of {}", self.id, head);
        self.routes.broadcast(JoinAnnouncement {
            from: self.id,
            target: head,
        });
        self.terminate();
    }

    /// Every heavier neighbor joined elsewhere
    fn elect(&mut self) {
        self.state.is_clusterhead = true;
        log::debug!("[{}] elected clusterhead", self.id);

        if self.lower_confirmed() {
            self.terminate();
        } else {
            self.routes.broadcast(ClusterheadAnnouncement {
                from: self.id,
                weight: self.weight,
            });
        }
    }

    fn terminate(&mut self) {
        self.state.terminated = true;
        log::trace!("[{}] terminated", self.id);
    }
}

//! Runs one protocol engine per node and waits for all of them

use std::time::Instant;

use crossbeam::channel::{bounded, Receiver};
use crossbeam::thread;

use crate::cluster::mailbox::{Mailbox, MailboxFabric};
use crate::cluster::protocol::Engine;
use crate::cluster::NodeState;
use crate::config::Config;
use crate::error::{ClusterError, Result};
use crate::graph::Graph;

/// Cluster `graph` with the distributed election.
///
/// Any previous result is discarded. Each node gets a fresh engine on its own
/// scoped thread; the scope is the barrier, so the graph is only marked
/// clustered once every engine has returned a terminal state.
///
/// Engines hold at a start gate until every thread is spawned. If a spawn
/// fails, the gate closes unopened and the already spawned engines return
/// undecided, so the error surfaces instead of the scope waiting forever.
pub fn run_clustering(graph: &mut Graph, config: &Config) -> Result<()> {
    log::info!(
        "Starting clustering of {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    let started = Instant::now();

    graph.reset_clustering();
    let mut fabric = MailboxFabric::wire(graph, config.mailbox_capacity);

    let mut actors = Vec::with_capacity(graph.node_count());
    for node in graph.nodes() {
        let id = node.id();
        let (mailbox, routes) = fabric.take(id).ok_or(ClusterError::UnknownNode { id })?;
        let engine = Engine::new(id, node.weight(), graph.peers(id)?, routes);
        actors.push((engine, mailbox));
    }
    drop(fabric);

    let (release, gate) = bounded::<()>(actors.len());

    let outcome = thread::scope(|scope| -> Result<Vec<_>> {
        let mut handles = Vec::with_capacity(actors.len());
        for (engine, mailbox) in actors {
            let id = engine.id();
            let gate = gate.clone();
            let handle = scope
                .builder()
                .name(format!("node-{}", id))
                .spawn(move |_| launch(engine, mailbox, gate))?;
            handles.push((id, handle));
        }

        log::debug!("Spawned {} engines, opening start gate", handles.len());
        for (id, _) in &handles {
            release.send(()).map_err(|_| ClusterError::Stalled {
                undecided: vec![*id],
            })?;
        }
        drop(release);

        Ok(handles
            .into_iter()
            .map(|(id, handle)| (id, handle.join()))
            .collect())
    });

    let joined = match outcome {
        Ok(joined) => joined?,
        Err(_) => {
            return Err(ClusterError::Stalled {
                undecided: graph.nodes().iter().map(|node| node.id()).collect(),
            })
        }
    };

    let mut states = Vec::with_capacity(joined.len());
    let mut undecided = Vec::new();
    for (id, result) in joined {
        let state = result.map_err(|_| ClusterError::ActorPanicked { node: id })?;
        if !state.terminated() {
            undecided.push(id);
        }
        states.push((id, state));
    }

    if !undecided.is_empty() {
        log::error!("{} nodes never reached a decision", undecided.len());
        return Err(ClusterError::Stalled { undecided });
    }

    graph.complete_clustering(states)?;

    let clusterheads = graph
        .nodes()
        .iter()
        .filter(|node| node.is_clusterhead())
        .count();
    log::info!(
        "Clustering complete in {:.2?}: {} clusterheads for {} nodes",
        started.elapsed(),
        clusterheads,
        graph.node_count()
    );

    Ok(())
}

/// Wait at the start gate, then run the engine to completion.
///
/// A gate that closes before its signal arrives means the launch was
/// abandoned; the engine returns its initial undecided state.
fn launch(engine: Engine, mailbox: Mailbox, gate: Receiver<()>) -> NodeState {
    match gate.recv() {
        Ok(()) => engine.run(mailbox),
        Err(_) => {
            log::debug!("[{}] launch abandoned before start", engine.id());
            engine.state().clone()
        }
    }
}

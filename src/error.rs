//! Error taxonomy for topology construction, clustering and reporting

use std::io;

use crate::graph::{NodeId, Weight};

/// Crate-level result alias
pub type Result<T, E = ClusterError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("invalid weight {weight}: weights must be positive")]
    InvalidWeight { weight: i64 },

    #[error("duplicate weight {weight}: already assigned to node {existing}")]
    DuplicateWeight { weight: Weight, existing: NodeId },

    #[error("node {id} does not exist")]
    UnknownNode { id: NodeId },

    #[error("invalid edge {from}-{to}: the lower identity must come first")]
    InvalidEdgeOrder { from: NodeId, to: NodeId },

    #[error("edge {from}-{to} is already declared")]
    DuplicateEdge { from: NodeId, to: NodeId },

    #[error("malformed input at line {line}: {content:?}")]
    MalformedInput { line: usize, content: String },

    #[error("graph is not clustered, run the clustering protocol first")]
    NotClustered,

    #[error("clustering stalled, undecided nodes: {undecided:?}")]
    Stalled { undecided: Vec<NodeId> },

    #[error("protocol actor for node {node} panicked")]
    ActorPanicked { node: NodeId },

    #[error(transparent)]
    Io(#[from] io::Error),
}

//! Topology representation and construction module

pub mod topology;
pub mod builder;
pub mod algorithms;

pub use topology::{Graph, Node, NodeId, Peer, Weight};

//! Topology construction from the line-oriented description format
//!
//! One directive per line: `identity,weight` declares a node, `idA-idB`
//! declares an edge between two previously declared nodes with `idA < idB`.

use std::fs;
use std::path::Path;

use crate::error::{ClusterError, Result};
use crate::graph::{Graph, NodeId};

/// A single parsed line of a topology description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Node { declared_id: NodeId, weight: i64 },
    Edge { from: NodeId, to: NodeId },
}

impl Directive {
    /// Parse one trimmed, non-empty line
    pub fn parse(line_no: usize, line: &str) -> Result<Self> {
        let malformed = || ClusterError::MalformedInput {
            line: line_no,
            content: line.to_string(),
        };

        if let Some((id, weight)) = line.split_once(',') {
            let declared_id = id.trim().parse::<NodeId>().map_err(|_| malformed())?;
            let weight = weight.trim().parse::<i64>().map_err(|_| malformed())?;
            return Ok(Directive::Node { declared_id, weight });
        }

        if let Some((from, to)) = line.split_once('-') {
            let from = from.trim().parse::<NodeId>().map_err(|_| malformed())?;
            let to = to.trim().parse::<NodeId>().map_err(|_| malformed())?;
            return Ok(Directive::Edge { from, to });
        }

        Err(malformed())
    }
}

/// Builder for incrementally constructing a Graph from directives
pub struct TopologyBuilder {
    graph: Graph,

    /// Number of lines consumed so far
    lines: usize,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            lines: 0,
        }
    }

    /// Consume the next line of input
    pub fn push_line(&mut self, line: &str) -> Result<()> {
        self.lines += 1;
        let line_no = self.lines;
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        let result = match Directive::parse(line_no, line)? {
            Directive::Node { declared_id, weight } => {
                self.graph.add_node(weight).map(|id| {
                    if id != declared_id {
                        log::warn!(
                            "line {}: node declared as {} was assigned identity {}",
                            line_no,
                            declared_id,
                            id
                        );
                    }
                })
            }
            Directive::Edge { from, to } => self.graph.connect_nodes(from, to),
        };

        result.map_err(|err| {
            log::error!("line {}: {:?} rejected: {}", line_no, line, err);
            err
        })
    }

    pub fn build(self) -> Graph {
        log::debug!(
            "built topology from {} lines: {} nodes, {} edges",
            self.lines,
            self.graph.node_count(),
            self.graph.edge_count()
        );
        self.graph
    }
}

impl Default for TopologyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a graph from an in-memory topology description
pub fn parse_topology(input: &str) -> Result<Graph> {
    let mut builder = TopologyBuilder::new();
    for line in input.lines() {
        builder.push_line(line)?;
    }
    Ok(builder.build())
}

/// Read and parse a topology description file
pub fn load_topology<P: AsRef<Path>>(path: P) -> Result<Graph> {
    let path = path.as_ref();
    log::info!("Reading topology file: {}", path.display());

    let contents = fs::read_to_string(path)?;
    parse_topology(&contents)
}

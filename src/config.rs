//! Configuration management for the clusterhead election

use crate::cluster::mailbox::DEFAULT_CAPACITY;

/// Default layout program used to render DOT files
pub const DEFAULT_LAYOUT_PROGRAM: &str = "neato";

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Capacity of each inbound queue; raised per node to its degree if smaller
    pub mailbox_capacity: usize,

    /// Graphviz program that lays out and renders DOT files
    pub layout_program: String,

    /// Whether DOT files are rendered to PNG after being written
    pub render: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mailbox_capacity: DEFAULT_CAPACITY,
            layout_program: DEFAULT_LAYOUT_PROGRAM.to_string(),
            render: true,
        }
    }
}

impl Config {
    /// Create a new configuration with custom values
    pub fn new(mailbox_capacity: usize, layout_program: impl Into<String>, render: bool) -> Self {
        Self {
            mailbox_capacity,
            layout_program: layout_program.into(),
            render,
        }
    }
}

//! Topology construction and validation errors.
//!
//! Any of these surfacing from a build means the geometry or the hand-built
//! graph is not well-posed for a solve; nothing here is recoverable.

use ecn_core::{BranchId, LinkId, NodeId, ThermId};
use thiserror::Error;

/// Configuration errors raised while building or validating a topology.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// A discretization count or geometry parameter is out of range.
    #[error("invalid discretization: {what}")]
    InvalidDiscretization { what: &'static str },

    /// A branch refers to an electrical node that doesn't exist.
    #[error("branch {branch} references missing node {node}")]
    InvalidNodeRef { branch: BranchId, node: NodeId },

    /// A branch connects a node to itself.
    #[error("branch {branch} is a self-loop on node {node}")]
    SelfLoop { branch: BranchId, node: NodeId },

    /// A branch routes its dissipation to a thermal node that doesn't exist.
    #[error("branch {branch} references missing thermal node {therm}")]
    InvalidThermRef { branch: BranchId, therm: ThermId },

    /// An electrical node maps to a thermal node that doesn't exist.
    #[error("node {node} references missing thermal node {therm}")]
    InvalidNodeThermRef { node: NodeId, therm: ThermId },

    /// A thermal link refers to a thermal node that doesn't exist.
    #[error("link {link} references missing thermal node {therm}")]
    InvalidLinkRef { link: LinkId, therm: ThermId },

    /// A thermal link connects a node to itself.
    #[error("link {link} is a self-loop on thermal node {therm}")]
    LinkSelfLoop { link: LinkId, therm: ThermId },

    /// An electrical node has no incident branches.
    #[error("electrical node {node} is isolated (no incident branches)")]
    IsolatedNode { node: NodeId },

    /// The electrical graph does not form a single connected network.
    #[error(
        "electrical graph is disconnected: {unreached} of {total} nodes unreachable from the positive terminal"
    )]
    Disconnected { unreached: usize, total: usize },

    /// The thermal graph does not form a single connected network.
    #[error("thermal graph is disconnected: {unreached} of {total} nodes unreachable")]
    ThermalDisconnected { unreached: usize, total: usize },

    /// Terminals are missing, equal, or refer to missing nodes.
    #[error("invalid terminals: {what}")]
    BadTerminals { what: &'static str },

    /// Adjacency arrays disagree with the branch list.
    #[error("inconsistent adjacency for node {node}")]
    InconsistentAdjacency { node: NodeId },
}

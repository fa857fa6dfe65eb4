//! ecn-graph: equivalent-circuit-network topology for a discretized cell.
//!
//! Converts cell geometry + discretization counts into an immutable pair of
//! graphs: an electrical graph (collector nodes, resistor/capacitor branches)
//! and a thermal graph (lumped nodes, conductive links), plus the mapping
//! that routes each branch's dissipation to a thermal node.
//!
//! Topology is built once at setup and never mutated during a run.

pub mod builder;
pub mod error;
pub mod geometry;
pub mod graph;
mod validate;

pub use builder::TopologyBuilder;
pub use error::TopologyError;
pub use geometry::{CellGeometry, FormFactor};
pub use graph::{Branch, BranchKind, ElecNode, Sheet, ThermalLink, ThermalNode, Topology};

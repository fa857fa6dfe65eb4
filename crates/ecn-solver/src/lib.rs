//! ecn-solver: per-timestep electrical and thermal network solves.
//!
//! The electrical solver assembles nodal conductance equations (Kirchhoff
//! current law at every node, boundary excitation at the terminals) with
//! backward-Euler companion models for capacitive branches, and solves them
//! by dense LU. The thermal solver advances the lumped heat-balance network
//! one implicit step. Both borrow the immutable topology and the previous
//! committed state; neither caches state across steps.

pub mod electrical;
pub mod error;
mod linear;
pub mod thermal;

pub use electrical::{ElectricalSolution, ElectricalState, Excitation, solve_electrical};
pub use error::{SolverError, SolverResult};
pub use thermal::{
    BoundaryConditions, DivergencePolicy, ThermalBounds, ThermalSolution, solve_thermal,
};

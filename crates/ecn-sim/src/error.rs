//! Run-level error taxonomy.
//!
//! Everything a simulation can fail with, flattened into one enum so
//! callers match on a single type. Per-step solver failures are
//! re-sorted into the taxonomy rather than carried opaquely.

use ecn_core::{EcnError, ThermId};
use ecn_graph::TopologyError;
use ecn_props::LookupError;
use ecn_solver::SolverError;
use thiserror::Error;

/// Errors produced while constructing or running a `Simulation`.
#[derive(Error, Debug)]
pub enum SimError {
    /// The topology or run configuration is invalid.
    #[error("configuration error: {0}")]
    Configuration(#[from] TopologyError),

    /// A property table could not produce a value for the current state.
    #[error("property lookup failed: {0}")]
    PropertyLookup(#[from] LookupError),

    /// The assembled linear system is singular or ill-conditioned.
    #[error("singular system: {what}")]
    SingularSystem { what: String },

    /// A temperature left the configured physical bounds.
    #[error("thermal divergence at node {node}: {t_k} K")]
    ThermalDivergence { node: ThermId, t_k: f64 },

    /// The electro-thermal coupling iteration did not settle within
    /// the configured iteration budget.
    #[error("coupling failed to converge: {what}")]
    Convergence { what: String },

    /// Invalid run options, profile, or solver inputs.
    #[error("invalid argument: {what}")]
    InvalidArg { what: String },
}

impl From<EcnError> for SimError {
    fn from(err: EcnError) -> Self {
        SimError::InvalidArg {
            what: err.to_string(),
        }
    }
}

impl From<SolverError> for SimError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::SingularSystem { what } => SimError::SingularSystem { what },
            SolverError::ThermalDivergence { node, t_k } => {
                SimError::ThermalDivergence { node, t_k }
            }
            SolverError::Lookup(e) => SimError::PropertyLookup(e),
            SolverError::Setup { .. } | SolverError::NonFinite { .. } => SimError::InvalidArg {
                what: err.to_string(),
            },
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;

//! Error types for the per-step solvers.

use ecn_core::ThermId;
use ecn_props::LookupError;
use thiserror::Error;

/// Errors that can occur during a single-step solve.
#[derive(Error, Debug)]
pub enum SolverError {
    /// The assembled system is singular or ill-conditioned beyond tolerance.
    /// Signals a degenerate network; fatal for the run.
    #[error("singular system: {what}")]
    SingularSystem { what: String },

    /// A temperature left the configured physical bounds.
    #[error("thermal divergence at node {node}: {t_k} K")]
    ThermalDivergence { node: ThermId, t_k: f64 },

    /// Inconsistent inputs (state vector lengths, non-positive dt, ...).
    #[error("solver setup error: {what}")]
    Setup { what: String },

    /// Property resolver could not produce a value for the current state.
    #[error("property lookup failed: {0}")]
    Lookup(#[from] LookupError),

    /// A solved quantity came out NaN/inf.
    #[error("non-finite {what}")]
    NonFinite { what: &'static str },
}

pub type SolverResult<T> = Result<T, SolverError>;

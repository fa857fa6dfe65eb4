//! Property lookup errors.
//!
//! A lookup failure is fatal for the current timestep: the stepper aborts
//! the step without committing any state.

use thiserror::Error;

pub type LookupResult<T> = Result<T, LookupError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    /// Query outside the table range with `Extrapolation::Fail`.
    #[error("{what} out of table range: {value} not in [{lo}, {hi}]")]
    OutOfRange {
        what: &'static str,
        value: f64,
        lo: f64,
        hi: f64,
    },

    /// Table rejected at construction (bad axes, dimension mismatch, ...).
    #[error("invalid table for {what}: {why}")]
    BadTable {
        what: &'static str,
        why: &'static str,
    },

    /// Query or table value is NaN/inf.
    #[error("non-finite {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    /// Interpolated value violates a physical bound (e.g. resistance <= 0).
    #[error("non-physical {what}: {value}")]
    NonPhysical { what: &'static str, value: f64 },
}

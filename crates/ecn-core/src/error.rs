use thiserror::Error;

pub type EcnResult<T> = Result<T, EcnError>;

/// Foundation-level failures shared by the numeric helpers.
///
/// Domain crates define their own richer enums (`TopologyError`,
/// `LookupError`, ...) and convert into the sim-level error at the top.
#[derive(Error, Debug)]
pub enum EcnError {
    #[error("non-finite value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("{what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: f64 },
}

use crate::{EcnError, EcnResult};

/// Floating point type used throughout the solver core.
pub type Real = f64;

/// Absolute/relative tolerance pair for state comparisons.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> EcnResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(EcnError::NonFinite { what, value: v })
    }
}

/// Require a strictly positive, finite value (step sizes, tolerances, capacities).
pub fn ensure_positive(v: Real, what: &'static str) -> EcnResult<Real> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(EcnError::NonPositive { what, value: v })
    }
}

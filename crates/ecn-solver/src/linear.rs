//! Dense LU solve with singularity detection shared by both solvers.

use nalgebra::{DMatrix, DVector};

use crate::error::{SolverError, SolverResult};

/// Relative pivot threshold below which the factorization is treated as
/// singular (disconnected or degenerate network).
const PIVOT_RTOL: f64 = 1e-12;

/// Solve `a * x = b`, rejecting singular and near-singular systems.
pub(crate) fn solve_dense(
    a: DMatrix<f64>,
    b: &DVector<f64>,
    what: &'static str,
) -> SolverResult<DVector<f64>> {
    let n = a.nrows();
    let lu = a.lu();

    // Near-singularity check on the U diagonal: the smallest pivot relative
    // to the largest bounds the conditioning we accept.
    let u = lu.u();
    let mut min_pivot = f64::INFINITY;
    let mut max_pivot: f64 = 0.0;
    for i in 0..n {
        let p = u[(i, i)].abs();
        min_pivot = min_pivot.min(p);
        max_pivot = max_pivot.max(p);
    }
    if !(min_pivot.is_finite() && max_pivot.is_finite()) || min_pivot <= PIVOT_RTOL * max_pivot {
        return Err(SolverError::SingularSystem {
            what: format!("{what}: pivot ratio {:.3e}", min_pivot / max_pivot),
        });
    }

    let x = lu.solve(b).ok_or_else(|| SolverError::SingularSystem {
        what: format!("{what}: LU back-substitution failed"),
    })?;

    if x.iter().any(|v| !v.is_finite()) {
        return Err(SolverError::NonFinite { what });
    }

    Ok(x)
}

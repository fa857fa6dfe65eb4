//! Thermal network solve for one timestep.
//!
//! Lumped-capacitance nodal heat balance advanced by one backward-Euler
//! step:
//!
//! ```text
//! (C/Δt + K + H) · T_new = (C/Δt) · T_old + Q + H · T_amb
//! ```
//!
//! where `K` is the conductive link matrix and `H` the diagonal convective
//! conductance of exposed nodes. The implicit scheme is unconditionally
//! stable, which matters here: heat capacities across a discretized cell can
//! span orders of magnitude.

use nalgebra::{DMatrix, DVector};

use ecn_core::ThermId;
use ecn_graph::Topology;
use ecn_props::PropertyResolver;

use crate::error::{SolverError, SolverResult};
use crate::linear::solve_dense;

/// Ambient/convective boundary conditions.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryConditions {
    /// Ambient temperature (K).
    pub ambient_k: f64,
    /// Convective conductance per exposed face (W/K). A node with
    /// `exposed_faces == 0` exchanges nothing with ambient.
    pub htc_w_per_k_face: f64,
}

impl Default for BoundaryConditions {
    fn default() -> Self {
        Self {
            ambient_k: 298.15,
            htc_w_per_k_face: 0.5,
        }
    }
}

/// Physical plausibility bounds on solved temperatures.
#[derive(Debug, Clone, Copy)]
pub struct ThermalBounds {
    pub min_k: f64,
    pub max_k: f64,
}

impl Default for ThermalBounds {
    fn default() -> Self {
        // Below freezing electrolyte to well past thermal-runaway onset;
        // anything outside is a solver artefact, not physics.
        Self {
            min_k: 150.0,
            max_k: 500.0,
        }
    }
}

/// What to do when a solved temperature leaves the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DivergencePolicy {
    /// Abort the run (default).
    #[default]
    Fatal,
    /// Log and keep stepping with the out-of-bounds state.
    Degraded,
}

/// Result of one thermal solve.
#[derive(Debug, Clone)]
pub struct ThermalSolution {
    /// Updated node temperatures (K).
    pub temperatures: Vec<f64>,
    /// Convective heat currently leaving through the boundary (W),
    /// evaluated at the new temperatures.
    pub boundary_loss_w: f64,
}

/// Advance all node temperatures one implicit step.
///
/// `node_heat_w` is this step's generated heat per thermal node, from the
/// electrical solve. Non-finite results are always fatal; bound violations
/// follow `policy`.
pub fn solve_thermal(
    topo: &Topology,
    resolver: &impl PropertyResolver,
    bc: &BoundaryConditions,
    prev_temps: &[f64],
    node_heat_w: &[f64],
    dt: f64,
    bounds: &ThermalBounds,
    policy: DivergencePolicy,
) -> SolverResult<ThermalSolution> {
    let n = topo.therm_nodes().len();
    if prev_temps.len() != n {
        return Err(SolverError::Setup {
            what: format!(
                "temperature state length {} != thermal node count {n}",
                prev_temps.len()
            ),
        });
    }
    if node_heat_w.len() != n {
        return Err(SolverError::Setup {
            what: format!(
                "heat vector length {} != thermal node count {n}",
                node_heat_w.len()
            ),
        });
    }
    if !(dt.is_finite() && dt > 0.0) {
        return Err(SolverError::Setup {
            what: format!("dt must be positive, got {dt}"),
        });
    }

    let mut a = DMatrix::<f64>::zeros(n, n);
    let mut rhs = DVector::<f64>::zeros(n);

    // Capacitance and boundary terms on the diagonal.
    for (i, node) in topo.therm_nodes().iter().enumerate() {
        let cap = resolver.heat_capacity(node, prev_temps[i])?;
        let c_over_dt = cap / dt;
        let h = bc.htc_w_per_k_face * f64::from(node.exposed_faces);
        a[(i, i)] += c_over_dt + h;
        rhs[i] += c_over_dt * prev_temps[i] + node_heat_w[i] + h * bc.ambient_k;
    }

    // Conductive links; conductance evaluated at the mean face temperature.
    for link in topo.links() {
        let ia = link.a.idx();
        let ib = link.b.idx();
        let t_face = 0.5 * (prev_temps[ia] + prev_temps[ib]);
        let g = resolver.link_conductance(link, t_face)?;
        a[(ia, ia)] += g;
        a[(ib, ib)] += g;
        a[(ia, ib)] -= g;
        a[(ib, ia)] -= g;
    }

    let x = solve_dense(a, &rhs, "thermal nodal system")?;
    let temperatures: Vec<f64> = x.iter().copied().collect();

    // Bounds check; non-finite was already rejected by the solve.
    for (i, &t_k) in temperatures.iter().enumerate() {
        if t_k < bounds.min_k || t_k > bounds.max_k {
            let node = ThermId::from_index(i as u32);
            match policy {
                DivergencePolicy::Fatal => {
                    return Err(SolverError::ThermalDivergence { node, t_k });
                }
                DivergencePolicy::Degraded => {
                    tracing::warn!(%node, t_k, "temperature out of bounds, continuing degraded");
                }
            }
        }
    }

    let mut boundary_loss_w = 0.0;
    for (i, node) in topo.therm_nodes().iter().enumerate() {
        let h = bc.htc_w_per_k_face * f64::from(node.exposed_faces);
        boundary_loss_w += h * (temperatures[i] - bc.ambient_k);
    }

    Ok(ThermalSolution {
        temperatures,
        boundary_loss_w,
    })
}

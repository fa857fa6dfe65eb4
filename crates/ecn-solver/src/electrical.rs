//! Electrical network solve for one timestep.
//!
//! Nodal formulation with the negative terminal as ground. Resistive
//! branches stamp their conductance; cell EMFs enter as Norton equivalents;
//! capacitor branches use the backward-Euler companion model
//! `G_eq = C/Δt`, `I_eq = G_eq · v_prev`, which keeps the step
//! unconditionally stable. Voltage excitation augments the system with one
//! extra unknown (the terminal current).
//!
//! Sign conventions: branch current is positive from `a` to `b`; positive
//! applied current enters the positive tab, crosses each unit pos→neg, and
//! discharges it (SOC decreases).

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use ecn_graph::{Branch, BranchKind, Topology};
use ecn_props::{LookupError, PropertyResolver};

use crate::error::{SolverError, SolverResult};
use crate::linear::solve_dense;

/// Boundary excitation applied at the terminal pair for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Excitation {
    /// Applied terminal current (A); positive discharges the cell.
    Current(f64),
    /// Applied terminal voltage (V); terminal current becomes an unknown.
    Voltage(f64),
}

/// Electrical state carried between steps (owned by the state store).
#[derive(Debug, Clone, PartialEq)]
pub struct ElectricalState {
    /// Node voltages (V), negative terminal fixed at zero.
    pub voltages: Vec<f64>,
    /// State of charge per spatial unit, in [0, 1].
    pub soc: Vec<f64>,
    /// Set once any unit's SOC had to be clamped (over/under-discharge).
    pub soc_out_of_range: bool,
}

impl ElectricalState {
    /// State at rest: zero node voltages, uniform SOC.
    pub fn rest(topo: &Topology, initial_soc: f64) -> Self {
        Self {
            voltages: vec![0.0; topo.elec_nodes().len()],
            soc: vec![initial_soc; topo.n_units()],
            soc_out_of_range: !(0.0..=1.0).contains(&initial_soc),
        }
    }
}

/// Result of one electrical solve.
#[derive(Debug, Clone)]
pub struct ElectricalSolution {
    /// Node voltages (V).
    pub voltages: Vec<f64>,
    /// Branch currents (A), positive a→b.
    pub branch_currents: Vec<f64>,
    /// I²R dissipation per branch (W); zero for capacitor branches.
    pub branch_heat_w: Vec<f64>,
    /// Dissipation aggregated onto thermal nodes (W).
    pub node_heat_w: Vec<f64>,
    /// Updated SOC per unit (clamped to [0, 1]).
    pub soc: Vec<f64>,
    pub soc_out_of_range: bool,
    /// v(pos) − v(neg) for this step.
    pub terminal_voltage: f64,
    /// Applied (or, under voltage excitation, solved) terminal current.
    pub terminal_current: f64,
}

/// Per-branch linearized coefficients for this step: `i = g·(v_a − v_b − e)`.
struct Coeff {
    g: f64,
    e: f64,
    /// Whether `i²/g` is real dissipation (false for companion branches).
    dissipative: bool,
}

fn branch_coeff(
    branch: &Branch,
    resolver: &impl PropertyResolver,
    temps: &[f64],
    prev: &ElectricalState,
    dt: f64,
) -> Result<Coeff, LookupError> {
    let t_k = temps[branch.thermal.idx()];
    let soc = branch.unit.map_or(0.0, |u| prev.soc[u]);
    match branch.kind {
        BranchKind::Collector => {
            let r = resolver.branch_resistance(branch, t_k, soc)?;
            Ok(Coeff {
                g: 1.0 / r,
                e: 0.0,
                dissipative: true,
            })
        }
        BranchKind::Cell => {
            let r = resolver.branch_resistance(branch, t_k, soc)?;
            let e = resolver.open_circuit_voltage(branch, t_k, soc)?;
            Ok(Coeff {
                g: 1.0 / r,
                e,
                dissipative: true,
            })
        }
        BranchKind::Capacitor => {
            let c = resolver.branch_capacitance(branch, t_k, soc)?;
            let v_prev = prev.voltages[branch.a.idx()] - prev.voltages[branch.b.idx()];
            Ok(Coeff {
                g: c / dt,
                e: v_prev,
                dissipative: false,
            })
        }
    }
}

/// Assemble and solve the nodal equations for one timestep.
///
/// `temps` holds one temperature (K) per thermal node; `prev` is the last
/// committed electrical state. Fails with
/// [`SolverError::SingularSystem`] on a degenerate network and
/// [`SolverError::Lookup`] when the resolver cannot produce a value.
pub fn solve_electrical(
    topo: &Topology,
    resolver: &impl PropertyResolver,
    temps: &[f64],
    prev: &ElectricalState,
    excitation: Excitation,
    dt: f64,
) -> SolverResult<ElectricalSolution> {
    let n_nodes = topo.elec_nodes().len();
    if prev.voltages.len() != n_nodes {
        return Err(SolverError::Setup {
            what: format!(
                "voltage state length {} != node count {}",
                prev.voltages.len(),
                n_nodes
            ),
        });
    }
    if prev.soc.len() != topo.n_units() {
        return Err(SolverError::Setup {
            what: format!(
                "soc state length {} != unit count {}",
                prev.soc.len(),
                topo.n_units()
            ),
        });
    }
    if temps.len() != topo.therm_nodes().len() {
        return Err(SolverError::Setup {
            what: format!(
                "temperature slice length {} != thermal node count {}",
                temps.len(),
                topo.therm_nodes().len()
            ),
        });
    }
    if !(dt.is_finite() && dt > 0.0) {
        return Err(SolverError::Setup {
            what: format!("dt must be positive, got {dt}"),
        });
    }

    // Resolve per-branch coefficients; lookups are independent so this is
    // the one internally-parallel part of the assembly.
    let coeffs: Vec<Coeff> = topo
        .branches()
        .par_iter()
        .map(|b| branch_coeff(b, resolver, temps, prev, dt))
        .collect::<Result<_, _>>()?;

    // Reduced indexing: ground (negative terminal) is eliminated.
    let ground = topo.neg_terminal().idx();
    let col = |node_idx: usize| -> Option<usize> {
        if node_idx == ground {
            None
        } else if node_idx > ground {
            Some(node_idx - 1)
        } else {
            Some(node_idx)
        }
    };

    let n_red = n_nodes - 1;
    let aug = matches!(excitation, Excitation::Voltage(_)) as usize;
    let dim = n_red + aug;
    let mut a = DMatrix::<f64>::zeros(dim, dim);
    let mut rhs = DVector::<f64>::zeros(dim);

    for (branch, coeff) in topo.branches().iter().zip(&coeffs) {
        let ia = col(branch.a.idx());
        let ib = col(branch.b.idx());
        let src = coeff.g * coeff.e;

        if let Some(i) = ia {
            a[(i, i)] += coeff.g;
            rhs[i] += src;
        }
        if let Some(j) = ib {
            a[(j, j)] += coeff.g;
            rhs[j] -= src;
        }
        if let (Some(i), Some(j)) = (ia, ib) {
            a[(i, j)] -= coeff.g;
            a[(j, i)] -= coeff.g;
        }
    }

    let pos = col(topo.pos_terminal().idx()).ok_or_else(|| SolverError::Setup {
        what: "positive terminal coincides with ground".to_string(),
    })?;
    match excitation {
        Excitation::Current(i_app) => {
            rhs[pos] += i_app;
        }
        Excitation::Voltage(v_app) => {
            // KCL at the positive tab gains the source current unknown;
            // the extra row pins the tab voltage.
            let m = n_red;
            a[(pos, m)] = -1.0;
            a[(m, pos)] = 1.0;
            rhs[m] = v_app;
        }
    }

    let x = solve_dense(a, &rhs, "electrical nodal system")?;

    let mut voltages = vec![0.0; n_nodes];
    for (idx, v) in voltages.iter_mut().enumerate() {
        if let Some(i) = col(idx) {
            *v = x[i];
        }
    }

    // Post-process branch currents and dissipation.
    let n_branches = topo.branches().len();
    let mut branch_currents = vec![0.0; n_branches];
    let mut branch_heat_w = vec![0.0; n_branches];
    let mut node_heat_w = vec![0.0; topo.therm_nodes().len()];
    for (bi, (branch, coeff)) in topo.branches().iter().zip(&coeffs).enumerate() {
        let v_ab = voltages[branch.a.idx()] - voltages[branch.b.idx()];
        let i = coeff.g * (v_ab - coeff.e);
        branch_currents[bi] = i;
        if coeff.dissipative {
            // i²R with R = 1/g.
            let q = i * i / coeff.g;
            branch_heat_w[bi] = q;
            node_heat_w[branch.thermal.idx()] += q;
        }
    }

    // SOC integration per unit: positive cell-branch current (pos→neg)
    // drains the unit's capacity.
    let mut soc = prev.soc.clone();
    let mut out_of_range = prev.soc_out_of_range;
    for branch in topo.cell_branches() {
        // Builders always assign cell branches a unit slot.
        let Some(u) = branch.unit else { continue };
        let q_cap = resolver.unit_capacity(u);
        if !(q_cap.is_finite() && q_cap > 0.0) {
            return Err(SolverError::Setup {
                what: format!("unit {u} capacity must be positive, got {q_cap}"),
            });
        }
        let delta = branch_currents[branch.id.idx()] * dt / q_cap;
        let raw = soc[u] - delta;
        if !(0.0..=1.0).contains(&raw) {
            out_of_range = true;
        }
        soc[u] = raw.clamp(0.0, 1.0);
    }

    let terminal_voltage = voltages[topo.pos_terminal().idx()];
    let terminal_current = match excitation {
        Excitation::Current(i_app) => i_app,
        Excitation::Voltage(_) => x[n_red],
    };

    tracing::debug!(
        terminal_voltage,
        terminal_current,
        "electrical step solved"
    );

    Ok(ElectricalSolution {
        voltages,
        branch_currents,
        branch_heat_w,
        node_heat_w,
        soc,
        soc_out_of_range: out_of_range,
        terminal_voltage,
        terminal_current,
    })
}

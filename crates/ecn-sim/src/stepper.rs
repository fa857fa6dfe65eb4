//! Fixed-step coupled time loop.
//!
//! Each step runs a Gauss-Seidel style inner iteration: solve the
//! electrical network at the latest temperature iterate, advance the
//! thermal network from the last committed temperatures with the
//! resulting heat, and repeat until successive temperature iterates
//! agree within tolerance. Properties depend on temperature, so a
//! converged step needs at least two electrical solves. State is
//! committed to the store only once both halves of a step have
//! succeeded.

use ecn_core::ensure_positive;
use ecn_graph::Topology;
use ecn_props::PropertyResolver;
use ecn_solver::{
    solve_electrical, solve_thermal, BoundaryConditions, DivergencePolicy, ElectricalSolution,
    ElectricalState, ThermalBounds, ThermalSolution,
};

use crate::error::{SimError, SimResult};
use crate::profile::ExcitationProfile;
use crate::store::{StateStore, StepState};

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimPhase {
    /// Constructed, no step taken yet.
    Initializing,
    /// A step is in flight.
    Stepping,
    /// The last step committed successfully; more remain.
    ConvergedStep,
    /// A step failed; the store holds the last committed state.
    Faulted,
    /// The run reached its end time or step budget.
    Completed,
}

/// Run configuration.
#[derive(Debug, Clone)]
pub struct SimOptions {
    /// Timestep (s).
    pub dt: f64,
    /// End of the run; defaults to the profile's last timestamp.
    pub t_end: Option<f64>,
    /// Hard cap on committed steps.
    pub max_steps: usize,
    /// Record every Nth step (endpoints are always recorded).
    pub record_every: usize,
    /// Budget for the inner electro-thermal iteration (minimum 2).
    pub max_coupling_iters: usize,
    /// Temperature agreement (K) that ends the inner iteration.
    pub coupling_tol_k: f64,
    pub initial_soc: f64,
    /// Uniform initial temperature (K).
    pub initial_temp_k: f64,
    pub boundary: BoundaryConditions,
    pub bounds: ThermalBounds,
    pub divergence: DivergencePolicy,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 1.0,
            t_end: None,
            max_steps: 1_000_000,
            record_every: 1,
            max_coupling_iters: 8,
            coupling_tol_k: 1e-3,
            initial_soc: 1.0,
            initial_temp_k: 298.15,
            boundary: BoundaryConditions::default(),
            bounds: ThermalBounds::default(),
            divergence: DivergencePolicy::default(),
        }
    }
}

/// A transient run over one topology.
///
/// Drive it with [`Simulation::run`], or call [`Simulation::step`] in a
/// loop to interleave with external control; every return from `step`
/// leaves the store at a fully committed state, so a caller can stop
/// between steps and keep whatever has been simulated so far.
#[derive(Debug)]
pub struct Simulation<'a, R: PropertyResolver> {
    topo: &'a Topology,
    resolver: &'a R,
    profile: &'a ExcitationProfile,
    opts: SimOptions,
    store: StateStore,
    phase: SimPhase,
    elec: ElectricalState,
    t_end: f64,
}

impl<'a, R: PropertyResolver> Simulation<'a, R> {
    pub fn new(
        topo: &'a Topology,
        resolver: &'a R,
        profile: &'a ExcitationProfile,
        opts: SimOptions,
    ) -> SimResult<Self> {
        ensure_positive(opts.dt, "dt")?;
        if opts.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be at least 1".into(),
            });
        }
        if opts.record_every == 0 {
            return Err(SimError::InvalidArg {
                what: "record_every must be at least 1".into(),
            });
        }
        if opts.max_coupling_iters < 2 {
            return Err(SimError::InvalidArg {
                what: "max_coupling_iters must be at least 2".into(),
            });
        }
        ensure_positive(opts.coupling_tol_k, "coupling_tol_k")?;
        if !(0.0..=1.0).contains(&opts.initial_soc) {
            return Err(SimError::InvalidArg {
                what: format!("initial_soc must be in [0, 1], got {}", opts.initial_soc),
            });
        }
        ensure_positive(opts.initial_temp_k, "initial_temp_k")?;
        let t_end = opts.t_end.unwrap_or_else(|| profile.end_time());
        ensure_positive(t_end, "t_end")?;

        let elec = ElectricalState::rest(topo, opts.initial_soc);
        let initial = StepState {
            step: 0,
            time_s: 0.0,
            voltages: elec.voltages.clone(),
            branch_currents: vec![0.0; topo.branches().len()],
            soc: elec.soc.clone(),
            soc_out_of_range: elec.soc_out_of_range,
            temperatures: vec![opts.initial_temp_k; topo.therm_nodes().len()],
            node_heat_w: vec![0.0; topo.therm_nodes().len()],
            terminal_voltage: 0.0,
            terminal_current: 0.0,
            cumulative_heat_j: 0.0,
            cumulative_loss_j: 0.0,
        };
        let store = StateStore::new(initial, opts.record_every);
        Ok(Self {
            topo,
            resolver,
            profile,
            opts,
            store,
            phase: SimPhase::Initializing,
            elec,
            t_end,
        })
    }

    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Advance one step. Returns the phase after the step: either
    /// another step is possible, or the run has completed. A no-op on a
    /// run that is already `Completed` or `Faulted`.
    pub fn step(&mut self) -> SimResult<SimPhase> {
        match self.phase {
            SimPhase::Completed | SimPhase::Faulted => return Ok(self.phase),
            SimPhase::Initializing | SimPhase::Stepping | SimPhase::ConvergedStep => {}
        }

        let prev = self.store.current();
        let half_dt = 0.5 * self.opts.dt;
        if prev.time_s + half_dt >= self.t_end || prev.step >= self.opts.max_steps {
            self.phase = SimPhase::Completed;
            self.store.finalize();
            return Ok(self.phase);
        }

        self.phase = SimPhase::Stepping;
        match self.coupled_step() {
            Ok(state) => {
                tracing::debug!(
                    step = state.step,
                    time_s = state.time_s,
                    terminal_voltage = state.terminal_voltage,
                    "step committed"
                );
                self.store.commit(state);
                let now = self.store.current();
                self.elec = ElectricalState {
                    voltages: now.voltages.clone(),
                    soc: now.soc.clone(),
                    soc_out_of_range: now.soc_out_of_range,
                };
                if now.time_s + half_dt >= self.t_end || now.step >= self.opts.max_steps {
                    self.phase = SimPhase::Completed;
                    self.store.finalize();
                } else {
                    self.phase = SimPhase::ConvergedStep;
                }
                Ok(self.phase)
            }
            Err(err) => {
                self.phase = SimPhase::Faulted;
                tracing::warn!(error = %err, "step failed; run faulted");
                Err(err)
            }
        }
    }

    /// Step until the run completes. On error the store still holds the
    /// last committed state.
    pub fn run(&mut self) -> SimResult<()> {
        while self.step()? != SimPhase::Completed {}
        Ok(())
    }

    /// One coupled electro-thermal step from the current committed state.
    fn coupled_step(&self) -> SimResult<StepState> {
        let prev = self.store.current();
        let dt = self.opts.dt;
        let excitation = self.profile.excitation_at(prev.time_s);

        // The thermal step always advances from the committed temperatures;
        // the iteration only refines which temperature the electrical
        // properties are evaluated at.
        let mut temps_iter = prev.temperatures.clone();
        let mut converged: Option<(ElectricalSolution, ThermalSolution)> = None;
        for iter in 1..=self.opts.max_coupling_iters {
            let elec = solve_electrical(
                self.topo,
                self.resolver,
                &temps_iter,
                &self.elec,
                excitation,
                dt,
            )?;
            let therm = solve_thermal(
                self.topo,
                self.resolver,
                &self.opts.boundary,
                &prev.temperatures,
                &elec.node_heat_w,
                dt,
                &self.opts.bounds,
                self.opts.divergence,
            )?;

            let max_delta_k = therm
                .temperatures
                .iter()
                .zip(&temps_iter)
                .map(|(new, old)| (new - old).abs())
                .fold(0.0_f64, f64::max);
            temps_iter.copy_from_slice(&therm.temperatures);

            // The first iterate compares against the old temperatures and
            // measures the physical change, not the coupling error; never
            // accept it.
            if iter > 1 && max_delta_k <= self.opts.coupling_tol_k {
                tracing::trace!(iter, max_delta_k, "coupling converged");
                converged = Some((elec, therm));
                break;
            }
        }
        let Some((elec, therm)) = converged else {
            return Err(SimError::Convergence {
                what: format!(
                    "temperature iterate still moving after {} coupling iterations at t = {} s",
                    self.opts.max_coupling_iters, prev.time_s
                ),
            });
        };

        let heat_w: f64 = elec.node_heat_w.iter().sum();
        Ok(StepState {
            step: prev.step + 1,
            time_s: prev.time_s + dt,
            voltages: elec.voltages,
            branch_currents: elec.branch_currents,
            soc: elec.soc,
            soc_out_of_range: elec.soc_out_of_range,
            temperatures: therm.temperatures,
            node_heat_w: elec.node_heat_w,
            terminal_voltage: elec.terminal_voltage,
            terminal_current: elec.terminal_current,
            cumulative_heat_j: prev.cumulative_heat_j + heat_w * dt,
            cumulative_loss_j: prev.cumulative_loss_j + therm.boundary_loss_w * dt,
        })
    }
}

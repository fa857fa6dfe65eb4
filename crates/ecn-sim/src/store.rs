//! Committed simulation state and decimated history.

use ecn_core::units::{self, Current, Energy, Temperature, Voltage};
use serde::{Deserialize, Serialize};

/// Full state snapshot at the end of a committed step.
///
/// Vectors are indexed the same way as the topology: `voltages` by
/// electrical node (negative terminal held at zero), `branch_currents`
/// by branch, `soc` by spatial unit, `temperatures` and `node_heat_w`
/// by thermal node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepState {
    pub step: usize,
    pub time_s: f64,
    pub voltages: Vec<f64>,
    pub branch_currents: Vec<f64>,
    pub soc: Vec<f64>,
    /// Set once any unit's SOC has been clamped to [0, 1].
    pub soc_out_of_range: bool,
    pub temperatures: Vec<f64>,
    pub node_heat_w: Vec<f64>,
    pub terminal_voltage: f64,
    pub terminal_current: f64,
    /// Joule heat generated since the start of the run.
    pub cumulative_heat_j: f64,
    /// Heat lost to ambient through exposed faces since the start.
    pub cumulative_loss_j: f64,
}

impl StepState {
    /// Terminal voltage as a typed quantity.
    pub fn tab_voltage(&self) -> Voltage {
        units::volt(self.terminal_voltage)
    }

    /// Terminal current as a typed quantity.
    pub fn tab_current(&self) -> Current {
        units::amp(self.terminal_current)
    }

    /// Total Joule heat generated so far.
    pub fn heat_generated(&self) -> Energy {
        units::joule(self.cumulative_heat_j)
    }

    /// Hottest thermal node, or `None` for an empty snapshot.
    pub fn peak_temperature(&self) -> Option<Temperature> {
        self.temperatures
            .iter()
            .copied()
            .reduce(f64::max)
            .map(units::k)
    }
}

/// Holds the latest committed state plus a decimated history.
///
/// Every `record_every`-th step is retained, along with the initial
/// state and (via `finalize`) the last one, so the endpoints of a run
/// are always recorded regardless of the decimation factor.
#[derive(Clone, Debug)]
pub struct StateStore {
    current: StepState,
    history: Vec<StepState>,
    record_every: usize,
}

impl StateStore {
    pub(crate) fn new(initial: StepState, record_every: usize) -> Self {
        Self {
            current: initial.clone(),
            history: vec![initial],
            record_every,
        }
    }

    /// Latest committed state.
    pub fn current(&self) -> &StepState {
        &self.current
    }

    /// Recorded snapshots in step order.
    pub fn history(&self) -> &[StepState] {
        &self.history
    }

    pub(crate) fn commit(&mut self, state: StepState) {
        if state.step % self.record_every == 0 {
            self.history.push(state.clone());
        }
        self.current = state;
    }

    /// Ensures the final committed state is recorded.
    pub(crate) fn finalize(&mut self) {
        let last_recorded = self.history.last().map(|s| s.step);
        if last_recorded != Some(self.current.step) {
            self.history.push(self.current.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(step: usize) -> StepState {
        StepState {
            step,
            time_s: step as f64,
            voltages: vec![1.0, 0.0],
            branch_currents: vec![1.0],
            soc: vec![0.5],
            soc_out_of_range: false,
            temperatures: vec![298.15],
            node_heat_w: vec![1.0],
            terminal_voltage: 1.0,
            terminal_current: 1.0,
            cumulative_heat_j: step as f64,
            cumulative_loss_j: 0.0,
        }
    }

    #[test]
    fn decimation_keeps_initial_and_final() {
        let mut store = StateStore::new(snapshot(0), 4);
        for step in 1..=10 {
            store.commit(snapshot(step));
        }
        store.finalize();
        let steps: Vec<usize> = store.history().iter().map(|s| s.step).collect();
        assert_eq!(steps, vec![0, 4, 8, 10]);
        assert_eq!(store.current().step, 10);
    }

    #[test]
    fn finalize_is_idempotent_when_last_step_recorded() {
        let mut store = StateStore::new(snapshot(0), 1);
        store.commit(snapshot(1));
        store.finalize();
        assert_eq!(store.history().len(), 2);
    }

    #[test]
    fn step_state_round_trips_through_json() {
        let state = snapshot(7);
        let json = serde_json::to_string(&state).unwrap();
        let back: StepState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}

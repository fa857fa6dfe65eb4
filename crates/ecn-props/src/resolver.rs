//! The property-resolver seam between lookup tables and the solvers.

use ecn_graph::{Branch, BranchKind, ThermalLink, ThermalNode};

use crate::error::{LookupError, LookupResult};
use crate::table::{Lut1d, Lut2d};

/// Supplies state-dependent physical values to the solvers.
///
/// Implementations must be `Sync`: the electrical assembly resolves branch
/// properties in parallel. All values are SI: ohms, farads, volts, J/K, W/K,
/// coulombs.
pub trait PropertyResolver: Sync {
    /// Resistance of a `Collector` or `Cell` branch at (T, SOC).
    fn branch_resistance(&self, branch: &Branch, t_k: f64, soc: f64) -> LookupResult<f64>;

    /// Capacitance of a `Capacitor` branch at (T, SOC).
    fn branch_capacitance(&self, branch: &Branch, t_k: f64, soc: f64) -> LookupResult<f64>;

    /// Open-circuit voltage of a `Cell` branch at (T, SOC). Zero for a
    /// passive network.
    fn open_circuit_voltage(&self, branch: &Branch, t_k: f64, soc: f64) -> LookupResult<f64>;

    /// Lumped heat capacity of a thermal node at temperature T.
    fn heat_capacity(&self, node: &ThermalNode, t_k: f64) -> LookupResult<f64>;

    /// Conductance of a thermal link at temperature T.
    fn link_conductance(&self, link: &ThermalLink, t_k: f64) -> LookupResult<f64>;

    /// Charge capacity of one spatial unit, in coulombs. Scales the SOC
    /// integral; constant over a run.
    fn unit_capacity(&self, unit: usize) -> f64;
}

fn ensure_positive(value: f64, what: &'static str) -> LookupResult<f64> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(LookupError::NonPhysical { what, value })
    }
}

/// Table-backed resolver: one LUT per property family.
///
/// Tables are prepared and validated externally; geometry-specific scaling
/// (per-unit resistance shares) is baked into the tables.
pub struct TableResolver {
    /// Collector branch resistance by temperature.
    pub collector_r: Lut1d,
    /// Through-cell resistance by (temperature, SOC).
    pub cell_r: Lut2d,
    /// RC-pair capacitance by (temperature, SOC).
    pub cell_c: Lut2d,
    /// Open-circuit voltage by (temperature, SOC).
    pub ocv: Lut2d,
    /// Thermal node heat capacity by temperature.
    pub heat_cap: Lut1d,
    /// Thermal link conductance by temperature.
    pub link_g: Lut1d,
    /// Charge capacity per spatial unit (coulombs).
    pub unit_capacity_c: f64,
}

impl PropertyResolver for TableResolver {
    fn branch_resistance(&self, branch: &Branch, t_k: f64, soc: f64) -> LookupResult<f64> {
        let r = match branch.kind {
            BranchKind::Collector => self.collector_r.eval(t_k, "collector resistance")?,
            BranchKind::Cell => self.cell_r.eval(t_k, soc, "cell resistance")?,
            BranchKind::Capacitor => {
                return Err(LookupError::NonPhysical {
                    what: "resistance requested for capacitor branch",
                    value: f64::NAN,
                });
            }
        };
        ensure_positive(r, "branch resistance")
    }

    fn branch_capacitance(&self, _branch: &Branch, t_k: f64, soc: f64) -> LookupResult<f64> {
        let c = self.cell_c.eval(t_k, soc, "cell capacitance")?;
        ensure_positive(c, "branch capacitance")
    }

    fn open_circuit_voltage(&self, _branch: &Branch, t_k: f64, soc: f64) -> LookupResult<f64> {
        self.ocv.eval(t_k, soc, "open-circuit voltage")
    }

    fn heat_capacity(&self, _node: &ThermalNode, t_k: f64) -> LookupResult<f64> {
        let c = self.heat_cap.eval(t_k, "heat capacity")?;
        ensure_positive(c, "heat capacity")
    }

    fn link_conductance(&self, _link: &ThermalLink, t_k: f64) -> LookupResult<f64> {
        let g = self.link_g.eval(t_k, "link conductance")?;
        ensure_positive(g, "link conductance")
    }

    fn unit_capacity(&self, _unit: usize) -> f64 {
        self.unit_capacity_c
    }
}

/// Fixed-value resolver for tests and analytical checks.
#[derive(Debug, Clone)]
pub struct ConstResolver {
    pub collector_r_ohm: f64,
    pub cell_r_ohm: f64,
    pub cell_c_farad: f64,
    pub ocv_v: f64,
    pub heat_cap_j_per_k: f64,
    pub link_g_w_per_k: f64,
    pub unit_capacity_c: f64,
}

impl Default for ConstResolver {
    fn default() -> Self {
        Self {
            collector_r_ohm: 1e-3,
            cell_r_ohm: 1.0,
            cell_c_farad: 100.0,
            ocv_v: 0.0,
            heat_cap_j_per_k: 50.0,
            link_g_w_per_k: 1.0,
            unit_capacity_c: 3600.0, // 1 Ah
        }
    }
}

impl PropertyResolver for ConstResolver {
    fn branch_resistance(&self, branch: &Branch, _t_k: f64, _soc: f64) -> LookupResult<f64> {
        let r = match branch.kind {
            BranchKind::Collector => self.collector_r_ohm,
            BranchKind::Cell => self.cell_r_ohm,
            BranchKind::Capacitor => {
                return Err(LookupError::NonPhysical {
                    what: "resistance requested for capacitor branch",
                    value: f64::NAN,
                });
            }
        };
        ensure_positive(r, "branch resistance")
    }

    fn branch_capacitance(&self, _branch: &Branch, _t_k: f64, _soc: f64) -> LookupResult<f64> {
        ensure_positive(self.cell_c_farad, "branch capacitance")
    }

    fn open_circuit_voltage(&self, _branch: &Branch, _t_k: f64, _soc: f64) -> LookupResult<f64> {
        Ok(self.ocv_v)
    }

    fn heat_capacity(&self, _node: &ThermalNode, _t_k: f64) -> LookupResult<f64> {
        ensure_positive(self.heat_cap_j_per_k, "heat capacity")
    }

    fn link_conductance(&self, _link: &ThermalLink, _t_k: f64) -> LookupResult<f64> {
        ensure_positive(self.link_g_w_per_k, "link conductance")
    }

    fn unit_capacity(&self, _unit: usize) -> f64 {
        self.unit_capacity_c
    }
}

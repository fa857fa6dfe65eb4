//! Cell geometry and grid-based topology generation.
//!
//! A cell is discretized into a grid of spatial units. Each unit contributes
//! one thermal node, one node on each collector sheet, and a through-cell
//! branch between the facing collector nodes. Neighbouring units are joined
//! by collector branches (per sheet) and by thermal links. Cylindrical cells
//! wrap the first axis (angular direction) into a ring.

use crate::builder::TopologyBuilder;
use crate::error::TopologyError;
use crate::graph::{Sheet, Topology};

/// Cell form factor. Pouch and prismatic cells use a plain grid; cylindrical
/// cells close the first axis periodically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFactor {
    Pouch,
    Prismatic,
    Cylindrical,
}

/// Geometry descriptors: form factor plus discretization counts.
///
/// Dimensions are unit counts, not lengths; physical properties (resistances,
/// conductances, capacities) come from the property resolver per unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellGeometry {
    pub form: FormFactor,
    /// Units along the first in-plane axis (angular sectors for cylindrical).
    pub n1: usize,
    /// Units along the second in-plane axis (axial for cylindrical).
    pub n2: usize,
    /// Electrode layer pairs stacked through-plane.
    pub layers: usize,
    /// Add a capacitor branch in parallel with each cell branch (RC pair).
    pub with_rc: bool,
}

impl CellGeometry {
    /// A pouch cell discretized n1 x n2 with a single layer, resistor-only.
    pub fn pouch(n1: usize, n2: usize) -> Self {
        Self {
            form: FormFactor::Pouch,
            n1,
            n2,
            layers: 1,
            with_rc: false,
        }
    }

    /// A cylindrical cell with `sectors` angular sectors and `axial` slices.
    pub fn cylindrical(sectors: usize, axial: usize) -> Self {
        Self {
            form: FormFactor::Cylindrical,
            n1: sectors,
            n2: axial,
            layers: 1,
            with_rc: false,
        }
    }

    /// Enable RC pair dynamics on every unit.
    pub fn with_rc(mut self) -> Self {
        self.with_rc = true;
        self
    }

    /// Stack `layers` electrode pairs through-plane.
    pub fn with_layers(mut self, layers: usize) -> Self {
        self.layers = layers;
        self
    }

    /// Total number of spatial units.
    pub fn unit_count(&self) -> usize {
        self.n1 * self.n2 * self.layers
    }

    fn wrap_axis1(&self) -> bool {
        self.form == FormFactor::Cylindrical
    }

    fn check(&self) -> Result<(), TopologyError> {
        if self.n1 == 0 || self.n2 == 0 || self.layers == 0 {
            return Err(TopologyError::InvalidDiscretization {
                what: "discretization counts must be at least 1",
            });
        }
        if self.wrap_axis1() && self.n1 < 3 {
            return Err(TopologyError::InvalidDiscretization {
                what: "cylindrical cells need at least 3 angular sectors",
            });
        }
        Ok(())
    }
}

impl Topology {
    /// Build the full electro-thermal topology for a cell geometry.
    ///
    /// Fails with [`TopologyError`] when the discretization is degenerate;
    /// the returned topology is validated and connected by construction.
    pub fn from_geometry(geom: &CellGeometry) -> Result<Topology, TopologyError> {
        geom.check()?;

        let (n1, n2, n3) = (geom.n1, geom.n2, geom.layers);
        let unit = |i: usize, j: usize, l: usize| (l * n2 + j) * n1 + i;

        let mut b = TopologyBuilder::new();

        // Thermal nodes: one per unit, exposure = count of outer faces.
        // The wrapped angular axis of a cylindrical cell has no outer face.
        let mut therms = Vec::with_capacity(geom.unit_count());
        for l in 0..n3 {
            for j in 0..n2 {
                for i in 0..n1 {
                    let mut faces = 0u8;
                    if !geom.wrap_axis1() {
                        faces += u8::from(i == 0) + u8::from(i == n1 - 1);
                    }
                    faces += u8::from(j == 0) + u8::from(j == n2 - 1);
                    faces += u8::from(l == 0) + u8::from(l == n3 - 1);
                    therms.push(b.add_thermal_node(format!("T[{i},{j},{l}]"), faces));
                }
            }
        }

        // Collector nodes: one per unit per sheet.
        let mut pos = Vec::with_capacity(geom.unit_count());
        let mut neg = Vec::with_capacity(geom.unit_count());
        for l in 0..n3 {
            for j in 0..n2 {
                for i in 0..n1 {
                    let t = therms[unit(i, j, l)];
                    pos.push(b.add_elec_node(format!("P[{i},{j},{l}]"), Sheet::Positive, t));
                    neg.push(b.add_elec_node(format!("N[{i},{j},{l}]"), Sheet::Negative, t));
                }
            }
        }

        // Neighbour pairs along each axis; dissipation of an in-sheet branch
        // is assigned to its lower unit's thermal node.
        let connect = |ua: usize, ub: usize, b: &mut TopologyBuilder| {
            let t = therms[ua];
            b.add_collector_branch(pos[ua], pos[ub], t);
            b.add_collector_branch(neg[ua], neg[ub], t);
            b.add_link(therms[ua], therms[ub]);
        };

        for l in 0..n3 {
            for j in 0..n2 {
                for i in 0..n1 {
                    let u = unit(i, j, l);
                    if i + 1 < n1 {
                        connect(u, unit(i + 1, j, l), &mut b);
                    } else if geom.wrap_axis1() {
                        connect(u, unit(0, j, l), &mut b);
                    }
                    if j + 1 < n2 {
                        connect(u, unit(i, j + 1, l), &mut b);
                    }
                    if l + 1 < n3 {
                        connect(u, unit(i, j, l + 1), &mut b);
                    }
                }
            }
        }

        // Through-cell branches, in unit order so SOC slot == unit index.
        for u in 0..geom.unit_count() {
            b.add_cell_branch(pos[u], neg[u], therms[u]);
            if geom.with_rc {
                b.add_capacitor_branch(pos[u], neg[u], therms[u], u);
            }
        }

        // Tabs at opposite corners of the stack.
        let last = geom.unit_count() - 1;
        b.set_terminals(pos[0], neg[last]);

        b.build()
    }
}

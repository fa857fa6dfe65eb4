//! Incremental topology builder.

use std::collections::HashMap;

use ecn_core::{BranchId, LinkId, NodeId, ThermId};

use crate::error::TopologyError;
use crate::graph::{Branch, BranchKind, ElecNode, Sheet, ThermalLink, ThermalNode, Topology};
use crate::validate;

/// Builder for constructing a topology incrementally.
///
/// Thermal nodes come first (electrical nodes and branches reference them),
/// then electrical nodes, branches, and links in any order. `build()`
/// validates the whole structure and freezes it into an immutable
/// [`Topology`].
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    elec_nodes: Vec<ElecNode>,
    branches: Vec<Branch>,
    therm_nodes: Vec<ThermalNode>,
    links: Vec<ThermalLink>,
    pos_terminal: Option<NodeId>,
    neg_terminal: Option<NodeId>,
    n_units: usize,
}

impl TopologyBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a thermal node and return its ID.
    pub fn add_thermal_node(&mut self, name: impl Into<String>, exposed_faces: u8) -> ThermId {
        let id = ThermId::from_index(self.therm_nodes.len() as u32);
        self.therm_nodes.push(ThermalNode {
            id,
            name: name.into(),
            exposed_faces,
        });
        id
    }

    /// Add an electrical node on a collector sheet, tied to a thermal node.
    pub fn add_elec_node(
        &mut self,
        name: impl Into<String>,
        sheet: Sheet,
        thermal: ThermId,
    ) -> NodeId {
        let id = NodeId::from_index(self.elec_nodes.len() as u32);
        self.elec_nodes.push(ElecNode {
            id,
            name: name.into(),
            sheet,
            thermal,
        });
        id
    }

    /// Add a collector branch between two nodes of the same sheet.
    pub fn add_collector_branch(&mut self, a: NodeId, b: NodeId, thermal: ThermId) -> BranchId {
        self.push_branch(BranchKind::Collector, a, b, thermal, None)
    }

    /// Add a through-cell branch; allocates the next spatial-unit (SOC) slot.
    pub fn add_cell_branch(&mut self, a: NodeId, b: NodeId, thermal: ThermId) -> BranchId {
        let unit = self.n_units;
        self.n_units += 1;
        self.push_branch(BranchKind::Cell, a, b, thermal, Some(unit))
    }

    /// Add a capacitor branch in parallel with the cell branch of `unit`.
    pub fn add_capacitor_branch(
        &mut self,
        a: NodeId,
        b: NodeId,
        thermal: ThermId,
        unit: usize,
    ) -> BranchId {
        self.push_branch(BranchKind::Capacitor, a, b, thermal, Some(unit))
    }

    fn push_branch(
        &mut self,
        kind: BranchKind,
        a: NodeId,
        b: NodeId,
        thermal: ThermId,
        unit: Option<usize>,
    ) -> BranchId {
        let id = BranchId::from_index(self.branches.len() as u32);
        self.branches.push(Branch {
            id,
            kind,
            a,
            b,
            thermal,
            unit,
        });
        id
    }

    /// Add a conductive link between two thermal nodes.
    pub fn add_link(&mut self, a: ThermId, b: ThermId) -> LinkId {
        let id = LinkId::from_index(self.links.len() as u32);
        self.links.push(ThermalLink { id, a, b });
        id
    }

    /// Designate the terminal nodes where boundary excitation applies.
    pub fn set_terminals(&mut self, pos: NodeId, neg: NodeId) {
        self.pos_terminal = Some(pos);
        self.neg_terminal = Some(neg);
    }

    /// Validate and freeze into an immutable [`Topology`].
    pub fn build(self) -> Result<Topology, TopologyError> {
        validate::validate_structure(&self.elec_nodes, &self.branches, &self.therm_nodes, &self.links)?;

        let pos = self.pos_terminal.ok_or(TopologyError::BadTerminals {
            what: "positive terminal not set",
        })?;
        let neg = self.neg_terminal.ok_or(TopologyError::BadTerminals {
            what: "negative terminal not set",
        })?;
        if pos == neg {
            return Err(TopologyError::BadTerminals {
                what: "positive and negative terminals coincide",
            });
        }
        if pos.idx() >= self.elec_nodes.len() || neg.idx() >= self.elec_nodes.len() {
            return Err(TopologyError::BadTerminals {
                what: "terminal references a missing node",
            });
        }

        let (node_branch_offsets, node_branches) = build_incidence(
            self.elec_nodes.len(),
            self.branches.iter().map(|b| (b.id, b.a, b.b)),
        );
        let (therm_link_offsets, therm_links) = build_incidence(
            self.therm_nodes.len(),
            self.links.iter().map(|l| (l.id, l.a, l.b)),
        );

        validate::validate_adjacency(&self.elec_nodes, &self.branches, &node_branch_offsets, &node_branches)?;

        let topo = Topology {
            elec_nodes: self.elec_nodes,
            branches: self.branches,
            therm_nodes: self.therm_nodes,
            links: self.links,
            node_branch_offsets,
            node_branches,
            therm_link_offsets,
            therm_links,
            pos_terminal: pos,
            neg_terminal: neg,
            n_units: self.n_units,
        };

        validate::validate_connectivity(&topo)?;

        Ok(topo)
    }
}

/// Build compact incidence lists: for each node index, its incident edges.
///
/// Each edge appears under both endpoints; per-node lists are sorted by edge
/// ID for determinism.
fn build_incidence<I>(node_count: usize, edges: I) -> (Vec<usize>, Vec<ecn_core::Id>)
where
    I: Iterator<Item = (ecn_core::Id, ecn_core::Id, ecn_core::Id)>,
{
    let mut per_node: HashMap<usize, Vec<ecn_core::Id>> = HashMap::new();
    for (edge, a, b) in edges {
        per_node.entry(a.idx()).or_default().push(edge);
        per_node.entry(b.idx()).or_default().push(edge);
    }

    for list in per_node.values_mut() {
        list.sort_by_key(|e| e.index());
    }

    let mut offsets = Vec::with_capacity(node_count + 1);
    let mut flat = Vec::new();
    offsets.push(0);

    for i in 0..node_count {
        if let Some(list) = per_node.get(&i) {
            flat.extend_from_slice(list);
        }
        offsets.push(flat.len());
    }

    (offsets, flat)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two facing nodes joined by a single cell branch, one thermal node.
    fn minimal() -> TopologyBuilder {
        let mut b = TopologyBuilder::new();
        let t0 = b.add_thermal_node("unit0", 6);
        let p = b.add_elec_node("pos0", Sheet::Positive, t0);
        let n = b.add_elec_node("neg0", Sheet::Negative, t0);
        b.add_cell_branch(p, n, t0);
        b.set_terminals(p, n);
        b
    }

    #[test]
    fn builder_minimal_build() {
        let topo = minimal().build().unwrap();
        assert_eq!(topo.elec_nodes().len(), 2);
        assert_eq!(topo.branches().len(), 1);
        assert_eq!(topo.therm_nodes().len(), 1);
        assert_eq!(topo.n_units(), 1);

        let p = topo.pos_terminal();
        assert_eq!(topo.node_branches(p).len(), 1);
        let other = topo
            .branch_other_end(topo.node_branches(p)[0], p)
            .unwrap();
        assert_eq!(other, topo.neg_terminal());
    }

    #[test]
    fn builder_missing_terminals() {
        let mut b = TopologyBuilder::new();
        let t0 = b.add_thermal_node("unit0", 6);
        let p = b.add_elec_node("pos0", Sheet::Positive, t0);
        let n = b.add_elec_node("neg0", Sheet::Negative, t0);
        b.add_cell_branch(p, n, t0);
        assert!(matches!(
            b.build(),
            Err(TopologyError::BadTerminals { .. })
        ));
    }

    #[test]
    fn builder_isolated_node_rejected() {
        let mut b = minimal();
        let t = b.add_thermal_node("extra", 0);
        b.add_elec_node("stray", Sheet::Positive, t);
        // Thermal side now disconnected too, but the isolated electrical
        // node is detected first.
        let err = b.build().unwrap_err();
        assert!(matches!(err, TopologyError::IsolatedNode { .. }));
    }

    #[test]
    fn builder_self_loop_rejected() {
        let mut b = minimal();
        let t0 = b.therm_nodes[0].id;
        let p = b.elec_nodes[0].id;
        b.add_collector_branch(p, p, t0);
        assert!(matches!(b.build(), Err(TopologyError::SelfLoop { .. })));
    }

    #[test]
    fn builder_unit_slots_increment() {
        let mut b = TopologyBuilder::new();
        let t0 = b.add_thermal_node("u0", 6);
        let t1 = b.add_thermal_node("u1", 6);
        b.add_link(t0, t1);
        let p0 = b.add_elec_node("p0", Sheet::Positive, t0);
        let n0 = b.add_elec_node("n0", Sheet::Negative, t0);
        let p1 = b.add_elec_node("p1", Sheet::Positive, t1);
        let n1 = b.add_elec_node("n1", Sheet::Negative, t1);
        b.add_collector_branch(p0, p1, t0);
        b.add_collector_branch(n0, n1, t1);
        let c0 = b.add_cell_branch(p0, n0, t0);
        let c1 = b.add_cell_branch(p1, n1, t1);
        b.set_terminals(p0, n1);
        let topo = b.build().unwrap();
        assert_eq!(topo.n_units(), 2);
        assert_eq!(topo.branch(c0).unwrap().unit, Some(0));
        assert_eq!(topo.branch(c1).unwrap().unit, Some(1));
    }
}

//! Core topology data structures.

use ecn_core::{BranchId, LinkId, NodeId, ThermId};

/// Which collector sheet an electrical node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sheet {
    /// Positive current collector.
    Positive,
    /// Negative current collector.
    Negative,
}

/// Circuit element type of an electrical branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchKind {
    /// In-sheet collector resistance between neighbouring nodes.
    Collector,
    /// Through-cell resistance between facing positive/negative nodes.
    /// Carries the unit's SOC contribution and (optionally) an EMF.
    Cell,
    /// Capacitor in parallel with a cell branch (RC pair dynamics).
    Capacitor,
}

/// A node in the electrical graph.
///
/// Nodes hold no solver state; voltages live in the evolving step state,
/// indexed by `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElecNode {
    pub id: NodeId,
    pub name: String,
    pub sheet: Sheet,
    /// Thermal node whose temperature governs this node's local properties.
    pub thermal: ThermId,
}

/// An electrical branch connecting two nodes.
///
/// Resistance/capacitance values are supplied per step by the property
/// resolver; the topology only records the element type and where the
/// branch's dissipation goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub id: BranchId,
    pub kind: BranchKind,
    pub a: NodeId,
    pub b: NodeId,
    /// Thermal node receiving this branch's I²R heat.
    pub thermal: ThermId,
    /// For `Cell` and `Capacitor` branches: index of the spatial unit
    /// (SOC slot). `None` for collector branches.
    pub unit: Option<usize>,
}

/// A node in the thermal graph (one lumped mass per spatial unit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThermalNode {
    pub id: ThermId,
    pub name: String,
    /// Number of outer faces exposed to ambient (0 = interior node).
    /// Convective boundary conductance scales with this count.
    pub exposed_faces: u8,
}

/// A conductive link between two thermal nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThermalLink {
    pub id: LinkId,
    pub a: ThermId,
    pub b: ThermId,
}

/// The topology: validated, immutable electrical + thermal graphs.
///
/// Stores nodes/branches/links in vectors indexed by their IDs, plus compact
/// offset-array adjacency for each graph (sorted for determinism). Built once
/// by [`crate::TopologyBuilder`] or [`Topology::from_geometry`]; solvers only
/// ever borrow it.
#[derive(Debug, Clone)]
pub struct Topology {
    pub(crate) elec_nodes: Vec<ElecNode>,
    pub(crate) branches: Vec<Branch>,
    pub(crate) therm_nodes: Vec<ThermalNode>,
    pub(crate) links: Vec<ThermalLink>,

    /// Node i's incident branches are
    /// `node_branches[node_branch_offsets[i]..node_branch_offsets[i+1]]`.
    pub(crate) node_branch_offsets: Vec<usize>,
    pub(crate) node_branches: Vec<BranchId>,

    /// Thermal node i's incident links are
    /// `therm_links[therm_link_offsets[i]..therm_link_offsets[i+1]]`.
    pub(crate) therm_link_offsets: Vec<usize>,
    pub(crate) therm_links: Vec<LinkId>,

    /// Terminal node on the positive collector (boundary excitation enters here).
    pub(crate) pos_terminal: NodeId,
    /// Terminal node on the negative collector (reference/ground).
    pub(crate) neg_terminal: NodeId,

    /// Number of spatial units (= cell branches = SOC slots).
    pub(crate) n_units: usize,
}

impl Topology {
    pub fn elec_nodes(&self) -> &[ElecNode] {
        &self.elec_nodes
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn therm_nodes(&self) -> &[ThermalNode] {
        &self.therm_nodes
    }

    pub fn links(&self) -> &[ThermalLink] {
        &self.links
    }

    pub fn elec_node(&self, id: NodeId) -> Option<&ElecNode> {
        self.elec_nodes.get(id.idx())
    }

    pub fn branch(&self, id: BranchId) -> Option<&Branch> {
        self.branches.get(id.idx())
    }

    pub fn therm_node(&self, id: ThermId) -> Option<&ThermalNode> {
        self.therm_nodes.get(id.idx())
    }

    pub fn link(&self, id: LinkId) -> Option<&ThermalLink> {
        self.links.get(id.idx())
    }

    /// All branch IDs incident to an electrical node.
    pub fn node_branches(&self, node: NodeId) -> &[BranchId] {
        let idx = node.idx();
        if idx >= self.elec_nodes.len() {
            return &[];
        }
        let start = self.node_branch_offsets[idx];
        let end = self.node_branch_offsets[idx + 1];
        &self.node_branches[start..end]
    }

    /// All link IDs incident to a thermal node.
    pub fn therm_node_links(&self, therm: ThermId) -> &[LinkId] {
        let idx = therm.idx();
        if idx >= self.therm_nodes.len() {
            return &[];
        }
        let start = self.therm_link_offsets[idx];
        let end = self.therm_link_offsets[idx + 1];
        &self.therm_links[start..end]
    }

    /// The far end of a branch as seen from `node`.
    pub fn branch_other_end(&self, branch: BranchId, node: NodeId) -> Option<NodeId> {
        let b = self.branch(branch)?;
        if b.a == node {
            Some(b.b)
        } else if b.b == node {
            Some(b.a)
        } else {
            None
        }
    }

    pub fn pos_terminal(&self) -> NodeId {
        self.pos_terminal
    }

    pub fn neg_terminal(&self) -> NodeId {
        self.neg_terminal
    }

    /// Number of spatial units (SOC slots / cell branches).
    pub fn n_units(&self) -> usize {
        self.n_units
    }

    /// Iterate over cell branches in unit order (deterministic).
    pub fn cell_branches(&self) -> impl Iterator<Item = &Branch> {
        self.branches
            .iter()
            .filter(|b| b.kind == BranchKind::Cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CellGeometry;
    use ecn_core::Id;

    #[test]
    fn sheet_and_kind_equality() {
        assert_eq!(Sheet::Positive, Sheet::Positive);
        assert_ne!(BranchKind::Cell, BranchKind::Collector);
    }

    #[test]
    fn branch_other_end_requires_membership() {
        let topo = Topology::from_geometry(&CellGeometry::pouch(2, 1)).unwrap();
        let cell = topo.cell_branches().next().unwrap();
        assert_eq!(topo.branch_other_end(cell.id, cell.a), Some(cell.b));
        assert_eq!(topo.branch_other_end(cell.id, cell.b), Some(cell.a));

        // A node the branch does not touch gets None.
        let outsider = topo
            .elec_nodes()
            .iter()
            .map(|n| n.id)
            .find(|&n| n != cell.a && n != cell.b)
            .unwrap();
        assert_eq!(topo.branch_other_end(cell.id, outsider), None);

        // As does a branch id past the end of the table.
        let unknown = Id::from_index(topo.branches().len() as u32);
        assert_eq!(topo.branch_other_end(unknown, cell.a), None);
    }
}

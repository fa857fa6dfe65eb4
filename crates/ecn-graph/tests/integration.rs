//! Integration tests: geometry-driven builds and hand-built failure cases.

use ecn_graph::{BranchKind, CellGeometry, Sheet, Topology, TopologyBuilder, TopologyError};

#[test]
fn pouch_grid_is_connected_and_mapped() {
    let topo = Topology::from_geometry(&CellGeometry::pouch(4, 3)).unwrap();

    // Every branch routes its heat to a real thermal node.
    for branch in topo.branches() {
        assert!(topo.therm_node(branch.thermal).is_some());
    }

    // Every electrical node reaches the terminals through the adjacency
    // arrays (connectivity was validated at build; spot-check the API).
    for node in topo.elec_nodes() {
        assert!(!topo.node_branches(node.id).is_empty());
    }

    // Cell branches cover every unit exactly once, in order.
    let units: Vec<_> = topo.cell_branches().map(|b| b.unit.unwrap()).collect();
    assert_eq!(units, (0..topo.n_units()).collect::<Vec<_>>());
}

#[test]
fn disconnected_island_rejected_at_build() {
    // Two units wired internally but never joined to each other.
    let mut b = TopologyBuilder::new();
    let t0 = b.add_thermal_node("t0", 6);
    let t1 = b.add_thermal_node("t1", 6);
    b.add_link(t0, t1); // thermal side is fine; electrical side is not

    let p0 = b.add_elec_node("p0", Sheet::Positive, t0);
    let n0 = b.add_elec_node("n0", Sheet::Negative, t0);
    let p1 = b.add_elec_node("p1", Sheet::Positive, t1);
    let n1 = b.add_elec_node("n1", Sheet::Negative, t1);
    b.add_cell_branch(p0, n0, t0);
    b.add_cell_branch(p1, n1, t1);
    b.set_terminals(p0, n0);

    let err = b.build().unwrap_err();
    assert!(matches!(err, TopologyError::Disconnected { unreached: 2, total: 4 }));
}

#[test]
fn thermal_island_rejected_at_build() {
    let mut b = TopologyBuilder::new();
    let t0 = b.add_thermal_node("t0", 6);
    let t1 = b.add_thermal_node("t1", 6); // never linked

    let p0 = b.add_elec_node("p0", Sheet::Positive, t0);
    let n0 = b.add_elec_node("n0", Sheet::Negative, t0);
    let p1 = b.add_elec_node("p1", Sheet::Positive, t1);
    let n1 = b.add_elec_node("n1", Sheet::Negative, t1);
    b.add_cell_branch(p0, n0, t0);
    b.add_cell_branch(p1, n1, t1);
    b.add_collector_branch(p0, p1, t0);
    b.add_collector_branch(n0, n1, t1);
    b.set_terminals(p0, n1);

    let err = b.build().unwrap_err();
    assert!(matches!(err, TopologyError::ThermalDisconnected { .. }));
}

#[test]
fn rc_geometry_pairs_every_unit() {
    let topo = Topology::from_geometry(&CellGeometry::cylindrical(6, 4).with_rc()).unwrap();
    let cells = topo.cell_branches().count();
    let caps = topo
        .branches()
        .iter()
        .filter(|b| b.kind == BranchKind::Capacitor)
        .count();
    assert_eq!(cells, topo.n_units());
    assert_eq!(caps, topo.n_units());
}

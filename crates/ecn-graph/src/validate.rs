//! Topology validation logic.

use std::collections::{HashSet, VecDeque};

use ecn_core::{BranchId, NodeId};

use crate::error::TopologyError;
use crate::graph::{Branch, ElecNode, ThermalLink, ThermalNode, Topology};

/// Validate structural integrity: IDs contiguous, all references exist,
/// no self-loops on branches or links.
pub(crate) fn validate_structure(
    elec_nodes: &[ElecNode],
    branches: &[Branch],
    therm_nodes: &[ThermalNode],
    links: &[ThermalLink],
) -> Result<(), TopologyError> {
    let n_elec = elec_nodes.len();
    let n_therm = therm_nodes.len();

    for node in elec_nodes {
        if node.thermal.idx() >= n_therm {
            return Err(TopologyError::InvalidNodeThermRef {
                node: node.id,
                therm: node.thermal,
            });
        }
    }

    for branch in branches {
        if branch.a.idx() >= n_elec {
            return Err(TopologyError::InvalidNodeRef {
                branch: branch.id,
                node: branch.a,
            });
        }
        if branch.b.idx() >= n_elec {
            return Err(TopologyError::InvalidNodeRef {
                branch: branch.id,
                node: branch.b,
            });
        }
        if branch.a == branch.b {
            return Err(TopologyError::SelfLoop {
                branch: branch.id,
                node: branch.a,
            });
        }
        if branch.thermal.idx() >= n_therm {
            return Err(TopologyError::InvalidThermRef {
                branch: branch.id,
                therm: branch.thermal,
            });
        }
    }

    for link in links {
        if link.a.idx() >= n_therm {
            return Err(TopologyError::InvalidLinkRef {
                link: link.id,
                therm: link.a,
            });
        }
        if link.b.idx() >= n_therm {
            return Err(TopologyError::InvalidLinkRef {
                link: link.id,
                therm: link.b,
            });
        }
        if link.a == link.b {
            return Err(TopologyError::LinkSelfLoop {
                link: link.id,
                therm: link.a,
            });
        }
    }

    Ok(())
}

/// Validate the electrical incidence arrays against the branch list.
pub(crate) fn validate_adjacency(
    elec_nodes: &[ElecNode],
    branches: &[Branch],
    offsets: &[usize],
    incident: &[BranchId],
) -> Result<(), TopologyError> {
    if offsets.len() != elec_nodes.len() + 1 {
        let node = elec_nodes.first().map_or(NodeId::from_index(0), |n| n.id);
        return Err(TopologyError::InconsistentAdjacency { node });
    }

    for node in elec_nodes {
        let idx = node.id.idx();
        let start = offsets[idx];
        let end = offsets[idx + 1];

        for &branch_id in &incident[start..end] {
            let Some(branch) = branches.get(branch_id.idx()) else {
                return Err(TopologyError::InconsistentAdjacency { node: node.id });
            };
            if branch.a != node.id && branch.b != node.id {
                return Err(TopologyError::InconsistentAdjacency { node: node.id });
            }
        }
    }

    // Every branch must appear under exactly its two endpoints.
    let mut seen: HashSet<(NodeId, BranchId)> = HashSet::new();
    for node in elec_nodes {
        let idx = node.id.idx();
        for &branch_id in &incident[offsets[idx]..offsets[idx + 1]] {
            if !seen.insert((node.id, branch_id)) {
                return Err(TopologyError::InconsistentAdjacency { node: node.id });
            }
        }
    }
    for branch in branches {
        if !seen.contains(&(branch.a, branch.id)) || !seen.contains(&(branch.b, branch.id)) {
            return Err(TopologyError::InconsistentAdjacency { node: branch.a });
        }
    }

    Ok(())
}

/// Validate connectivity: no isolated electrical nodes, a single electrical
/// component reachable from the positive terminal, and a single thermal
/// component. Disconnected topologies must never reach a solver.
pub(crate) fn validate_connectivity(topo: &Topology) -> Result<(), TopologyError> {
    // Isolated nodes first: a node with no incident branches can never
    // satisfy a nodal balance.
    for node in topo.elec_nodes() {
        if topo.node_branches(node.id).is_empty() {
            return Err(TopologyError::IsolatedNode { node: node.id });
        }
    }

    // Electrical BFS from the positive terminal.
    let n_elec = topo.elec_nodes().len();
    let mut visited = vec![false; n_elec];
    let mut queue = VecDeque::new();
    visited[topo.pos_terminal().idx()] = true;
    queue.push_back(topo.pos_terminal());
    let mut reached = 1usize;
    while let Some(node) = queue.pop_front() {
        for &branch_id in topo.node_branches(node) {
            // Membership validated above; other end always exists here.
            if let Some(other) = topo.branch_other_end(branch_id, node)
                && !visited[other.idx()]
            {
                visited[other.idx()] = true;
                reached += 1;
                queue.push_back(other);
            }
        }
    }
    if reached != n_elec {
        return Err(TopologyError::Disconnected {
            unreached: n_elec - reached,
            total: n_elec,
        });
    }

    // Thermal BFS from node 0.
    let n_therm = topo.therm_nodes().len();
    if n_therm > 1 {
        let mut visited = vec![false; n_therm];
        let mut queue = VecDeque::new();
        let start = topo.therm_nodes()[0].id;
        visited[start.idx()] = true;
        queue.push_back(start);
        let mut reached = 1usize;
        while let Some(node) = queue.pop_front() {
            for &link_id in topo.therm_node_links(node) {
                let link = &topo.links()[link_id.idx()];
                let other = if link.a == node { link.b } else { link.a };
                if !visited[other.idx()] {
                    visited[other.idx()] = true;
                    reached += 1;
                    queue.push_back(other);
                }
            }
        }
        if reached != n_therm {
            return Err(TopologyError::ThermalDisconnected {
                unreached: n_therm - reached,
                total: n_therm,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{BranchKind, Sheet};
    use ecn_core::Id;

    fn node(i: u32) -> ElecNode {
        ElecNode {
            id: Id::from_index(i),
            name: format!("n{i}"),
            sheet: Sheet::Positive,
            thermal: Id::from_index(0),
        }
    }

    fn therm(i: u32) -> ThermalNode {
        ThermalNode {
            id: Id::from_index(i),
            name: format!("t{i}"),
            exposed_faces: 0,
        }
    }

    #[test]
    fn validate_empty() {
        assert!(validate_structure(&[], &[], &[], &[]).is_ok());
    }

    #[test]
    fn validate_invalid_node_ref() {
        let nodes = vec![node(0)];
        let therms = vec![therm(0)];
        let branches = vec![Branch {
            id: Id::from_index(0),
            kind: BranchKind::Collector,
            a: Id::from_index(0),
            b: Id::from_index(99), // missing
            thermal: Id::from_index(0),
            unit: None,
        }];
        let err = validate_structure(&nodes, &branches, &therms, &[]).unwrap_err();
        assert!(matches!(err, TopologyError::InvalidNodeRef { .. }));
    }

    #[test]
    fn validate_link_self_loop() {
        let therms = vec![therm(0)];
        let links = vec![ThermalLink {
            id: Id::from_index(0),
            a: Id::from_index(0),
            b: Id::from_index(0),
        }];
        let err = validate_structure(&[], &[], &therms, &links).unwrap_err();
        assert!(matches!(err, TopologyError::LinkSelfLoop { .. }));
    }

    #[test]
    fn validate_dangling_thermal_ref() {
        let nodes = vec![node(0)]; // thermal -> t0, but no thermal nodes exist
        let err = validate_structure(&nodes, &[], &[], &[]).unwrap_err();
        assert!(matches!(err, TopologyError::InvalidNodeThermRef { .. }));
    }
}

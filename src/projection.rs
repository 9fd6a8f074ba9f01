// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Bipartite-to-unipartite projection via shortest-path filtering
//!
//! Two agencies are linked in the projection iff their shortest-path distance
//! in the full bipartite graph is exactly 2, i.e. at least one vendor is
//! adjacent to both. Distance computation is delegated to a pluggable
//! [`ShortestPathOracle`].

use crate::graph::{ContractGraph, GraphError};
use crate::types::{NodeClass, ProjectedEdge, ProjectedGraph};
use anyhow::{Context, Result};
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::Path;

/// All shortest-path distances from one source node in an unweighted graph.
///
/// Any all-pairs or multi-source algorithm can sit behind this seam; the
/// projector only reads distances, never paths.
pub trait ShortestPathOracle {
    /// Distances from `source` to every reachable node, in hops.
    /// Unreachable nodes are absent from the map.
    fn distances(
        &self,
        graph: &UnGraph<String, f64>,
        source: NodeIndex,
    ) -> HashMap<NodeIndex, usize>;
}

/// Default oracle: library-provided Dijkstra with unit edge cost
pub struct UnitCostOracle;

impl ShortestPathOracle for UnitCostOracle {
    fn distances(
        &self,
        graph: &UnGraph<String, f64>,
        source: NodeIndex,
    ) -> HashMap<NodeIndex, usize> {
        petgraph::algo::dijkstra(graph, source, None, |_| 1_usize)
    }
}

/// Project the bipartite graph onto the `target` class.
///
/// Pure function of its inputs: the graph is only read, and the returned
/// [`ProjectedGraph`] is a new immutable value. Unreachable pairs are simply
/// absent from the result.
///
/// # Errors
///
/// [`GraphError::EmptyClass`] when the graph holds no node of `target` class;
/// [`GraphError::InvalidGraph`] when two target-class nodes turn out to be at
/// distance 1, which means the bipartite invariant was broken upstream.
pub fn project<O>(
    graph: &ContractGraph,
    target: NodeClass,
    oracle: &O,
) -> Result<ProjectedGraph, GraphError>
where
    O: ShortestPathOracle + ?Sized,
{
    let members = graph.nodes_of_class(target);
    if members.is_empty() {
        return Err(GraphError::EmptyClass(target));
    }

    let member_set: HashSet<NodeIndex> = members.iter().map(|(_, idx)| *idx).collect();

    let mut pairs: BTreeSet<(String, String)> = BTreeSet::new();
    for (label, idx) in &members {
        let dist = oracle.distances(graph.topology(), *idx);
        for (other_idx, d) in dist {
            if other_idx == *idx || !member_set.contains(&other_idx) {
                continue;
            }
            let other = graph.label(other_idx);
            match d {
                1 => {
                    return Err(GraphError::InvalidGraph(format!(
                        "{label} and {other} are adjacent {target} nodes"
                    )));
                }
                2 => {
                    let (a, b) = if *label <= other {
                        ((*label).to_string(), other.to_string())
                    } else {
                        (other.to_string(), (*label).to_string())
                    };
                    pairs.insert((a, b));
                }
                _ => {}
            }
        }
    }

    let neighbor_sets: HashMap<&str, HashSet<NodeIndex>> = members
        .iter()
        .map(|(label, idx)| (*label, graph.topology().neighbors(*idx).collect()))
        .collect();

    let edges = pairs
        .into_iter()
        .map(|(a, b)| {
            let shared = neighbor_sets[a.as_str()]
                .intersection(&neighbor_sets[b.as_str()])
                .count() as u64;
            ProjectedEdge {
                a,
                b,
                shared_vendors: shared,
            }
        })
        .collect();

    let nodes = members.iter().map(|(label, _)| (*label).to_string()).collect();

    Ok(ProjectedGraph { nodes, edges })
}

/// Load a projection from a directory containing projection.json.
///
/// A missing file yields an empty projection.
pub fn load(dir: &Path) -> Result<ProjectedGraph> {
    let path = dir.join("projection.json");
    if !path.exists() {
        return Ok(ProjectedGraph::default());
    }
    let content =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Save a projection to a directory
pub fn save(projection: &ProjectedGraph, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    let path = dir.join("projection.json");
    let json =
        serde_json::to_string_pretty(projection).context("Failed to serialize projection")?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Export a projection to DOT format for Graphviz
#[must_use]
pub fn to_dot(projection: &ProjectedGraph) -> String {
    let mut dot = String::from("graph agencies {\n");
    dot.push_str("  node [shape=box, style=rounded];\n\n");

    for node in &projection.nodes {
        dot.push_str(&format!("  \"{node}\";\n"));
    }

    dot.push('\n');
    for edge in &projection.edges {
        dot.push_str(&format!(
            "  \"{}\" -- \"{}\" [label=\"{}\"];\n",
            edge.a, edge.b, edge.shared_vendors
        ));
    }

    dot.push_str("}\n");
    dot
}

/// Export a projection as a plain edge list, one canonical pair per line
#[must_use]
pub fn to_edge_list(projection: &ProjectedGraph) -> String {
    let mut out = String::new();
    for edge in &projection.edges {
        out.push_str(&format!("{}\t{}\t{}\n", edge.a, edge.b, edge.shared_vendors));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AgencyNode, ContractEdge, GraphStore, VendorNode};

    fn store(agencies: &[&str], vendors: &[&str], edges: &[(&str, &str)]) -> GraphStore {
        GraphStore {
            agencies: agencies
                .iter()
                .map(|name| AgencyNode {
                    name: (*name).into(),
                    contract_count: 1,
                    vendor_count: 1,
                    total_amount: 100.0,
                })
                .collect(),
            vendors: vendors
                .iter()
                .map(|name| VendorNode {
                    name: (*name).into(),
                    vendor_id: None,
                    contract_count: 1,
                    agency_count: 1,
                    total_amount: 100.0,
                })
                .collect(),
            edges: edges
                .iter()
                .map(|(agency, vendor)| ContractEdge {
                    agency: (*agency).into(),
                    vendor: (*vendor).into(),
                    contract_count: 1,
                    total_amount: 100.0,
                })
                .collect(),
        }
    }

    fn pairs(projection: &ProjectedGraph) -> Vec<(&str, &str)> {
        projection
            .edges
            .iter()
            .map(|e| (e.a.as_str(), e.b.as_str()))
            .collect()
    }

    #[test]
    fn test_single_shared_vendor() {
        // V1 serves A and B; C is isolated.
        let graph = ContractGraph::from_store(store(
            &["A", "B", "C"],
            &["V1"],
            &[("A", "V1"), ("B", "V1")],
        ))
        .unwrap();

        let projection = project(&graph, NodeClass::Agency, &UnitCostOracle).unwrap();

        assert_eq!(pairs(&projection), vec![("A", "B")]);
        assert_eq!(projection.isolated_nodes(), vec!["C"]);
    }

    #[test]
    fn test_chain_is_not_transitive() {
        // V1 serves A,B and V2 serves B,C: A and C sit at distance 4.
        let graph = ContractGraph::from_store(store(
            &["A", "B", "C"],
            &["V1", "V2"],
            &[("A", "V1"), ("B", "V1"), ("B", "V2"), ("C", "V2")],
        ))
        .unwrap();

        let projection = project(&graph, NodeClass::Agency, &UnitCostOracle).unwrap();

        assert_eq!(pairs(&projection), vec![("A", "B"), ("B", "C")]);
    }

    #[test]
    fn test_shared_vendor_triangle() {
        let graph = ContractGraph::from_store(store(
            &["A", "B", "C"],
            &["V1"],
            &[("A", "V1"), ("B", "V1"), ("C", "V1")],
        ))
        .unwrap();

        let projection = project(&graph, NodeClass::Agency, &UnitCostOracle).unwrap();

        assert_eq!(pairs(&projection), vec![("A", "B"), ("A", "C"), ("B", "C")]);
        assert!(projection.isolated_nodes().is_empty());
    }

    #[test]
    fn test_shared_vendor_count() {
        let graph = ContractGraph::from_store(store(
            &["A", "B"],
            &["V1", "V2", "V3"],
            &[
                ("A", "V1"),
                ("B", "V1"),
                ("A", "V2"),
                ("B", "V2"),
                ("A", "V3"),
            ],
        ))
        .unwrap();

        let projection = project(&graph, NodeClass::Agency, &UnitCostOracle).unwrap();

        assert_eq!(projection.edges.len(), 1);
        assert_eq!(projection.edges[0].shared_vendors, 2);
    }

    #[test]
    fn test_vendor_projection() {
        // The projector works symmetrically on the vendor class.
        let graph = ContractGraph::from_store(store(
            &["A"],
            &["V1", "V2"],
            &[("A", "V1"), ("A", "V2")],
        ))
        .unwrap();

        let projection = project(&graph, NodeClass::Vendor, &UnitCostOracle).unwrap();

        assert_eq!(pairs(&projection), vec![("V1", "V2")]);
    }

    #[test]
    fn test_empty_class() {
        let graph = ContractGraph::from_store(store(&["A"], &[], &[])).unwrap();

        let err = project(&graph, NodeClass::Vendor, &UnitCostOracle).unwrap_err();
        assert!(matches!(err, GraphError::EmptyClass(NodeClass::Vendor)));
    }

    #[test]
    fn test_distance_one_detected() {
        // An oracle reporting distance 1 between agencies marks a broken
        // invariant even though construction validated the store.
        struct BrokenOracle;
        impl ShortestPathOracle for BrokenOracle {
            fn distances(
                &self,
                graph: &UnGraph<String, f64>,
                source: NodeIndex,
            ) -> HashMap<NodeIndex, usize> {
                graph
                    .node_indices()
                    .filter(|idx| *idx != source)
                    .map(|idx| (idx, 1))
                    .collect()
            }
        }

        let graph = ContractGraph::from_store(store(
            &["A", "B"],
            &["V1"],
            &[("A", "V1"), ("B", "V1")],
        ))
        .unwrap();

        let err = project(&graph, NodeClass::Agency, &BrokenOracle).unwrap_err();
        assert!(matches!(err, GraphError::InvalidGraph(_)));
    }

    #[test]
    fn test_projection_is_deterministic() {
        let graph = ContractGraph::from_store(store(
            &["A", "B", "C", "D"],
            &["V1", "V2"],
            &[("A", "V1"), ("B", "V1"), ("C", "V2"), ("D", "V2"), ("B", "V2")],
        ))
        .unwrap();

        let first = project(&graph, NodeClass::Agency, &UnitCostOracle).unwrap();
        let second = project(&graph, NodeClass::Agency, &UnitCostOracle).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_to_dot_and_edge_list() {
        let graph = ContractGraph::from_store(store(
            &["A", "B"],
            &["V1"],
            &[("A", "V1"), ("B", "V1")],
        ))
        .unwrap();

        let projection = project(&graph, NodeClass::Agency, &UnitCostOracle).unwrap();

        let dot = to_dot(&projection);
        assert!(dot.contains("graph agencies"));
        assert!(dot.contains("\"A\" -- \"B\""));

        let edges = to_edge_list(&projection);
        assert_eq!(edges, "A\tB\t1\n");
    }
}

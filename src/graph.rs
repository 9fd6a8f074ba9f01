// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Graph data structures for the bipartite Agency-Vendor graph

use crate::types::{ContractEdge, GraphStore, NodeClass};
use anyhow::{Context, Result};
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised when the bipartite invariant does not hold
#[derive(Debug, Error)]
pub enum GraphError {
    /// An edge or label violates the bipartite structure
    #[error("invalid bipartite graph: {0}")]
    InvalidGraph(String),
    /// An edge references a node absent from the store
    #[error("unknown node in edge list: {0}")]
    UnknownNode(String),
    /// The requested partition class has no nodes
    #[error("no {0} nodes in graph")]
    EmptyClass(NodeClass),
}

/// The bipartite contract graph with petgraph backing for algorithms.
///
/// The persisted store keeps every edge oriented Agency -> Vendor; the
/// in-memory topology is undirected because shortest-path distances between
/// agencies must traverse vendor nodes in both directions.
#[derive(Debug)]
pub struct ContractGraph {
    /// The underlying undirected graph; node weights are labels, edge
    /// weights are aggregate contract amounts
    graph: UnGraph<String, f64>,
    /// Map from node label to node index
    node_indices: HashMap<String, NodeIndex>,
    /// Map from node label to partition class
    classes: HashMap<String, NodeClass>,
    /// The persisted snapshot (agencies, vendors, edges)
    pub store: GraphStore,
}

impl ContractGraph {
    /// Build a validated graph from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidGraph`] when a label appears in both
    /// classes, an edge links two nodes of the same class, or an edge is a
    /// self-loop; [`GraphError::UnknownNode`] when an edge references a node
    /// missing from the store.
    pub fn from_store(store: GraphStore) -> Result<Self, GraphError> {
        let mut graph = UnGraph::new_undirected();
        let mut node_indices = HashMap::new();
        let mut classes = HashMap::new();

        for agency in &store.agencies {
            if classes.insert(agency.name.clone(), NodeClass::Agency).is_some() {
                return Err(GraphError::InvalidGraph(format!(
                    "duplicate agency label: {}",
                    agency.name
                )));
            }
            let idx = graph.add_node(agency.name.clone());
            node_indices.insert(agency.name.clone(), idx);
        }

        for vendor in &store.vendors {
            match classes.insert(vendor.name.clone(), NodeClass::Vendor) {
                None => {
                    let idx = graph.add_node(vendor.name.clone());
                    node_indices.insert(vendor.name.clone(), idx);
                }
                Some(NodeClass::Agency) => {
                    return Err(GraphError::InvalidGraph(format!(
                        "label appears in both classes: {}",
                        vendor.name
                    )));
                }
                Some(NodeClass::Vendor) => {
                    return Err(GraphError::InvalidGraph(format!(
                        "duplicate vendor label: {}",
                        vendor.name
                    )));
                }
            }
        }

        let mut seen_pairs = HashSet::new();
        for edge in &store.edges {
            Self::check_edge(&classes, edge)?;

            if !seen_pairs.insert((edge.agency.clone(), edge.vendor.clone())) {
                tracing::warn!(
                    agency = %edge.agency,
                    vendor = %edge.vendor,
                    "skipping duplicate edge"
                );
                continue;
            }

            let from = node_indices[&edge.agency];
            let to = node_indices[&edge.vendor];
            graph.add_edge(from, to, edge.total_amount);
        }

        Ok(Self {
            graph,
            node_indices,
            classes,
            store,
        })
    }

    fn check_edge(
        classes: &HashMap<String, NodeClass>,
        edge: &ContractEdge,
    ) -> Result<(), GraphError> {
        if edge.agency == edge.vendor {
            return Err(GraphError::InvalidGraph(format!(
                "self-loop on {}",
                edge.agency
            )));
        }

        let from_class = classes
            .get(&edge.agency)
            .ok_or_else(|| GraphError::UnknownNode(edge.agency.clone()))?;
        let to_class = classes
            .get(&edge.vendor)
            .ok_or_else(|| GraphError::UnknownNode(edge.vendor.clone()))?;

        if from_class == to_class {
            return Err(GraphError::InvalidGraph(format!(
                "edge {} -> {} connects two {} nodes",
                edge.agency, edge.vendor, from_class
            )));
        }
        if *from_class != NodeClass::Agency {
            return Err(GraphError::InvalidGraph(format!(
                "edge {} -> {} is not oriented agency -> vendor",
                edge.agency, edge.vendor
            )));
        }

        Ok(())
    }

    /// Load the graph from a directory containing graph.json.
    ///
    /// A missing file yields an empty graph, matching first-run behaviour.
    pub fn load(dir: &Path) -> Result<Self> {
        let graph_path = dir.join("graph.json");

        let store: GraphStore = if graph_path.exists() {
            let content = fs::read_to_string(&graph_path)
                .with_context(|| format!("Failed to read {}", graph_path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", graph_path.display()))?
        } else {
            GraphStore::default()
        };

        Self::from_store(store).context("Invalid graph snapshot")
    }

    /// Save the graph snapshot to a directory
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        let graph_path = dir.join("graph.json");
        let graph_json =
            serde_json::to_string_pretty(&self.store).context("Failed to serialize graph")?;
        fs::write(&graph_path, graph_json)
            .with_context(|| format!("Failed to write {}", graph_path.display()))?;

        Ok(())
    }

    /// The undirected petgraph topology
    #[must_use]
    pub fn topology(&self) -> &UnGraph<String, f64> {
        &self.graph
    }

    /// Look up a node's partition class
    #[must_use]
    pub fn class_of(&self, label: &str) -> Option<NodeClass> {
        self.classes.get(label).copied()
    }

    /// Look up a node index by label
    #[must_use]
    pub fn node_index(&self, label: &str) -> Option<NodeIndex> {
        self.node_indices.get(label).copied()
    }

    /// The label of a node index
    #[must_use]
    pub fn label(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    /// All nodes of one class, sorted by label
    #[must_use]
    pub fn nodes_of_class(&self, class: NodeClass) -> Vec<(&str, NodeIndex)> {
        let mut nodes: Vec<(&str, NodeIndex)> = self
            .node_indices
            .iter()
            .filter(|(label, _)| self.classes.get(label.as_str()) == Some(&class))
            .map(|(label, idx)| (label.as_str(), *idx))
            .collect();
        nodes.sort_by_key(|(label, _)| *label);
        nodes
    }

    /// Get agency node count
    #[must_use]
    pub fn agency_count(&self) -> usize {
        self.store.agencies.len()
    }

    /// Get vendor node count
    #[must_use]
    pub fn vendor_count(&self) -> usize {
        self.store.vendors.len()
    }

    /// Get edge count
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.store.edges.len()
    }

    /// Check if the graph is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.agencies.is_empty() && self.store.vendors.is_empty()
    }

    /// Export to DOT format for Graphviz
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("graph contracts {\n");
        dot.push_str("  rankdir=LR;\n\n");

        dot.push_str("  node [shape=box, style=rounded];\n");
        for agency in &self.store.agencies {
            dot.push_str(&format!(
                "  \"{}\" [label=\"{}\\n{} vendors\"];\n",
                agency.name, agency.name, agency.vendor_count
            ));
        }

        dot.push_str("\n  node [shape=ellipse, style=solid];\n");
        for vendor in &self.store.vendors {
            dot.push_str(&format!("  \"{}\";\n", vendor.name));
        }

        dot.push('\n');
        for edge in &self.store.edges {
            dot.push_str(&format!(
                "  \"{}\" -- \"{}\" [label=\"{}\"];\n",
                edge.agency, edge.vendor, edge.contract_count
            ));
        }

        dot.push_str("}\n");
        dot
    }

    /// Export the snapshot to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.store).context("Failed to serialize graph to JSON")
    }
}

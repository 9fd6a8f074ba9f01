// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Community detection over the projected agency graph
//!
//! Detection is a pluggable capability: anything that can turn a
//! [`ProjectedGraph`] into a [`Partition`] qualifies. Both built-in detectors
//! are deterministic - nodes are visited in sorted order and communities are
//! numbered by their smallest member label.

use crate::types::{Partition, ProjectedGraph};
use petgraph::unionfind::UnionFind;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// Given a graph, return a partition into communities
pub trait CommunityDetector {
    /// Method name for CLI display
    fn name(&self) -> &'static str;

    /// Partition the projected graph
    fn detect(&self, projection: &ProjectedGraph) -> Partition;
}

/// Look up a detector by method name
#[must_use]
pub fn detector_for(method: &str) -> Option<Box<dyn CommunityDetector>> {
    match method {
        "components" | "wcc" => Some(Box::new(ConnectedComponents)),
        "modularity" | "greedy" => Some(Box::new(GreedyModularity::default())),
        _ => None,
    }
}

/// Connected components via union-find. Every agency cluster that is
/// transitively linked by shared vendors lands in one community.
pub struct ConnectedComponents;

impl CommunityDetector for ConnectedComponents {
    fn name(&self) -> &'static str {
        "components"
    }

    fn detect(&self, projection: &ProjectedGraph) -> Partition {
        let index: HashMap<&str, usize> = projection
            .nodes
            .iter()
            .enumerate()
            .map(|(i, label)| (label.as_str(), i))
            .collect();

        let mut uf = UnionFind::<usize>::new(projection.nodes.len());
        for edge in &projection.edges {
            uf.union(index[edge.a.as_str()], index[edge.b.as_str()]);
        }

        let mut grouped: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for (i, label) in projection.nodes.iter().enumerate() {
            grouped.entry(uf.find(i)).or_default().push(label.clone());
        }

        build_partition(grouped.into_values().collect())
    }
}

/// Deterministic modularity-oriented local-move detection.
///
/// Each node starts in its own community; sweeps move nodes to the adjacent
/// community with the best modularity gain (node removed from its own
/// community first), stopping when a sweep makes no move. A refinement pass
/// then splits any community that is not internally connected.
pub struct GreedyModularity {
    /// Upper bound on local-move sweeps
    pub max_sweeps: usize,
}

impl Default for GreedyModularity {
    fn default() -> Self {
        Self { max_sweeps: 20 }
    }
}

impl CommunityDetector for GreedyModularity {
    fn name(&self) -> &'static str {
        "modularity"
    }

    fn detect(&self, projection: &ProjectedGraph) -> Partition {
        let n = projection.nodes.len();
        let index: HashMap<&str, usize> = projection
            .nodes
            .iter()
            .enumerate()
            .map(|(i, label)| (label.as_str(), i))
            .collect();

        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
        for edge in &projection.edges {
            let (a, b) = (index[edge.a.as_str()], index[edge.b.as_str()]);
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
        for neighbors in &mut adjacency {
            neighbors.sort_unstable();
        }

        let total_weight = projection.edges.len() as f64;
        if total_weight == 0.0 {
            let singletons = projection.nodes.iter().map(|l| vec![l.clone()]).collect();
            return build_partition(singletons);
        }

        let degree: Vec<f64> = adjacency.iter().map(|nb| nb.len() as f64).collect();
        let mut assignment: Vec<usize> = (0..n).collect();

        for _ in 0..self.max_sweeps {
            let mut moved = false;

            for node in 0..n {
                let current = assignment[node];

                let mut candidates: Vec<usize> = adjacency[node]
                    .iter()
                    .map(|&nb| assignment[nb])
                    .chain(std::iter::once(current))
                    .collect();
                candidates.sort_unstable();
                candidates.dedup();

                let mut best = current;
                let mut best_score = f64::NEG_INFINITY;
                for candidate in candidates {
                    let score = move_gain(
                        node,
                        candidate,
                        &adjacency,
                        &degree,
                        &assignment,
                        total_weight,
                    );
                    let better = score > best_score + 1e-12
                        || (candidate == current && (score - best_score).abs() <= 1e-12);
                    if better {
                        best_score = score;
                        best = candidate;
                    }
                }

                if best != current {
                    assignment[node] = best;
                    moved = true;
                }
            }

            if !moved {
                break;
            }
        }

        let refined = split_disconnected(&adjacency, &assignment);

        let mut grouped: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for (node, comm) in refined.iter().enumerate() {
            grouped
                .entry(*comm)
                .or_default()
                .push(projection.nodes[node].clone());
        }

        build_partition(grouped.into_values().collect())
    }
}

/// Modularity gain for moving `node` into `candidate`, with `node` taken out
/// of its current community first.
fn move_gain(
    node: usize,
    candidate: usize,
    adjacency: &[Vec<usize>],
    degree: &[f64],
    assignment: &[usize],
    total_weight: f64,
) -> f64 {
    let k_i = degree[node];

    let mut k_i_in = 0.0;
    for &neighbor in &adjacency[node] {
        if assignment[neighbor] == candidate {
            k_i_in += 1.0;
        }
    }

    let mut sum_tot = 0.0;
    for (other, comm) in assignment.iter().enumerate() {
        if *comm == candidate && other != node {
            sum_tot += degree[other];
        }
    }

    k_i_in - (k_i * sum_tot) / (2.0 * total_weight)
}

/// Split every community into its internally connected components
fn split_disconnected(adjacency: &[Vec<usize>], assignment: &[usize]) -> Vec<usize> {
    let n = assignment.len();
    let mut refined = vec![usize::MAX; n];
    let mut next = 0;

    for start in 0..n {
        if refined[start] != usize::MAX {
            continue;
        }

        let comm = assignment[start];
        let mut queue = VecDeque::new();
        refined[start] = next;
        queue.push_back(start);

        while let Some(node) = queue.pop_front() {
            for &neighbor in &adjacency[node] {
                if assignment[neighbor] == comm && refined[neighbor] == usize::MAX {
                    refined[neighbor] = next;
                    queue.push_back(neighbor);
                }
            }
        }

        next += 1;
    }

    refined
}

/// Sort members, order communities by smallest member, build the membership map
fn build_partition(mut groups: Vec<Vec<String>>) -> Partition {
    for group in &mut groups {
        group.sort();
    }
    groups.retain(|g| !g.is_empty());
    groups.sort_by(|a, b| a[0].cmp(&b[0]));

    let membership = groups
        .iter()
        .enumerate()
        .flat_map(|(comm, members)| members.iter().map(move |m| (m.clone(), comm)))
        .collect();

    Partition {
        communities: groups,
        membership,
    }
}

/// Newman modularity of a partition over the projected graph
#[must_use]
pub fn modularity(projection: &ProjectedGraph, partition: &Partition) -> f64 {
    let m = projection.edges.len() as f64;
    if m == 0.0 {
        return 0.0;
    }

    let mut degree: HashMap<&str, f64> = HashMap::new();
    for edge in &projection.edges {
        *degree.entry(edge.a.as_str()).or_insert(0.0) += 1.0;
        *degree.entry(edge.b.as_str()).or_insert(0.0) += 1.0;
    }

    let mut q = 0.0;
    for community in &partition.communities {
        let members: HashSet<&str> = community.iter().map(String::as_str).collect();
        let internal = projection
            .edges
            .iter()
            .filter(|e| members.contains(e.a.as_str()) && members.contains(e.b.as_str()))
            .count() as f64;
        let total_degree: f64 = community
            .iter()
            .map(|node| degree.get(node.as_str()).copied().unwrap_or(0.0))
            .sum();

        q += internal / m - (total_degree / (2.0 * m)).powi(2);
    }

    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProjectedEdge;

    fn projection(nodes: &[&str], edges: &[(&str, &str)]) -> ProjectedGraph {
        ProjectedGraph {
            nodes: nodes.iter().map(|n| (*n).to_string()).collect(),
            edges: edges
                .iter()
                .map(|(a, b)| ProjectedEdge::canonical(a, b, 1))
                .collect(),
        }
    }

    #[test]
    fn test_components_two_clusters() {
        let graph = projection(
            &["A", "B", "C", "D", "E"],
            &[("A", "B"), ("B", "C"), ("D", "E")],
        );

        let partition = ConnectedComponents.detect(&graph);

        assert_eq!(partition.len(), 2);
        assert_eq!(partition.communities[0], vec!["A", "B", "C"]);
        assert_eq!(partition.communities[1], vec!["D", "E"]);
        assert_eq!(partition.membership["A"], 0);
        assert_eq!(partition.membership["E"], 1);
    }

    #[test]
    fn test_components_isolated_singletons() {
        let graph = projection(&["A", "B", "C"], &[("A", "B")]);

        let partition = ConnectedComponents.detect(&graph);

        assert_eq!(partition.len(), 2);
        assert_eq!(partition.communities[1], vec!["C"]);
    }

    #[test]
    fn test_modularity_no_edges_singletons() {
        let graph = projection(&["A", "B"], &[]);

        let partition = GreedyModularity::default().detect(&graph);

        assert_eq!(partition.len(), 2);
        assert!(partition.communities.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn test_modularity_two_triangles() {
        let graph = projection(
            &["A", "B", "C", "D", "E", "F"],
            &[
                ("A", "B"),
                ("B", "C"),
                ("A", "C"),
                ("D", "E"),
                ("E", "F"),
                ("D", "F"),
            ],
        );

        let partition = GreedyModularity::default().detect(&graph);

        assert_eq!(partition.len(), 2);
        assert_eq!(partition.communities[0], vec!["A", "B", "C"]);
        assert_eq!(partition.communities[1], vec!["D", "E", "F"]);
    }

    #[test]
    fn test_modularity_bridged_triangles() {
        let graph = projection(
            &["A", "B", "C", "D", "E", "F"],
            &[
                ("A", "B"),
                ("B", "C"),
                ("A", "C"),
                ("C", "D"),
                ("D", "E"),
                ("E", "F"),
                ("D", "F"),
            ],
        );

        let partition = GreedyModularity::default().detect(&graph);

        assert_eq!(partition.len(), 2);
        assert_eq!(partition.communities[0], vec!["A", "B", "C"]);
        assert_eq!(partition.communities[1], vec!["D", "E", "F"]);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let graph = projection(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "C"), ("C", "D"), ("A", "D")],
        );

        let first = GreedyModularity::default().detect(&graph);
        let second = GreedyModularity::default().detect(&graph);

        assert_eq!(first.communities, second.communities);
    }

    #[test]
    fn test_communities_are_connected() {
        let graph = projection(
            &["A", "B", "C", "D", "E"],
            &[("A", "B"), ("C", "D"), ("D", "E")],
        );

        let partition = GreedyModularity::default().detect(&graph);

        for community in &partition.communities {
            // Within a community every member reaches every other member.
            let members: HashSet<&str> = community.iter().map(String::as_str).collect();
            let mut reached = HashSet::new();
            let mut queue = VecDeque::from([community[0].as_str()]);
            reached.insert(community[0].as_str());
            while let Some(node) = queue.pop_front() {
                for edge in &graph.edges {
                    let ends = [
                        (edge.a.as_str(), edge.b.as_str()),
                        (edge.b.as_str(), edge.a.as_str()),
                    ];
                    for (x, y) in ends {
                        if x == node && members.contains(y) && reached.insert(y) {
                            queue.push_back(y);
                        }
                    }
                }
            }
            assert_eq!(reached.len(), community.len());
        }
    }

    #[test]
    fn test_modularity_score() {
        let graph = projection(&["A", "B", "C", "D"], &[("A", "B"), ("C", "D")]);
        let partition = ConnectedComponents.detect(&graph);

        let q = modularity(&graph, &partition);
        assert!((q - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_detector_for() {
        assert_eq!(detector_for("components").unwrap().name(), "components");
        assert_eq!(detector_for("modularity").unwrap().name(), "modularity");
        assert!(detector_for("louvain-3000").is_none());
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Property tests for the bipartite projection

use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use vendornet::graph::ContractGraph;
use vendornet::projection::{self, UnitCostOracle};
use vendornet::types::{AgencyNode, ContractEdge, GraphStore, NodeClass, VendorNode};

/// Build a valid bipartite store from arbitrary (agency, vendor) index pairs
fn store_from_pairs(pairs: &[(u8, u8)]) -> GraphStore {
    let unique: BTreeSet<(String, String)> = pairs
        .iter()
        .map(|(a, v)| (format!("A{a:02}"), format!("V{v:02}")))
        .collect();

    let agencies: BTreeSet<&str> = unique.iter().map(|(a, _)| a.as_str()).collect();
    let vendors: BTreeSet<&str> = unique.iter().map(|(_, v)| v.as_str()).collect();

    GraphStore {
        agencies: agencies
            .into_iter()
            .map(|name| AgencyNode {
                name: name.into(),
                contract_count: 1,
                vendor_count: 1,
                total_amount: 1.0,
            })
            .collect(),
        vendors: vendors
            .into_iter()
            .map(|name| VendorNode {
                name: name.into(),
                vendor_id: None,
                contract_count: 1,
                agency_count: 1,
                total_amount: 1.0,
            })
            .collect(),
        edges: unique
            .into_iter()
            .map(|(agency, vendor)| ContractEdge {
                agency,
                vendor,
                contract_count: 1,
                total_amount: 1.0,
            })
            .collect(),
    }
}

/// Ground truth straight from the definition: every pair of agencies with a
/// common vendor, in canonical order
fn shared_vendor_pairs(store: &GraphStore) -> BTreeSet<(String, String)> {
    let mut by_vendor: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for edge in &store.edges {
        by_vendor
            .entry(edge.vendor.as_str())
            .or_default()
            .insert(edge.agency.as_str());
    }

    let mut pairs = BTreeSet::new();
    for agencies in by_vendor.values() {
        for a in agencies {
            for b in agencies {
                if a < b {
                    pairs.insert(((*a).to_string(), (*b).to_string()));
                }
            }
        }
    }
    pairs
}

proptest! {
    #[test]
    fn projection_matches_shared_vendor_definition(
        pairs in proptest::collection::vec((0u8..12, 0u8..12), 1..60)
    ) {
        let store = store_from_pairs(&pairs);
        let expected = shared_vendor_pairs(&store);

        let graph = ContractGraph::from_store(store).unwrap();
        let projected =
            projection::project(&graph, NodeClass::Agency, &UnitCostOracle).unwrap();

        let actual: BTreeSet<(String, String)> = projected
            .edges
            .iter()
            .map(|e| (e.a.clone(), e.b.clone()))
            .collect();

        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn projection_edges_are_canonical_and_unique(
        pairs in proptest::collection::vec((0u8..12, 0u8..12), 1..60)
    ) {
        let graph = ContractGraph::from_store(store_from_pairs(&pairs)).unwrap();
        let projected =
            projection::project(&graph, NodeClass::Agency, &UnitCostOracle).unwrap();

        let mut seen = BTreeSet::new();
        for edge in &projected.edges {
            prop_assert!(edge.a < edge.b);
            prop_assert!(edge.shared_vendors >= 1);
            prop_assert!(seen.insert((edge.a.clone(), edge.b.clone())));
        }
    }

    #[test]
    fn projection_is_deterministic(
        pairs in proptest::collection::vec((0u8..12, 0u8..12), 1..60)
    ) {
        let graph = ContractGraph::from_store(store_from_pairs(&pairs)).unwrap();

        let first = projection::project(&graph, NodeClass::Agency, &UnitCostOracle).unwrap();
        let second = projection::project(&graph, NodeClass::Agency, &UnitCostOracle).unwrap();

        prop_assert_eq!(first, second);
    }
}

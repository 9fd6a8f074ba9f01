// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Vendornet library - shared-vendor network analysis for procurement data
//!
//! This crate builds a bipartite Agency-Vendor graph from municipal contract
//! records, projects it onto an Agency-Agency graph via shortest-path
//! filtering, and partitions the projection into communities.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod commands;
pub mod community;
pub mod config;
pub mod graph;
pub mod ingest;
pub mod projection;

/// Core data types for contract records and graph snapshots
pub mod types {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serialize};
    use std::collections::HashMap;
    use std::fmt;

    // =========================================================================
    // Node Classes
    // =========================================================================

    /// The two partition classes of the bipartite graph
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum NodeClass {
        /// A government purchasing unit
        Agency,
        /// A contracted supplier
        Vendor,
    }

    impl NodeClass {
        /// Get the short code for this class
        #[must_use]
        pub fn code(&self) -> &'static str {
            match self {
                Self::Agency => "agency",
                Self::Vendor => "vendor",
            }
        }

        /// The opposite partition class
        #[must_use]
        pub fn opposite(&self) -> Self {
            match self {
                Self::Agency => Self::Vendor,
                Self::Vendor => Self::Agency,
            }
        }
    }

    impl fmt::Display for NodeClass {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.code())
        }
    }

    // =========================================================================
    // Contract Records
    // =========================================================================

    /// One raw contract row as exported by the municipal procurement system
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ContractRecord {
        /// Purchasing agency name
        pub agency: String,
        /// Vendor identifier assigned by the procurement system
        #[serde(rename = "vendorID", default)]
        pub vendor_id: String,
        /// Vendor display name
        #[serde(default)]
        pub vendor_name: String,
        /// Free-text contract description
        #[serde(default)]
        pub description: String,
        /// Contract start date (blank in older exports)
        #[serde(default, deserialize_with = "lenient_date")]
        pub start_date: Option<NaiveDate>,
        /// Contract end date (blank in older exports)
        #[serde(default, deserialize_with = "lenient_date")]
        pub end_date: Option<NaiveDate>,
        /// Total contract amount in dollars
        #[serde(rename = "totalContractAmt", deserialize_with = "lenient_amount")]
        pub total_contract_amt: f64,
    }

    impl ContractRecord {
        /// The graph label for this record's vendor: the trimmed name,
        /// falling back to the vendor ID when the name is blank.
        #[must_use]
        pub fn vendor_label(&self) -> Option<&str> {
            let name = self.vendor_name.trim();
            if !name.is_empty() {
                return Some(name);
            }
            let id = self.vendor_id.trim();
            if !id.is_empty() {
                return Some(id);
            }
            None
        }

        /// The graph label for this record's agency
        #[must_use]
        pub fn agency_label(&self) -> Option<&str> {
            let agency = self.agency.trim();
            if agency.is_empty() {
                None
            } else {
                Some(agency)
            }
        }
    }

    /// Accept `2018-07-01`, `7/1/2018`, or blank
    fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        let Some(raw) = raw else { return Ok(None) };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
            .map(Some)
            .map_err(serde::de::Error::custom)
    }

    /// Accept `1234.5`, `$1,234.50`, or blank (blank means zero)
    fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let cleaned: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '$' && *c != ',')
            .collect();
        if cleaned.is_empty() {
            return Ok(0.0);
        }
        cleaned.parse::<f64>().map_err(serde::de::Error::custom)
    }

    // =========================================================================
    // Graph Store (persisted bipartite snapshot)
    // =========================================================================

    /// Aggregated agency node
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AgencyNode {
        /// Agency name, the node label
        pub name: String,
        /// Number of contract rows attributed to this agency
        pub contract_count: u64,
        /// Number of distinct vendors this agency contracts with
        pub vendor_count: u64,
        /// Sum of contract amounts
        pub total_amount: f64,
    }

    /// Aggregated vendor node
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct VendorNode {
        /// Vendor label (name, or ID when the name is blank)
        pub name: String,
        /// Vendor ID from the source system, when present
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub vendor_id: Option<String>,
        /// Number of contract rows attributed to this vendor
        pub contract_count: u64,
        /// Number of distinct agencies contracting this vendor
        pub agency_count: u64,
        /// Sum of contract amounts
        pub total_amount: f64,
    }

    /// Deduplicated weighted bipartite edge, always oriented Agency -> Vendor
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ContractEdge {
        /// Agency label
        pub agency: String,
        /// Vendor label
        pub vendor: String,
        /// Number of contract rows collapsed into this edge
        pub contract_count: u64,
        /// Sum of contract amounts across those rows
        pub total_amount: f64,
    }

    /// The complete persisted bipartite graph snapshot
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct GraphStore {
        /// All agency nodes
        #[serde(default)]
        pub agencies: Vec<AgencyNode>,
        /// All vendor nodes
        #[serde(default)]
        pub vendors: Vec<VendorNode>,
        /// All agency-vendor edges
        #[serde(default)]
        pub edges: Vec<ContractEdge>,
    }

    // =========================================================================
    // Projection
    // =========================================================================

    /// One undirected agency-agency edge in canonical order
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ProjectedEdge {
        /// Lexicographically smaller agency label
        pub a: String,
        /// Lexicographically larger agency label
        pub b: String,
        /// Number of vendors adjacent to both endpoints
        pub shared_vendors: u64,
    }

    impl ProjectedEdge {
        /// Build an edge with the endpoints in canonical order
        #[must_use]
        pub fn canonical(x: &str, y: &str, shared_vendors: u64) -> Self {
            if x <= y {
                Self {
                    a: x.to_string(),
                    b: y.to_string(),
                    shared_vendors,
                }
            } else {
                Self {
                    a: y.to_string(),
                    b: x.to_string(),
                    shared_vendors,
                }
            }
        }
    }

    /// The unipartite agency graph derived from the bipartite snapshot.
    /// Immutable once built.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct ProjectedGraph {
        /// All agency labels, sorted (isolated agencies included)
        pub nodes: Vec<String>,
        /// Canonical edges, sorted by (a, b)
        pub edges: Vec<ProjectedEdge>,
    }

    impl ProjectedGraph {
        /// Agency labels that appear in no edge
        #[must_use]
        pub fn isolated_nodes(&self) -> Vec<&str> {
            self.nodes
                .iter()
                .filter(|n| !self.edges.iter().any(|e| e.a == **n || e.b == **n))
                .map(String::as_str)
                .collect()
        }
    }

    // =========================================================================
    // Communities
    // =========================================================================

    /// A partition of the projected graph into communities
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Partition {
        /// Communities ordered by their smallest member label; each community
        /// is a sorted list of agency labels
        pub communities: Vec<Vec<String>>,
        /// Map from agency label to community index
        pub membership: HashMap<String, usize>,
    }

    impl Partition {
        /// Number of communities
        #[must_use]
        pub fn len(&self) -> usize {
            self.communities.len()
        }

        /// True when the partition holds no communities
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.communities.is_empty()
        }
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::graph::{ContractGraph, GraphError};
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}

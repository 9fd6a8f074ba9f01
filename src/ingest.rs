// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Contract record ingestion and aggregation
//!
//! Reads raw contract rows from CSV and collapses them into the weighted
//! bipartite snapshot: per-agency and per-vendor summaries plus one
//! deduplicated edge per (agency, vendor) pair.

use crate::types::{AgencyNode, ContractEdge, ContractRecord, GraphStore, VendorNode};
use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::warn;

/// Outcome of aggregating raw records
pub struct Aggregation {
    /// The bipartite snapshot ready for graph construction
    pub store: GraphStore,
    /// Number of rows consumed
    pub record_count: usize,
    /// Rows skipped for missing agency or vendor identity
    pub skipped: usize,
}

/// Read contract records from a CSV file
pub fn read_records(path: &Path) -> Result<Vec<ContractRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: ContractRecord =
            row.with_context(|| format!("Malformed row in {}", path.display()))?;
        records.push(record);
    }

    Ok(records)
}

#[derive(Default)]
struct NodeAccum {
    contract_count: u64,
    total_amount: f64,
    counterparties: BTreeSet<String>,
}

/// Aggregate raw records into the bipartite snapshot.
///
/// Rows without an agency label or a vendor identity are skipped and counted;
/// everything else folds into BTreeMap-ordered accumulators so the resulting
/// store is deterministic regardless of input order.
#[must_use]
pub fn aggregate(records: &[ContractRecord]) -> Aggregation {
    let mut agencies: BTreeMap<String, NodeAccum> = BTreeMap::new();
    let mut vendors: BTreeMap<String, NodeAccum> = BTreeMap::new();
    let mut vendor_ids: BTreeMap<String, String> = BTreeMap::new();
    let mut edges: BTreeMap<(String, String), (u64, f64)> = BTreeMap::new();
    let mut skipped = 0;

    for record in records {
        let (Some(agency), Some(vendor)) = (record.agency_label(), record.vendor_label()) else {
            warn!(
                agency = %record.agency,
                vendor_id = %record.vendor_id,
                "skipping row without agency or vendor identity"
            );
            skipped += 1;
            continue;
        };

        let amount = record.total_contract_amt;

        let agency_accum = agencies.entry(agency.to_string()).or_default();
        agency_accum.contract_count += 1;
        agency_accum.total_amount += amount;
        agency_accum.counterparties.insert(vendor.to_string());

        let vendor_accum = vendors.entry(vendor.to_string()).or_default();
        vendor_accum.contract_count += 1;
        vendor_accum.total_amount += amount;
        vendor_accum.counterparties.insert(agency.to_string());

        let id = record.vendor_id.trim();
        if !id.is_empty() {
            vendor_ids.entry(vendor.to_string()).or_insert_with(|| id.to_string());
        }

        let edge = edges
            .entry((agency.to_string(), vendor.to_string()))
            .or_insert((0, 0.0));
        edge.0 += 1;
        edge.1 += amount;
    }

    let store = GraphStore {
        agencies: agencies
            .into_iter()
            .map(|(name, accum)| AgencyNode {
                name,
                contract_count: accum.contract_count,
                vendor_count: accum.counterparties.len() as u64,
                total_amount: accum.total_amount,
            })
            .collect(),
        vendors: vendors
            .into_iter()
            .map(|(name, accum)| VendorNode {
                vendor_id: vendor_ids.remove(&name),
                name,
                contract_count: accum.contract_count,
                agency_count: accum.counterparties.len() as u64,
                total_amount: accum.total_amount,
            })
            .collect(),
        edges: edges
            .into_iter()
            .map(|((agency, vendor), (contract_count, total_amount))| ContractEdge {
                agency,
                vendor,
                contract_count,
                total_amount,
            })
            .collect(),
    };

    Aggregation {
        store,
        record_count: records.len(),
        skipped,
    }
}

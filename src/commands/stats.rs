// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Stats command - agency and vendor aggregation tables

use crate::graph::ContractGraph;
use crate::types::{AgencyNode, VendorNode};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct StatsReport<'a> {
    agencies: &'a [AgencyNode],
    vendors: &'a [VendorNode],
}

/// Run the stats command
pub fn run(top: usize, by: &str, json: bool, data_dir: Option<&Path>) -> Result<()> {
    let data_dir = resolve_data_dir(data_dir)?;
    let graph = ContractGraph::load(&data_dir)
        .with_context(|| format!("Failed to load graph from {}", data_dir.display()))?;

    if graph.is_empty() {
        println!("Graph is empty. Run 'vendornet ingest' first.");
        return Ok(());
    }

    let mut agencies = graph.store.agencies.clone();
    let mut vendors = graph.store.vendors.clone();

    match by {
        "amount" => {
            agencies.sort_by(|a, b| b.total_amount.total_cmp(&a.total_amount));
            vendors.sort_by(|a, b| b.total_amount.total_cmp(&a.total_amount));
        }
        "contracts" => {
            agencies.sort_by(|a, b| b.contract_count.cmp(&a.contract_count));
            vendors.sort_by(|a, b| b.contract_count.cmp(&a.contract_count));
        }
        "degree" => {
            agencies.sort_by(|a, b| b.vendor_count.cmp(&a.vendor_count));
            vendors.sort_by(|a, b| b.agency_count.cmp(&a.agency_count));
        }
        other => {
            anyhow::bail!("Unknown sort key: {}. Valid: amount, contracts, degree", other);
        }
    }

    agencies.truncate(top);
    vendors.truncate(top);

    if json {
        let report = StatsReport {
            agencies: &agencies,
            vendors: &vendors,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Agencies (top {} by {}):", agencies.len(), by);
    for agency in &agencies {
        println!(
            "  {:<40} contracts={:<5} vendors={:<5} total=${:.2}",
            agency.name, agency.contract_count, agency.vendor_count, agency.total_amount
        );
    }

    println!();
    println!("Vendors (top {} by {}):", vendors.len(), by);
    for vendor in &vendors {
        println!(
            "  {:<40} contracts={:<5} agencies={:<5} total=${:.2}",
            vendor.name, vendor.contract_count, vendor.agency_count, vendor.total_amount
        );
    }

    Ok(())
}

/// Get the data directory
fn resolve_data_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }

    if let Ok(dir) = std::env::var("VENDORNET_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }

    let data_dir = directories::ProjectDirs::from("org", "hyperpolymath", "vendornet")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".vendornet")
        });

    Ok(data_dir)
}

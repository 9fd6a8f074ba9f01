// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Ingest command - reads contract records and builds the bipartite graph

use crate::graph::ContractGraph;
use crate::ingest;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Run the ingest command
pub fn run(records_path: &Path, data_dir: Option<&Path>) -> Result<()> {
    info!("Ingesting: {:?}", records_path);

    let records = ingest::read_records(records_path)
        .with_context(|| format!("Failed to read {}", records_path.display()))?;

    if records.is_empty() {
        println!("No contract records found in {}", records_path.display());
        return Ok(());
    }

    let aggregation = ingest::aggregate(&records);

    if aggregation.skipped > 0 {
        eprintln!(
            "  Warning: skipped {} row(s) without agency or vendor identity",
            aggregation.skipped
        );
    }

    let graph = ContractGraph::from_store(aggregation.store)
        .context("Aggregated records violate the bipartite invariant")?;

    // Print summary
    println!("Ingested {} contract records:", aggregation.record_count);
    println!();
    println!("  agencies: {}", graph.agency_count());
    println!("  vendors:  {}", graph.vendor_count());
    println!("  edges:    {}", graph.edge_count());
    println!();

    let data_dir = resolve_data_dir(data_dir)?;
    graph
        .save(&data_dir)
        .with_context(|| format!("Failed to save graph to {}", data_dir.display()))?;

    println!("Graph saved to {}", data_dir.display());

    Ok(())
}

/// Get the data directory for storing the graph
fn resolve_data_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }

    // Check environment variable first
    if let Ok(dir) = std::env::var("VENDORNET_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }

    // Use XDG data directory or fallback
    let data_dir = directories::ProjectDirs::from("org", "hyperpolymath", "vendornet")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".vendornet")
        });

    Ok(data_dir)
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Project command - derives the agency graph from the bipartite snapshot

use crate::graph::ContractGraph;
use crate::projection::{self, UnitCostOracle};
use crate::types::NodeClass;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Run the project command
pub fn run(json: bool, data_dir: Option<&Path>) -> Result<()> {
    let data_dir = resolve_data_dir(data_dir)?;
    let graph = ContractGraph::load(&data_dir)
        .with_context(|| format!("Failed to load graph from {}", data_dir.display()))?;

    if graph.is_empty() {
        println!("Graph is empty. Run 'vendornet ingest' first.");
        return Ok(());
    }

    info!(
        agencies = graph.agency_count(),
        vendors = graph.vendor_count(),
        "projecting"
    );

    let projected = projection::project(&graph, NodeClass::Agency, &UnitCostOracle)
        .context("Projection failed")?;

    projection::save(&projected, &data_dir)
        .with_context(|| format!("Failed to save projection to {}", data_dir.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&projected)?);
        return Ok(());
    }

    println!("Projected agency graph:");
    println!();
    println!("  agencies: {}", projected.nodes.len());
    println!("  links:    {}", projected.edges.len());
    println!("  isolated: {}", projected.isolated_nodes().len());
    println!();
    println!("Projection saved to {}", data_dir.display());

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

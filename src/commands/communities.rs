// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Communities command - partitions the projected agency graph

use crate::community::{self, detector_for};
use crate::projection;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Run the communities command
pub fn run(method: &str, json: bool, data_dir: Option<&Path>) -> Result<()> {
    let detector = detector_for(method).ok_or_else(|| {
        anyhow::anyhow!("Unknown method: {}. Valid: components, modularity", method)
    })?;

    let data_dir = resolve_data_dir(data_dir)?;
    let projected = projection::load(&data_dir)
        .with_context(|| format!("Failed to load projection from {}", data_dir.display()))?;

    if projected.nodes.is_empty() {
        println!("No projection found. Run 'vendornet project' first.");
        return Ok(());
    }

    info!(method = detector.name(), nodes = projected.nodes.len(), "detecting");

    let partition = detector.detect(&projected);
    let q = community::modularity(&projected, &partition);

    if json {
        println!("{}", serde_json::to_string_pretty(&partition)?);
        return Ok(());
    }

    println!(
        "Communities ({}, method={}, modularity={:.4}):",
        partition.len(),
        detector.name(),
        q
    );
    for (i, members) in partition.communities.iter().enumerate() {
        println!("  [{}] {}", i, members.join(", "));
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

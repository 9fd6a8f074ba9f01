// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Export command - exports graphs to various formats

use crate::graph::ContractGraph;
use crate::projection;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Graphviz DOT format
    Dot,
    /// JSON format
    Json,
    /// Tab-separated edge list
    Edges,
}

impl ExportFormat {
    /// Parse format from string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dot" | "graphviz" => Some(Self::Dot),
            "json" => Some(Self::Json),
            "edges" | "edgelist" => Some(Self::Edges),
            _ => None,
        }
    }

    /// Get file extension for format
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::Json => "json",
            Self::Edges => "tsv",
        }
    }
}

/// Which graph to export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    /// The bipartite agency-vendor graph
    Bipartite,
    /// The projected agency-agency graph
    Projected,
}

impl ExportTarget {
    /// Parse target from string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bipartite" | "contracts" => Some(Self::Bipartite),
            "projected" | "agencies" => Some(Self::Projected),
            _ => None,
        }
    }
}

/// Run the export command
pub fn run(
    graph: &str,
    format: &str,
    output: Option<PathBuf>,
    data_dir: Option<&Path>,
) -> Result<()> {
    info!("Exporting {} as {}", graph, format);

    let target = ExportTarget::parse(graph).ok_or_else(|| {
        anyhow::anyhow!("Unknown graph: {}. Supported: bipartite, projected", graph)
    })?;
    let export_format = ExportFormat::parse(format).ok_or_else(|| {
        anyhow::anyhow!("Unknown export format: {}. Supported: dot, json, edges", format)
    })?;

    let data_dir = resolve_data_dir(data_dir)?;

    let content = match target {
        ExportTarget::Bipartite => {
            let graph = ContractGraph::load(&data_dir)
                .with_context(|| format!("Failed to load graph from {}", data_dir.display()))?;

            if graph.is_empty() {
                eprintln!("Warning: Graph is empty. Run 'vendornet ingest' first.");
            }

            match export_format {
                ExportFormat::Dot => graph.to_dot(),
                ExportFormat::Json => graph.to_json()?,
                ExportFormat::Edges => bipartite_edge_list(&graph),
            }
        }
        ExportTarget::Projected => {
            let projected = projection::load(&data_dir).with_context(|| {
                format!("Failed to load projection from {}", data_dir.display())
            })?;

            if projected.nodes.is_empty() {
                eprintln!("Warning: No projection found. Run 'vendornet project' first.");
            }

            match export_format {
                ExportFormat::Dot => projection::to_dot(&projected),
                ExportFormat::Json => serde_json::to_string_pretty(&projected)
                    .context("Failed to serialize projection to JSON")?,
                ExportFormat::Edges => projection::to_edge_list(&projected),
            }
        }
    };

    // Write output
    match output {
        Some(path) => {
            fs::write(&path, &content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}

/// Tab-separated agency-vendor pairs with contract counts
fn bipartite_edge_list(graph: &ContractGraph) -> String {
    let mut out = String::new();
    for edge in &graph.store.edges {
        out.push_str(&format!(
            "{}\t{}\t{}\n",
            edge.agency, edge.vendor, edge.contract_count
        ));
    }
    out
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

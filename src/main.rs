// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Vendornet CLI - shared-vendor network analysis for procurement data

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use vendornet::commands;

#[derive(Parser)]
#[command(name = "vendornet")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,

    /// Data directory override
    #[arg(long, env = "VENDORNET_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest contract records and build the bipartite graph
    Ingest {
        /// CSV file of contract records
        records: std::path::PathBuf,
    },

    /// Show agency and vendor aggregation tables
    Stats {
        /// Number of rows per table
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Sort key (amount, contracts, degree)
        #[arg(long, default_value = "amount")]
        by: String,
    },

    /// Project the bipartite graph onto the agency graph
    Project,

    /// Detect communities in the projected agency graph
    Communities {
        /// Detection method (components, modularity)
        #[arg(long, default_value = "components")]
        method: String,
    },

    /// Export a graph to various formats
    Export {
        /// Which graph to export (bipartite, projected)
        #[arg(long, default_value = "bipartite")]
        graph: String,

        /// Output format (dot, json, edges)
        #[arg(short, long, default_value = "dot")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 if cli.quiet => tracing::Level::ERROR,
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    // Execute command
    match cli.command {
        Commands::Ingest { records } => commands::ingest::run(&records, cli.data_dir.as_deref()),
        Commands::Stats { top, by } => {
            commands::stats::run(top, &by, cli.json, cli.data_dir.as_deref())
        }
        Commands::Project => commands::project::run(cli.json, cli.data_dir.as_deref()),
        Commands::Communities { method } => {
            commands::communities::run(&method, cli.json, cli.data_dir.as_deref())
        }
        Commands::Export {
            graph,
            format,
            output,
        } => commands::export::run(&graph, &format, output, cli.data_dir.as_deref()),
        Commands::Completions { shell } => {
            commands::completions::run(shell, &mut Cli::command());
            Ok(())
        }
    }
}

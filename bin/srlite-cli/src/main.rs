// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # srlite
//!
//! Command-line interface for the srlite conversion pipeline.
//!
//! ## Usage
//! ```bash
//! # Analyze a serialized graph and produce a validated lite artifact
//! srlite convert --graph ./FSRCNN_x2.graph.json --scale 2.0 --output fsrcnn_x2.srl
//!
//! # Inspect a graph's structure and endpoint candidates without converting
//! srlite inspect --graph ./FSRCNN_x2.graph.json
//!
//! # Re-validate an existing artifact against an expected scale factor
//! srlite validate --artifact fsrcnn_x2.srl --scale 2.0
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "srlite",
    about = "Graph analyzer and conversion fallback pipeline for super-resolution artifacts",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file (keyword lists, timeouts, defaults).
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: analyze, convert with fallbacks, validate.
    Convert {
        /// Path to the serialized graph (frozen file or saved-model directory).
        #[arg(short, long)]
        graph: std::path::PathBuf,

        /// Expected output/input spatial scale factor.
        #[arg(short, long, default_value_t = 2.0)]
        scale: f64,

        /// Where to write the accepted artifact (defaults to `<stem>.srl`).
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,

        /// Also package the artifact into this deployment directory.
        #[arg(long)]
        package_dir: Option<std::path::PathBuf>,
    },

    /// Inspect a graph: node listing, connectivity, endpoint candidates.
    Inspect {
        /// Path to the serialized graph.
        #[arg(short, long)]
        graph: std::path::PathBuf,
    },

    /// Validate an existing artifact against the scale contract.
    Validate {
        /// Path to the lite artifact.
        #[arg(short, long)]
        artifact: std::path::PathBuf,

        /// Expected output/input spatial scale factor.
        #[arg(short, long, default_value_t = 2.0)]
        scale: f64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Convert {
            graph,
            scale,
            output,
            package_dir,
        } => commands::convert::execute(graph, scale, output, package_dir, cli.config),
        Commands::Inspect { graph } => commands::inspect::execute(graph, cli.config),
        Commands::Validate { artifact, scale } => {
            commands::validate::execute(artifact, scale, cli.config)
        }
    }
}

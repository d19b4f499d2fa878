// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `srlite inspect` command: graph structure and endpoint candidates.
//!
//! Prints the analysis the pipeline would act on, without converting:
//! node tallies, the first nodes with their out-degrees, placeholder
//! details, ranked endpoint candidates, and the best-guess pair.

use graph_ir::{ConnectivityIndex, GraphLoader};
use node_classifier::classify;
use std::path::PathBuf;

pub fn execute(graph_path: PathBuf, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║               srlite · Graph Inspector              ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let config = super::load_config(config_path)?;
    let graph = GraphLoader::load(&graph_path)
        .map_err(|e| anyhow::anyhow!("failed to load '{}': {e}", graph_path.display()))?;
    let connectivity = ConnectivityIndex::build(&graph);

    // ── Summary ────────────────────────────────────────────────
    println!("  {}", graph.summary());
    if !graph.duplicate_names().is_empty() {
        println!(
            "  Duplicate node names: {:?} (endpoint binding will refuse these)",
            graph.duplicate_names(),
        );
    }
    if connectivity.unknown_refs() > 0 {
        println!(
            "  Dangling references: {} (first: {:?})",
            connectivity.unknown_refs(),
            connectivity.dangling().first(),
        );
    }
    println!();

    // ── First Nodes ────────────────────────────────────────────
    println!("  {:<4} {:<30} {:<22} {:>8}", "Idx", "Name", "Op", "Out-deg");
    println!("  {}", "-".repeat(68));
    for (i, node) in graph.iter_nodes().take(10).enumerate() {
        println!(
            "  {:<4} {:<30} {:<22} {:>8}",
            i,
            super::truncate(&node.name, 30),
            super::truncate(&node.op, 22),
            connectivity.out_degree(&node.name),
        );
    }
    if graph.num_nodes() > 10 {
        println!("  ... and {} more", graph.num_nodes() - 10);
    }
    println!();

    // ── Placeholders ───────────────────────────────────────────
    let placeholders: Vec<_> = graph
        .iter_nodes()
        .filter(|n| config.classifier.placeholder_ops.iter().any(|op| op == &n.op))
        .collect();
    println!("  Input slots (placeholder kind): {}", placeholders.len());
    for node in &placeholders {
        let shape = node
            .shape_attr()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "(unspecified)".to_string());
        let dtype = node
            .dtype_attr()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "(unspecified)".to_string());
        println!("   - {}  shape {shape}  dtype {dtype}", node.name);
    }

    let conv_nodes = graph
        .iter_nodes()
        .filter(|n| n.op.contains("Conv"))
        .count();
    println!("  Convolution nodes: {conv_nodes}");
    println!();

    // ── Endpoint Candidates ────────────────────────────────────
    match classify(&graph, &connectivity, &config.classifier) {
        Ok(result) => {
            println!("  Source candidates (ranked):");
            for c in result.sources.iter().take(10) {
                println!("   - {:<30} [{}]", c.name, c.rank);
            }
            println!("  Sink candidates (ranked):");
            for c in result.sinks.iter().take(10) {
                println!("   - {:<30} [{}]", c.name, c.rank);
            }
            if result.sinks.len() > 1 {
                println!(
                    "  Note: {} terminal nodes survived exclusion; the top pick is",
                    result.sinks.len(),
                );
                println!("  a heuristic guess, not a certainty.");
            }
            if let Some((source, sink)) = result.top_pair() {
                println!();
                println!("  Best guess: {source} -> {sink}");
            }
        }
        Err(e) => {
            println!("  Classification failed: {e}");
            println!("  (The conversion pipeline would skip graph-derived strategies.)");
        }
    }
    println!();
    Ok(())
}

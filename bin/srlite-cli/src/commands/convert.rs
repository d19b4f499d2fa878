// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `srlite convert` command: run the full fallback pipeline.
//!
//! Loads the graph, drives the strategy chain, writes the accepted
//! artifact, and optionally packages it. On total failure it prints every
//! stage's specific cause plus guidance for finding a working model.

use pipeline::{AssetPackager, Pipeline, PipelineOutcome};
use std::path::PathBuf;

pub fn execute(
    graph: PathBuf,
    scale: f64,
    output: Option<PathBuf>,
    package_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║             srlite · Conversion Pipeline            ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
    println!("  Graph:          {}", graph.display());
    println!("  Expected scale: {scale:.2}x");
    println!();

    let config = super::load_config(config_path)?;
    let pipeline = Pipeline::new(config);
    let outcome = pipeline.run(&graph, scale)?;

    // ── Attempt Log ────────────────────────────────────────────
    println!("  Attempts:");
    for (i, attempt) in outcome.attempts().iter().enumerate() {
        println!(
            "   [{}] {:<18} {}",
            i + 1,
            attempt.strategy,
            attempt.outcome.describe(),
        );
    }
    println!();

    match outcome {
        PipelineOutcome::Accepted {
            strategy,
            artifact,
            report,
            ..
        } => {
            println!("  Accepted via '{strategy}'");
            println!("   Input:  {:?} ({})", report.input_shape, report.dtype);
            println!("   Output: {:?}", report.output_shape);
            println!(
                "   Scale:  {:.2}x height, {:.2}x width",
                report.scale_h, report.scale_w,
            );
            println!(
                "   Range:  [{:.3}, {:.3}]  ({:.1} ms inference)",
                report.output_min,
                report.output_max,
                report.inference_duration.as_secs_f64() * 1000.0,
            );

            let output_path = output.unwrap_or_else(|| default_output_path(&graph));
            std::fs::write(&output_path, &artifact)?;
            println!();
            println!(
                "  Wrote {} ({} bytes)",
                output_path.display(),
                artifact.len(),
            );

            if let Some(target) = package_dir {
                let packaged =
                    AssetPackager::new(&target).package(&artifact_file_name(&output_path), &artifact, &report)?;
                println!("  Packaged into {}", target.display());
                println!("   Model:        {}", packaged.model_path.display());
                println!("   Instructions: {}", packaged.instructions_path.display());
            }
            Ok(())
        }
        PipelineOutcome::AllFailed { .. } => {
            print_model_guidance();
            anyhow::bail!("all conversion strategies failed; see the attempt log above");
        }
    }
}

fn default_output_path(graph: &std::path::Path) -> PathBuf {
    let stem = graph
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "converted".to_string());
    PathBuf::from(format!("{stem}.srl"))
}

fn artifact_file_name(output_path: &std::path::Path) -> String {
    output_path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model.srl".to_string())
}

/// Printed only on total pipeline failure: where to look for a model that
/// does convert.
fn print_model_guidance() {
    println!("  How to find a working pretrained model:");
    println!();
    println!("   1. Model hubs: search for 'super resolution' models tagged for");
    println!("      mobile/edge deployment, and prefer recently published ones.");
    println!("   2. Repositories with working demo apps usually ship converted");
    println!("      artifacts under assets/ or models/ directories.");
    println!("   3. Before adopting a model, check that:");
    println!("      - its input is flexible or matches your resolution,");
    println!("      - its output is an integer upscale (2x/3x/4x),");
    println!("      - the artifact stays small enough for your target device.");
    println!("   4. Re-run 'srlite validate' on any candidate artifact before");
    println!("      shipping it.");
    println!();
}

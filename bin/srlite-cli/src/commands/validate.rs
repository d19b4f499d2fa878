// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `srlite validate` command: re-validate an existing artifact.
//!
//! Useful for artifacts produced earlier, fetched from elsewhere, or
//! hand-tuned: the same functional checks the pipeline applies, as a
//! standalone step.

use std::path::PathBuf;
use validator::ArtifactValidator;

pub fn execute(
    artifact_path: PathBuf,
    scale: f64,
    config_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              srlite · Artifact Validator            ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
    println!("  Artifact:       {}", artifact_path.display());
    println!("  Expected scale: {scale:.2}x");
    println!();

    let config = super::load_config(config_path)?;
    let bytes = std::fs::read(&artifact_path)
        .map_err(|e| anyhow::anyhow!("cannot read '{}': {e}", artifact_path.display()))?;

    let validator = ArtifactValidator::new(config.validator_options());
    let report = validator
        .validate(&bytes, scale)
        .map_err(|e| anyhow::anyhow!("validation failed: {e}"))?;

    println!("  Input:  {:?} ({})", report.input_shape, report.dtype);
    println!("  Output: {:?}", report.output_shape);
    println!(
        "  Scale:  {:.2}x height, {:.2}x width",
        report.scale_h, report.scale_w,
    );
    println!(
        "  Range:  [{:.3}, {:.3}]  ({:.1} ms inference)",
        report.output_min,
        report.output_max,
        report.inference_duration.as_secs_f64() * 1000.0,
    );
    println!();

    if report.meets_contract {
        println!("  Contract met: output scales by {scale:.2}x on both axes.");
        Ok(())
    } else {
        anyhow::bail!(
            "scale contract NOT met: measured {:.2}x/{:.2}x vs expected {scale:.2}x",
            report.scale_h,
            report.scale_w,
        );
    }
}
